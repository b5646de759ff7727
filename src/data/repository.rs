use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};

use crate::error::RepoUrlError;

pub const DEFAULT_REPO_URL: &str = "https://github.com/rocketpowerinc/scriptbin.git";

const SCHEMES: [&str; 4] = ["https", "http", "git", "ssh"];

/// Where a repository is checked out under `home`.
///
/// The default scriptbin gets a fixed folder; any other repository gets a
/// `custom-<name>` sibling so switching back and forth never mixes trees.
pub fn checkout_dir(home: &Path, url: &str) -> PathBuf {
    let base = home.join("Downloads").join("Temp");
    if url == DEFAULT_REPO_URL {
        base.join("scriptbin")
    } else {
        base.join(format!("custom-{}", repo_name(url)))
    }
}

/// Last path segment of a repository URL without `.git`.
pub fn repo_name(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let last = trimmed
        .rsplit(|c| c == '/' || c == ':')
        .next()
        .unwrap_or(trimmed);
    let name = last.strip_suffix(".git").unwrap_or(last);
    if name.is_empty() {
        "repo".to_string()
    } else {
        name.to_string()
    }
}

/// Splits a URL into `(host, path)`. Accepts `scheme://host/path` and the
/// scp-like `user@host:path` form.
fn split_remote(url: &str) -> Result<(&str, &str), RepoUrlError> {
    if let Some((scheme, rest)) = url.split_once("://") {
        if !SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()) {
            return Err(RepoUrlError::UnsupportedScheme);
        }
        let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));
        let host = authority.rsplit('@').next().unwrap_or(authority);
        if host.is_empty() {
            return Err(RepoUrlError::UnsupportedScheme);
        }
        return Ok((host, path));
    }
    if let Some((user_host, path)) = url.split_once(':') {
        if let Some((user, host)) = user_host.split_once('@') {
            if !user.is_empty() && !host.is_empty() && !host.contains('/') {
                return Ok((host, path));
            }
        }
    }
    Err(RepoUrlError::UnsupportedScheme)
}

pub fn validate_repo_url(url: &str) -> Result<(), RepoUrlError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(RepoUrlError::Empty);
    }
    let (host, path) = split_remote(url)?;
    if !url.to_ascii_lowercase().ends_with(".git") {
        return Err(RepoUrlError::MissingGitSuffix);
    }
    if host.to_ascii_lowercase().contains("github.com") {
        let parts: Vec<&str> = path.trim_matches('/').split('/').collect();
        if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) {
            return Err(RepoUrlError::BadGithubPath);
        }
    }
    Ok(())
}

/// Replace `dest` with a fresh shallow clone of `url`.
///
/// The clone lands in a `.partial` sibling first; `dest` is only replaced
/// once git succeeded, so a failed sync leaves the old checkout usable.
pub fn mirror(url: &str, dest: &Path) -> Result<()> {
    let staging = staging_dir(dest);
    if staging.exists() {
        fs::remove_dir_all(&staging)
            .with_context(|| format!("failed to remove {}", staging.display()))?;
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    tracing::info!(url, dest = %dest.display(), "cloning repository");
    let output = Command::new("git")
        .args(["clone", "--depth", "1", url])
        .arg(&staging)
        .output()
        .context("failed to run git")?;

    if !output.status.success() {
        let _ = fs::remove_dir_all(&staging);
        let mut detail = String::from_utf8_lossy(&output.stdout).to_string();
        detail.push_str(&String::from_utf8_lossy(&output.stderr));
        bail!("git clone failed ({}): {}", output.status, detail.trim());
    }

    if dest.exists() {
        fs::remove_dir_all(dest)
            .with_context(|| format!("failed to remove old checkout {}", dest.display()))?;
    }
    fs::rename(&staging, dest)
        .with_context(|| format!("failed to move clone into {}", dest.display()))?;
    tracing::info!(dest = %dest.display(), "repository mirrored");
    Ok(())
}

fn staging_dir(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "checkout".into());
    name.push(".partial");
    dest.with_file_name(name)
}
