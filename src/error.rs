use std::path::PathBuf;

use thiserror::Error;

use crate::launcher::Strategy;

#[derive(Debug, Error)]
pub enum TagParseError {
    #[error("failed to read tags from {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl TagParseError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TagParseError::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("{strategy} launch failed: {source}")]
    Spawn {
        strategy: Strategy,
        source: std::io::Error,
    },
    #[error("script exited abnormally: {source}")]
    Foreground { source: std::io::Error },
    #[error("no launch strategy available on this platform")]
    NoStrategy,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepoUrlError {
    #[error("repository URL cannot be empty")]
    Empty,
    #[error("URL must start with https://, http://, git:// or ssh://, or use user@host:path")]
    UnsupportedScheme,
    #[error("repository URL must end with .git")]
    MissingGitSuffix,
    #[error("GitHub URLs must look like https://github.com/owner/repo.git")]
    BadGithubPath,
}
