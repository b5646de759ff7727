use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use crate::data::tags::tags_or_none;
use crate::model::entry::{Entry, EntryKind};

/// Which catalog read backs the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Tree,
    RecursiveFlat,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Tree => ViewMode::RecursiveFlat,
            ViewMode::RecursiveFlat => ViewMode::Tree,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Tree => "Tree",
            ViewMode::RecursiveFlat => "All scripts",
        }
    }
}

fn by_name_ci(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// One directory level: directories first, then scripts, each case-insensitive.
/// An unreadable directory lists as empty.
pub fn list_directory(dir: &Path) -> Vec<Entry> {
    let read_dir = match fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) => {
            tracing::warn!(error = %e, path = %dir.display(), "cannot read directory");
            return Vec::new();
        }
    };

    let mut dirs = Vec::new();
    let mut scripts = Vec::new();

    for entry in read_dir.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        let path = entry.path();
        // Follows symlinks so a linked folder still browses as a folder.
        let is_dir = path.is_dir();
        match EntryKind::classify(&name, is_dir) {
            EntryKind::Directory => dirs.push(Entry::directory(&name, path)),
            EntryKind::Script => {
                let tags = tags_or_none(&path);
                scripts.push(Entry::script(name, path, tags));
            }
            EntryKind::Ignored => {}
        }
    }

    dirs.sort_by(|a, b| by_name_ci(&a.display_name, &b.display_name));
    scripts.sort_by(|a, b| by_name_ci(&a.display_name, &b.display_name));

    tracing::debug!(
        path = %dir.display(),
        dirs = dirs.len(),
        scripts = scripts.len(),
        "listed directory"
    );

    dirs.extend(scripts);
    dirs
}

/// Every script below `root`, named by its `/`-joined path relative to `root`.
pub fn list_recursive(root: &Path) -> Vec<Entry> {
    let mut out = Vec::new();
    walk(root, "", &mut out);
    out.sort_by(|a, b| by_name_ci(&a.display_name, &b.display_name));
    tracing::debug!(root = %root.display(), scripts = out.len(), "listed recursively");
    out
}

fn walk(dir: &Path, prefix: &str, out: &mut Vec<Entry>) {
    let read_dir = match fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) => {
            tracing::warn!(error = %e, path = %dir.display(), "skipping unreadable directory");
            return;
        }
    };

    for entry in read_dir.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        let path = entry.path();
        // file_type() does not follow symlinks, which keeps link cycles out of the walk.
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        let display = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}/{}", prefix, name)
        };
        match EntryKind::classify(&name, is_dir) {
            EntryKind::Directory => walk(&path, &display, out),
            EntryKind::Script => {
                let tags = tags_or_none(&path);
                out.push(Entry::script(display, path, tags));
            }
            EntryKind::Ignored => {}
        }
    }
}

/// Reads the catalog the way `mode` shows it: `dir` in Tree, `root` when flat.
pub fn load(mode: ViewMode, dir: &Path, root: &Path) -> Vec<Entry> {
    match mode {
        ViewMode::Tree => list_directory(dir),
        ViewMode::RecursiveFlat => list_recursive(root),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.display_name.as_str()).collect()
    }

    #[test]
    fn directories_first_then_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Zebra.sh"), "echo z\n").unwrap();
        fs::create_dir(dir.path().join("apple")).unwrap();
        fs::write(dir.path().join("banana.sh"), "echo b\n").unwrap();

        let entries = list_directory(dir.path());
        assert_eq!(names(&entries), vec!["apple/", "banana.sh", "Zebra.sh"]);
        assert!(entries[0].is_directory());
        assert_eq!(entries[2].path, dir.path().join("Zebra.sh"));
    }

    #[test]
    fn hidden_and_unsupported_entries_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".secret.sh"), "").unwrap();
        fs::write(dir.path().join("README.md"), "").unwrap();
        fs::write(dir.path().join("win.PS1"), "").unwrap();
        fs::write(dir.path().join("go.bat"), "").unwrap();

        let entries = list_directory(dir.path());
        assert_eq!(names(&entries), vec!["go.bat", "win.PS1"]);
    }

    #[test]
    fn scripts_carry_parsed_tags() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("t.sh"), "#*Tags\n# Os: linux\n").unwrap();
        fs::write(dir.path().join("u.sh"), "echo plain\n").unwrap();

        let entries = list_directory(dir.path());
        let tagged = entries[0].tags.as_ref().unwrap();
        assert_eq!(tagged.values_for("os"), vec!["linux"]);
        assert!(entries[1].tags.is_none());
    }

    #[test]
    fn unreadable_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_directory(&dir.path().join("nope")).is_empty());
        assert!(list_recursive(&dir.path().join("nope")).is_empty());
    }

    #[test]
    fn recursive_uses_relative_display_names() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("sub/deeper")).unwrap();
        fs::create_dir(root.path().join(".hidden")).unwrap();
        fs::write(root.path().join("sub/tool.sh"), "").unwrap();
        fs::write(root.path().join("sub/deeper/Inner.ps1"), "").unwrap();
        fs::write(root.path().join(".hidden/skip.sh"), "").unwrap();
        fs::write(root.path().join("alpha.sh"), "").unwrap();
        fs::write(root.path().join("notes.txt"), "").unwrap();

        let entries = list_recursive(root.path());
        assert_eq!(
            names(&entries),
            vec!["alpha.sh", "sub/deeper/Inner.ps1", "sub/tool.sh"]
        );
        assert!(entries.iter().all(|e| e.is_script()));
        let tool = entries.iter().find(|e| e.display_name == "sub/tool.sh").unwrap();
        assert_eq!(tool.path, root.path().join("sub").join("tool.sh"));
    }

    #[test]
    fn load_follows_mode() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("sub")).unwrap();
        fs::write(root.path().join("sub/a.sh"), "").unwrap();

        let tree = load(ViewMode::Tree, root.path(), root.path());
        assert_eq!(names(&tree), vec!["sub/"]);
        let flat = load(ViewMode::RecursiveFlat, root.path(), root.path());
        assert_eq!(names(&flat), vec!["sub/a.sh"]);
        assert_eq!(ViewMode::Tree.toggled(), ViewMode::RecursiveFlat);
    }
}
