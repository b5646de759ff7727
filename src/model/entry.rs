use std::path::{Path, PathBuf};

use crate::model::tags::ScriptTags;

/// Extensions recognized as runnable scripts (compared case-insensitively).
pub const SCRIPT_EXTENSIONS: [&str; 4] = ["sh", "ps1", "bat", "cmd"];

/// Suffix appended to directory display names.
pub const DIR_MARKER: char = '/';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    Script,
    Ignored,
}

impl EntryKind {
    /// Classify a filesystem node. Hidden names are always ignored.
    pub fn classify(name: &str, is_dir: bool) -> Self {
        if name.starts_with('.') {
            return EntryKind::Ignored;
        }
        if is_dir {
            return EntryKind::Directory;
        }
        if is_script_name(name) {
            EntryKind::Script
        } else {
            EntryKind::Ignored
        }
    }
}

pub fn is_script_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| SCRIPT_EXTENSIONS.iter().any(|s| ext.eq_ignore_ascii_case(s)))
        .unwrap_or(false)
}

/// One catalog item. Built fresh on every catalog read and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub display_name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
    pub tags: Option<ScriptTags>,
}

impl Entry {
    pub fn directory(name: &str, path: PathBuf) -> Self {
        Entry {
            display_name: format!("{}{}", name, DIR_MARKER),
            path,
            kind: EntryKind::Directory,
            tags: None,
        }
    }

    pub fn script(display_name: String, path: PathBuf, tags: Option<ScriptTags>) -> Self {
        Entry {
            display_name,
            path,
            kind: EntryKind::Script,
            tags,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_script(&self) -> bool {
        self.kind == EntryKind::Script
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_extension_and_visibility() {
        assert_eq!(EntryKind::classify("deploy.sh", false), EntryKind::Script);
        assert_eq!(EntryKind::classify("Setup.PS1", false), EntryKind::Script);
        assert_eq!(EntryKind::classify("run.CMD", false), EntryKind::Script);
        assert_eq!(EntryKind::classify("notes.md", false), EntryKind::Ignored);
        assert_eq!(EntryKind::classify("Makefile", false), EntryKind::Ignored);
        assert_eq!(EntryKind::classify(".hidden.sh", false), EntryKind::Ignored);
        assert_eq!(EntryKind::classify(".git", true), EntryKind::Ignored);
        assert_eq!(EntryKind::classify("linux", true), EntryKind::Directory);
    }

    #[test]
    fn directory_names_carry_marker() {
        let e = Entry::directory("apple", PathBuf::from("/r/apple"));
        assert_eq!(e.display_name, "apple/");
        assert!(e.is_directory());
        assert!(e.tags.is_none());
    }
}
