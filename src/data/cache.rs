use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::highlight::{self, HighlightedLine};

pub const MAX_PREVIEW_BYTES: u64 = 1_048_576;
pub const MAX_LINE_CHARS: usize = 200;

#[derive(Debug)]
struct CachedPreview {
    text: String,
    /// `None` when `text` is a load failure message rather than file content.
    lines: Option<Vec<HighlightedLine>>,
}

impl CachedPreview {
    fn load(path: &Path) -> Self {
        match read_script(path) {
            Ok(text) => {
                let lines = Some(highlight::highlight(path, &text));
                Self { text, lines }
            }
            Err(text) => Self { text, lines: None },
        }
    }
}

/// Preview text and its highlighted lines per script path.
///
/// Entries are written once and never refreshed on their own; an edited
/// script keeps showing the text from its first preview until `clear`.
#[derive(Debug, Default)]
pub struct ContentCache {
    entries: HashMap<PathBuf, CachedPreview>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<&str> {
        self.entries.get(path).map(|e| e.text.as_str())
    }

    /// Highlighted lines for `path`, absent for failure messages.
    pub fn highlighted(&self, path: &Path) -> Option<&[HighlightedLine]> {
        self.entries.get(path).and_then(|e| e.lines.as_deref())
    }

    /// Cached text for `path`, reading the file on first use only.
    pub fn get_or_load(&mut self, path: &Path) -> &str {
        let entry = self.entries.entry(path.to_path_buf()).or_insert_with(|| {
            tracing::debug!(path = %path.display(), "loading preview");
            CachedPreview::load(path)
        });
        &entry.text
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        tracing::debug!(entries = self.entries.len(), "clearing preview cache");
        self.entries.clear();
    }
}

/// Read and sanitize a script for display. Failures carry the message shown instead.
fn read_script(path: &Path) -> Result<String, String> {
    match fs::metadata(path) {
        Ok(meta) if meta.len() > MAX_PREVIEW_BYTES => {
            return Err(format!("File too large to preview ({} bytes)", meta.len()));
        }
        Ok(_) => {}
        Err(e) => return Err(format!("Error reading file: {}", e)),
    }
    let bytes = fs::read(path).map_err(|e| format!("Error reading file: {}", e))?;
    String::from_utf8(bytes)
        .map(|text| sanitize(&text))
        .map_err(|_| "Binary file, no preview available".to_string())
}

/// Normalize line endings, drop NULs and cut overlong lines.
pub fn sanitize(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n").replace('\0', "");
    normalized
        .split('\n')
        .map(|line| {
            if line.chars().count() > MAX_LINE_CHARS {
                let cut: String = line.chars().take(MAX_LINE_CHARS).collect();
                format!("{}...", cut)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_normalizes_text() {
        assert_eq!(sanitize("a\r\nb\rc\0d"), "a\nb\ncd");
        let long = "x".repeat(MAX_LINE_CHARS + 5);
        let out = sanitize(&long);
        assert_eq!(out.chars().count(), MAX_LINE_CHARS + 3);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn first_read_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.sh");
        fs::write(&path, "echo one\n").unwrap();

        let mut cache = ContentCache::new();
        assert_eq!(cache.get_or_load(&path), "echo one\n");

        fs::write(&path, "echo two\n").unwrap();
        assert_eq!(cache.get_or_load(&path), "echo one\n");
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.get_or_load(&path), "echo two\n");
    }

    #[test]
    fn errors_and_binary_are_cached_messages() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.sh");
        let binary = dir.path().join("bin.sh");
        fs::write(&binary, [0xff_u8, 0xfe, 0x00]).unwrap();

        let mut cache = ContentCache::new();
        assert!(cache.get_or_load(&missing).starts_with("Error reading file"));
        assert!(cache.get(&missing).is_some());
        assert_eq!(cache.get_or_load(&binary), "Binary file, no preview available");
        assert!(cache.highlighted(&missing).is_none());
        assert!(cache.highlighted(&binary).is_none());
    }

    #[test]
    fn highlighted_lines_are_kept_with_the_text() {
        let dir = tempfile::tempdir().unwrap();
        let sh = dir.path().join("a.sh");
        let ps1 = dir.path().join("b.ps1");
        fs::write(&sh, "# first\necho one\n").unwrap();
        fs::write(&ps1, "# first\r\nWrite-Host 'one'\r\n").unwrap();

        let mut cache = ContentCache::new();
        assert!(cache.highlighted(&sh).is_none());
        cache.get_or_load(&sh);
        cache.get_or_load(&ps1);
        assert_eq!(cache.highlighted(&sh).map(<[_]>::len), Some(2));
        assert_eq!(cache.highlighted(&ps1).map(<[_]>::len), Some(2));

        fs::write(&sh, "echo two\n").unwrap();
        cache.get_or_load(&sh);
        let first: String = cache.highlighted(&sh).unwrap()[0]
            .spans
            .iter()
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(first, "# first");
    }

    #[test]
    fn oversized_file_is_not_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.sh");
        let file = fs::File::create(&path).unwrap();
        file.set_len(MAX_PREVIEW_BYTES + 1).unwrap();
        assert!(read_script(&path).unwrap_err().starts_with("File too large"));
    }
}
