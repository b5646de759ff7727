use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::TagParseError;
use crate::model::entry::Entry;
use crate::model::tags::{ScriptTags, Tag};

/// Headers are expected near the top of a script; never read further than this.
pub const MAX_SCAN_LINES: usize = 50;

/// Byte cap on the header scan, so a file without newlines is not read whole.
pub const MAX_HEADER_BYTES: u64 = 64 * 1024;

/// Category given to `#word #word` style tags.
pub const LEGACY_CATEGORY: &str = "legacy";

static BLOCK_OPENER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#\*Tags:?\s*$").expect("valid regex"));
static CATEGORY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#\s*([A-Za-z_]+):\s*(.+)$").expect("valid regex"));
static LEGACY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#([a-zA-Z_]+)\s+#([a-zA-Z_]+)").expect("valid regex"));
static LEGACY_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([a-zA-Z_]+)").expect("valid regex"));

/// Parse the tag header of a script.
///
/// A `#*Tags` block contributes one tag per value on each `# Category: a b, c`
/// line and ends at the first blank or non-comment line. Without a block, the
/// first line starting with `#word #word` is read as legacy tags. A file with
/// neither yields an empty set.
pub fn parse_tags(path: &Path) -> Result<ScriptTags, TagParseError> {
    let file = File::open(path).map_err(|e| TagParseError::io(path, e))?;
    let tags = scan_header(file).map_err(|e| TagParseError::io(path, e))?;
    Ok(ScriptTags::new(path.to_path_buf(), tags))
}

fn scan_header<R: Read>(source: R) -> std::io::Result<Vec<Tag>> {
    let mut reader = BufReader::new(source.take(MAX_HEADER_BYTES));
    let mut tags = Vec::new();
    let mut in_block = false;
    let mut buf = Vec::new();

    for _ in 0..MAX_SCAN_LINES {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let decoded = String::from_utf8_lossy(&buf);
        let line = decoded.trim();

        if in_block {
            if line.is_empty() {
                break;
            }
            if let Some(caps) = CATEGORY_LINE.captures(line) {
                let category = caps[1].trim();
                for value in caps[2].split_whitespace() {
                    let value = value.trim_matches(',');
                    if !value.is_empty() {
                        tags.push(Tag::new(category, value));
                    }
                }
            } else if !line.starts_with('#') {
                break;
            }
            continue;
        }

        if BLOCK_OPENER.is_match(line) {
            in_block = true;
            continue;
        }

        if LEGACY_LINE.is_match(line) {
            for caps in LEGACY_WORD.captures_iter(line) {
                tags.push(Tag::new(LEGACY_CATEGORY, &caps[1]));
            }
            break;
        }
    }

    Ok(tags)
}

/// Parse failures degrade to "no tags"; the listing itself never fails.
pub fn tags_or_none(path: &Path) -> Option<ScriptTags> {
    match parse_tags(path) {
        Ok(tags) if !tags.is_empty() => Some(tags),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %e, "tag parse failed");
            None
        }
    }
}

/// Distinct values per category across a set of entries.
pub fn tag_index(entries: &[Entry]) -> BTreeMap<String, Vec<String>> {
    let mut index: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for tag in entries.iter().filter_map(|e| e.tags.as_ref()).flat_map(|t| &t.tags) {
        let values = index.entry(tag.category.clone()).or_default();
        if !values.contains(&tag.value) {
            values.push(tag.value.clone());
        }
    }
    index
}
