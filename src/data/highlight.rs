//! Syntax colouring for script previews.
//!
//! syntect ships no PowerShell grammar, so `.ps1` files are coloured with
//! the bash grammar. Comments, strings and `$variables` come out right,
//! which is what matters in a preview.

use std::path::Path;
use std::sync::LazyLock;

use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

const THEME_NAME: &str = "base16-eighties.dark";
const PLAIN_COLOR: (u8, u8, u8) = (0xcc, 0xcc, 0xcc);

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEMES: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightedSpan {
    pub text: String,
    pub color: (u8, u8, u8),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightedLine {
    pub spans: Vec<HighlightedSpan>,
}

impl HighlightedLine {
    fn plain(text: &str) -> Self {
        let spans = if text.is_empty() {
            Vec::new()
        } else {
            vec![HighlightedSpan { text: text.to_string(), color: PLAIN_COLOR }]
        };
        Self { spans }
    }
}

fn syntax_for(path: &Path) -> &'static SyntaxReference {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let name = match ext.as_str() {
        "sh" | "bash" | "ps1" => "Bourne Again Shell (bash)",
        "bat" | "cmd" => "Batch File",
        _ => "",
    };
    SYNTAXES
        .find_syntax_by_name(name)
        .or_else(|| SYNTAXES.find_syntax_by_extension(&ext))
        .unwrap_or_else(|| SYNTAXES.find_syntax_plain_text())
}

fn theme() -> Option<&'static Theme> {
    THEMES.themes.get(THEME_NAME)
}

fn color_of(style: &Style) -> (u8, u8, u8) {
    let fg = style.foreground;
    (fg.r, fg.g, fg.b)
}

/// Colour `text` line by line, choosing the grammar from `path`'s extension.
///
/// Produces one entry per line of `text`, so line numbers stay aligned
/// with `str::lines`. A line the highlighter rejects is kept uncoloured.
pub fn highlight(path: &Path, text: &str) -> Vec<HighlightedLine> {
    let Some(theme) = theme() else {
        tracing::warn!(theme = THEME_NAME, "highlight theme missing");
        return text.lines().map(HighlightedLine::plain).collect();
    };
    let mut highlighter = HighlightLines::new(syntax_for(path), theme);
    LinesWithEndings::from(text)
        .map(|line| match highlighter.highlight_line(line, &SYNTAXES) {
            Ok(ranges) => HighlightedLine {
                spans: ranges
                    .into_iter()
                    .filter_map(|(style, chunk)| {
                        let chunk = chunk.trim_end_matches('\n');
                        (!chunk.is_empty()).then(|| HighlightedSpan {
                            text: chunk.to_string(),
                            color: color_of(&style),
                        })
                    })
                    .collect(),
            },
            Err(e) => {
                tracing::debug!(error = %e, "highlighting failed for line");
                HighlightedLine::plain(line.trim_end_matches('\n'))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn joined(lines: &[HighlightedLine]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.text.as_str()).collect())
            .collect()
    }

    fn colors(lines: &[HighlightedLine]) -> HashSet<(u8, u8, u8)> {
        lines.iter().flat_map(|l| l.spans.iter().map(|s| s.color)).collect()
    }

    #[test]
    fn shell_script_is_coloured() {
        let text = "#!/bin/bash\n# say hello\necho \"hello $USER\"\n";
        let lines = highlight(Path::new("greet.sh"), text);
        assert_eq!(lines.len(), 3);
        assert_eq!(joined(&lines), text.lines().collect::<Vec<_>>());
        assert!(colors(&lines).len() >= 2);
    }

    #[test]
    fn powershell_script_is_coloured() {
        let text = "# list files\n\nGet-ChildItem -Path \"C:\\temp\"\nWrite-Host $env:USERNAME";
        let lines = highlight(Path::new("list.PS1"), text);
        assert_eq!(lines.len(), text.lines().count());
        assert!(lines[1].spans.is_empty());
        assert_eq!(joined(&lines), text.lines().collect::<Vec<_>>());
        assert!(colors(&lines).len() >= 2);
    }

    #[test]
    fn unknown_extension_falls_back_to_plain_text() {
        let lines = highlight(Path::new("notes"), "just words\n");
        assert_eq!(joined(&lines), vec!["just words".to_string()]);
    }
}
