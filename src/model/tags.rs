use std::path::PathBuf;

/// A `(category, value)` pair, both lowercased at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub category: String,
    pub value: String,
}

impl Tag {
    pub fn new(category: &str, value: &str) -> Self {
        Tag {
            category: category.to_lowercase(),
            value: value.to_lowercase(),
        }
    }

    /// Substring match against either the category or the value.
    pub fn contains(&self, token: &str) -> bool {
        self.category.contains(token) || self.value.contains(token)
    }
}

/// Tags parsed from one script, in file order. Duplicates are kept.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScriptTags {
    pub path: PathBuf,
    pub tags: Vec<Tag>,
}

fn normalize(token: &str) -> String {
    token.trim().to_lowercase()
}

impl ScriptTags {
    pub fn new(path: PathBuf, tags: Vec<Tag>) -> Self {
        ScriptTags { path, tags }
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// AND across tokens, OR across tags. An empty token list always matches.
    pub fn has_all_of<S: AsRef<str>>(&self, tokens: &[S]) -> bool {
        tokens.iter().all(|token| self.has_any_of(&[token.as_ref()]))
    }

    /// True when at least one token matches some tag.
    pub fn has_any_of<S: AsRef<str>>(&self, tokens: &[S]) -> bool {
        tokens.iter().any(|token| {
            let token = normalize(token.as_ref());
            self.tags.iter().any(|t| t.contains(&token))
        })
    }

    pub fn values_for(&self, category: &str) -> Vec<&str> {
        self.tags
            .iter()
            .filter(|t| t.category.eq_ignore_ascii_case(category))
            .map(|t| t.value.as_str())
            .collect()
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for tag in &self.tags {
            if !seen.contains(&tag.category.as_str()) {
                seen.push(&tag.category);
            }
        }
        seen
    }
}
