use crate::model::entry::Entry;

/// Search box text to tokens: whitespace-split and lowercased.
pub fn tokenize(input: &str) -> Vec<String> {
    input.split_whitespace().map(str::to_lowercase).collect()
}

fn retained(entry: &Entry, tokens: &[String]) -> bool {
    if entry.is_directory() {
        return true;
    }
    match &entry.tags {
        Some(tags) => tags.has_all_of(tokens),
        None => false,
    }
}

/// Positions of the entries that survive `tokens`, in input order.
///
/// Directories always survive so the tree stays navigable. A script survives
/// when every token is a substring of some tag's category or value.
pub fn filter_indices(entries: &[Entry], tokens: &[String]) -> Vec<usize> {
    if tokens.is_empty() {
        return (0..entries.len()).collect();
    }
    entries
        .iter()
        .enumerate()
        .filter(|(_, e)| retained(e, tokens))
        .map(|(i, _)| i)
        .collect()
}
