use std::collections::HashSet;
use std::io;
use std::path::Path;

/// Parse a phrase list: one phrase per line, trimmed.
///
/// Blank lines are skipped and duplicates (after trimming) are dropped,
/// keeping the first occurrence, so the returned set can always be paired
/// without a phrase meeting itself.
pub fn parse_phrases(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(line.to_string()))
        .map(str::to_string)
        .collect()
}

/// Load phrases from a file. A missing file is an empty list, not an error;
/// the server decides whether too few phrases is fatal.
pub fn load_phrases(path: &Path) -> io::Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = std::fs::read_to_string(path)?;
    Ok(parse_phrases(&text))
}
