use std::collections::HashMap;
use std::path::Path;

/// Precomputed pairwise similarity scores, loaded once at startup and
/// read-only afterwards.
///
/// Scores are expected in `[-1, 1]` (cosine similarity of phrase embeddings,
/// computed offline). The index may be entirely unavailable — not yet
/// computed, or unreadable — in which case every lookup reports
/// [`NeighborLookup::IndexUnavailable`] and pair selection degrades to
/// uniform random for the process lifetime.
#[derive(Debug, Clone, Default)]
pub struct SimilarityIndex {
    scores: Option<HashMap<String, HashMap<String, f64>>>,
}

/// Result of a neighbor lookup. Callers match exhaustively instead of
/// chaining existence checks.
#[derive(Debug)]
pub enum NeighborLookup<'a> {
    /// The phrase is in the index; scores keyed by opponent phrase.
    Found(&'a HashMap<String, f64>),
    /// The index is loaded but does not cover this phrase (stale matrix).
    AbsentPhrase,
    /// No index was loaded at all.
    IndexUnavailable,
}

impl SimilarityIndex {
    /// An index with no data; every lookup is `IndexUnavailable`.
    pub fn unavailable() -> Self {
        Self { scores: None }
    }

    pub fn from_scores(scores: HashMap<String, HashMap<String, f64>>) -> Self {
        Self {
            scores: Some(scores),
        }
    }

    /// Parse the nested `{phrase: {phrase: score}}` JSON produced by the
    /// offline embedding step.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let scores = serde_json::from_str(text)?;
        Ok(Self {
            scores: Some(scores),
        })
    }

    /// Load the index from disk. Missing or malformed files are non-fatal:
    /// the result is an unavailable index and a logged warning, since the
    /// system runs fine (if less informatively) on uniform-random pairing.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "similarity matrix not found; pair selection degrades to uniform random"
            );
            return Self::unavailable();
        }
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "failed to read similarity matrix");
                return Self::unavailable();
            }
        };
        match Self::from_json(&text) {
            Ok(index) => {
                tracing::info!(
                    path = %path.display(),
                    phrases = index.len(),
                    "loaded similarity matrix"
                );
                index
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "failed to parse similarity matrix");
                Self::unavailable()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.scores.is_some()
    }

    /// Number of phrases covered by the index (0 when unavailable).
    pub fn len(&self) -> usize {
        self.scores.as_ref().map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn neighbors(&self, phrase: &str) -> NeighborLookup<'_> {
        match &self.scores {
            None => NeighborLookup::IndexUnavailable,
            Some(scores) => match scores.get(phrase) {
                Some(row) => NeighborLookup::Found(row),
                None => NeighborLookup::AbsentPhrase,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_json() {
        let index = SimilarityIndex::from_json(
            r#"{"synergy": {"synergy": 1.0, "deep dive": 0.42}, "deep dive": {"synergy": 0.42, "deep dive": 1.0}}"#,
        )
        .unwrap();
        assert!(index.is_available());
        assert_eq!(index.len(), 2);
        match index.neighbors("synergy") {
            NeighborLookup::Found(row) => assert_eq!(row["deep dive"], 0.42),
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[test]
    fn absent_phrase_is_distinguished_from_no_index() {
        let index = SimilarityIndex::from_json(r#"{"synergy": {}}"#).unwrap();
        assert!(matches!(
            index.neighbors("circle back"),
            NeighborLookup::AbsentPhrase
        ));
        assert!(matches!(
            SimilarityIndex::unavailable().neighbors("synergy"),
            NeighborLookup::IndexUnavailable
        ));
    }

    #[test]
    fn missing_file_loads_as_unavailable() {
        let index = SimilarityIndex::load(Path::new("/definitely/not/here.json"));
        assert!(!index.is_available());
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(SimilarityIndex::from_json("{not json").is_err());
    }
}
