use std::collections::HashSet;

use rand::RngExt;

use crate::similarity::{NeighborLookup, SimilarityIndex};

/// Exponent applied to scaled similarity when weighting opponents. Cubing
/// biases duels strongly toward semantically close phrases, which produce
/// more informative votes than lopsided pairings.
pub const SIMILARITY_EXPONENT: i32 = 3;

/// Weights at or below this are treated as zero.
const MIN_WEIGHT: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PairError {
    #[error("need at least two phrases to form a pair")]
    NotEnoughPhrases,
}

/// Pick the next duel: a uniform-random first phrase, then an opponent drawn
/// with probability proportional to `max(0, (similarity + 1) / 2)^3`.
///
/// Falls back to a uniform-random opponent whenever the weighted draw cannot
/// proceed: the index is unavailable, the first phrase is missing from it,
/// or no candidate carries usable weight. The two returned phrases are
/// always distinct.
pub fn select_pair(
    phrases: &[String],
    index: &SimilarityIndex,
    rng: &mut impl RngExt,
) -> Result<(String, String), PairError> {
    if phrases.len() < 2 {
        return Err(PairError::NotEnoughPhrases);
    }

    let first = phrases[rng.random_range(0..phrases.len())].clone();

    let second = match index.neighbors(&first) {
        NeighborLookup::Found(scores) => match weighted_opponent(phrases, &first, scores, rng) {
            Some(opponent) => opponent,
            None => {
                tracing::debug!(phrase = %first, "no weighted opponents, using uniform fallback");
                uniform_opponent(phrases, &first, rng)
            }
        },
        NeighborLookup::AbsentPhrase => {
            tracing::warn!(phrase = %first, "phrase missing from similarity matrix, using uniform fallback");
            uniform_opponent(phrases, &first, rng)
        }
        NeighborLookup::IndexUnavailable => uniform_opponent(phrases, &first, rng),
    };

    Ok((first, second))
}

/// Weighted opponent draw over candidates that are in both the active phrase
/// set and the first phrase's similarity row. `None` when nothing survives
/// the weight cutoff.
fn weighted_opponent(
    phrases: &[String],
    first: &str,
    scores: &std::collections::HashMap<String, f64>,
    rng: &mut impl RngExt,
) -> Option<String> {
    let active: HashSet<&str> = phrases.iter().map(String::as_str).collect();

    let mut candidates: Vec<(&str, f64)> = Vec::new();
    let mut total = 0.0;
    for (phrase, score) in scores {
        if phrase == first || !active.contains(phrase.as_str()) {
            continue;
        }
        let scaled = (score + 1.0) / 2.0;
        let weight = scaled.max(0.0).powi(SIMILARITY_EXPONENT);
        if weight > MIN_WEIGHT {
            candidates.push((phrase.as_str(), weight));
            total += weight;
        }
    }

    if candidates.is_empty() || total <= MIN_WEIGHT {
        return None;
    }

    let mut draw = rng.random_range(0.0..total);
    for (phrase, weight) in &candidates {
        if draw < *weight {
            return Some((*phrase).to_string());
        }
        draw -= weight;
    }
    // Float summation slack: land on the last candidate.
    candidates.last().map(|(phrase, _)| (*phrase).to_string())
}

fn uniform_opponent(phrases: &[String], first: &str, rng: &mut impl RngExt) -> String {
    let others: Vec<&String> = phrases.iter().filter(|p| p.as_str() != first).collect();
    // Non-empty: phrases are unique and there are at least two of them.
    others[rng.random_range(0..others.len())].clone()
}
