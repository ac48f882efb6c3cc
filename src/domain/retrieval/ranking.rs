//! Threshold filtering and top-k selection over scored passages.

use super::similarity::{checked_norm, SimilarityError};
use super::{Passage, RetrievalResult, ScoredPassage};

/// Scores for one query against the whole corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    /// Best score over every passage, including those below the threshold.
    pub max_score: f32,
    /// Relevant passages, best first, truncated to `k`.
    pub matches: Vec<ScoredPassage>,
}

impl Ranking {
    pub fn found_match(&self) -> bool {
        !self.matches.is_empty()
    }

    pub fn matched_domains(&self) -> Vec<String> {
        self.matches.iter().map(|p| p.domain.clone()).collect()
    }

    pub fn into_result(self) -> RetrievalResult {
        if self.matches.is_empty() {
            RetrievalResult::no_match()
        } else {
            RetrievalResult::Matched {
                passages: self.matches,
            }
        }
    }
}

/// Scores every passage against `query`, keeps those with
/// `score >= threshold`, and returns the best `k`.
///
/// Sorting is stable, so passages with equal scores keep corpus order.
pub fn rank_passages(
    passages: &[Passage],
    query: &[f32],
    threshold: f32,
    k: usize,
) -> Result<Ranking, SimilarityError> {
    let query_norm = checked_norm(query)?;

    let scores = passages
        .iter()
        .map(|p| p.score_against(query, query_norm))
        .collect::<Result<Vec<f32>, _>>()?;

    let max_score = scores
        .iter()
        .copied()
        .reduce(f32::max)
        .unwrap_or(0.0);

    let mut relevant: Vec<(usize, f32)> = scores
        .into_iter()
        .enumerate()
        .filter(|(_, score)| *score >= threshold)
        .collect();
    relevant.sort_by(|a, b| b.1.total_cmp(&a.1));
    relevant.truncate(k);

    let matches = relevant
        .into_iter()
        .map(|(idx, score)| passages[idx].scored(score))
        .collect();

    Ok(Ranking { max_score, matches })
}
