//! Fuzzy label matching of query tokens against catalog candidates.

use serde::Serialize;
use smallvec::SmallVec;

use crate::catalog::Candidate;
use super::similarity::ratio;
use super::tokenizer::Token;

/// Default acceptance threshold.
pub const DEFAULT_RATIO: f64 = 0.6;

/// Matches of one query token. Most tokens match nothing or a single label.
pub type Matches = SmallVec<[Candidate; 2]>;

/// Per-token fuzzy match result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub token: Token,
    /// Entity types whose label resembles the token.
    pub models: Matches,
    /// Relationships whose label resembles the token.
    pub relationships: Matches,
}

/// Candidates whose label scores at least `min_ratio` against `token`,
/// in the order given. Comparison is case-sensitive.
pub fn close_matches(token: &str, candidates: &[Candidate], min_ratio: f64) -> Matches {
    candidates
        .iter()
        .filter(|c| ratio(token, &c.label) >= min_ratio)
        .cloned()
        .collect()
}
