//! Natural-language query interpretation.
//!
//! Pure text processing (`tokenizer`, `similarity`, `matcher`) plus the
//! `proposition` pipeline that ties it to the catalog and the graph.

pub mod tokenizer;
pub mod similarity;
pub mod matcher;
pub mod proposition;

pub use tokenizer::{ngrams, Token};
pub use similarity::ratio;
pub use matcher::{close_matches, Match, DEFAULT_RATIO};
pub use proposition::{Proposition, PropositionBuilder, Term};
