//! Query tokenizer: every contiguous run of words (n-gram) of a query.

use serde::Serialize;

/// One n-gram of a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Space-joined words.
    pub text: String,
    /// Index of the first word in the query.
    pub start: usize,
    /// Number of words.
    pub len: usize,
}

impl Token {
    /// Whether the token starts and ends with a double quote. A lone `"`
    /// counts.
    pub fn is_quoted(&self) -> bool {
        self.text.starts_with('"') && self.text.ends_with('"')
    }

    /// Token text with every double quote removed.
    pub fn unquoted(&self) -> String {
        self.text.replace('"', "")
    }
}

/// Split on single spaces. Consecutive spaces yield empty words, like the
/// query source does; an empty query has no words at all.
pub fn words(query: &str) -> Vec<&str> {
    if query.is_empty() {
        return Vec::new();
    }
    query.split(' ').collect()
}

/// All n-grams of `query`, shortest first, then by start position.
///
/// A query of `k` words yields `k * (k + 1) / 2` tokens.
pub fn ngrams(query: &str) -> Vec<Token> {
    let words = words(query);
    let k = words.len();
    let mut tokens = Vec::with_capacity(k * (k + 1) / 2);
    for n in 1..=k {
        for start in 0..=(k - n) {
            tokens.push(Token {
                text: words[start..start + n].join(" "),
                start,
                len: n,
            });
        }
    }
    tokens
}

/// The word right before `token` in the query it was cut from.
pub fn preceding_word<'q>(words: &[&'q str], token: &Token) -> Option<&'q str> {
    token.start.checked_sub(1).and_then(|i| words.get(i).copied())
}
