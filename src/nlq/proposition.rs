//! # Proposition building
//!
//! Turns a free-text query into ranked subject–predicate–object readings:
//!
//! 1. cut the query into n-grams and fuzzy-match each one against the
//!    domain's entity types (subjects) and relationships (predicates);
//! 2. treat quoted n-grams, and n-grams right after a preposition, as names
//!    of concrete entities and look them up (objects);
//! 3. when types matched but no relationship did, fall back to every
//!    relationship those types hold;
//! 4. combine every compatible (subject, predicate, object);
//! 5. append plain name-search hits for the whole query.
//!
//! Subjects and predicates are deduplicated; objects and the final list are
//! not, so the same reading can come back more than once.

use hashbrown::HashSet;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::catalog::{Candidate, SchemaCatalog};
use crate::config::EngineConfig;
use crate::domain::Domain;
use crate::execution::GraphGateway;
use crate::layout::{INSTANCE_OF, INSTANCE_OF_LABEL};
use crate::search::{search, GraphNode};
use crate::Result;
use super::matcher::{close_matches, Match};
use super::tokenizer::{ngrams, preceding_word, words};

/// Words after which the next n-gram is read as an entity name.
pub const PREPOSITIONS: &[&str] = &[
    "aboard", "about", "above", "across", "after", "against", "along", "amid", "among",
    "anti", "around", "as", "at", "before", "behind", "below", "beneath", "beside",
    "besides", "between", "beyond", "but", "by", "concerning", "considering", "despite",
    "down", "during", "except", "excepting", "excluding", "following", "for", "from", "in",
    "inside", "into", "like", "minus", "near", "of", "off", "on", "onto", "opposite",
    "outside", "over", "past", "per", "plus", "regarding", "round", "save", "since", "than",
    "through", "to", "toward", "towards", "under", "underneath", "unlike", "until", "up",
    "upon", "versus", "via", "with", "within", "without",
];

pub fn is_preposition(word: &str) -> bool {
    let word = word.to_lowercase();
    PREPOSITIONS.contains(&word.as_str())
}

// ============================================================================
// Propositions
// ============================================================================

/// Subject or object of a proposition.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// An entity type or other catalog entry.
    Candidate(Candidate),
    /// A concrete entity found in the graph.
    Entity(GraphNode),
    /// Free text, e.g. the type name in an instance-of reading.
    Literal(String),
    /// No object was detected in the query.
    Empty,
}

impl Term {
    /// Text used for the term inside a proposition label.
    ///
    /// An entity whose `name` is blank shows its type instead, so the label
    /// never ends in a dangling space for a node that does exist.
    pub fn display(&self) -> &str {
        match self {
            Term::Candidate(c) if !c.name.is_empty() => &c.name,
            Term::Candidate(c) => &c.label,
            Term::Entity(n) if !n.name.is_empty() => &n.name,
            Term::Entity(n) => &n.type_label,
            Term::Literal(s) => s,
            Term::Empty => "",
        }
    }
}

impl Serialize for Term {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Term::Candidate(c) => c.serialize(serializer),
            Term::Entity(n) => n.serialize(serializer),
            Term::Literal(s) => serializer.serialize_str(s),
            Term::Empty => serializer.serialize_str(""),
        }
    }
}

/// One reading of the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Proposition {
    pub label: String,
    pub subject: Term,
    pub predicate: Candidate,
    pub object: Term,
}

impl Proposition {
    /// `"{subject} that {predicate} {object}"`.
    pub fn relation(subject: Candidate, predicate: Candidate, object: Term) -> Self {
        let label = format!("{} that {} {}", subject.label, predicate.label, object.display());
        Self { label, subject: Term::Candidate(subject), predicate, object }
    }

    /// `"{name} is instance of {type}"` for a concrete entity.
    pub fn instance_of(node: GraphNode) -> Self {
        let label = format!("{} {} {}", node.name, INSTANCE_OF_LABEL, node.type_label);
        let object = Term::Literal(node.type_label.clone());
        Self {
            label,
            subject: Term::Entity(node),
            predicate: Candidate::new(INSTANCE_OF, INSTANCE_OF_LABEL),
            object,
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Per-request interpretation pipeline. Holds borrowed collaborators only.
pub struct PropositionBuilder<'a, G: ?Sized, C: ?Sized> {
    gateway: &'a G,
    catalog: &'a C,
    config: &'a EngineConfig,
}

impl<'a, G, C> PropositionBuilder<'a, G, C>
where
    G: GraphGateway + ?Sized,
    C: SchemaCatalog + ?Sized,
{
    pub fn new(gateway: &'a G, catalog: &'a C, config: &'a EngineConfig) -> Self {
        Self { gateway, catalog, config }
    }

    /// Full pipeline. An empty query has no readings.
    pub async fn interpret(&self, query: &str, domain: &Domain) -> Result<Vec<Proposition>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let matches = self.find_matches(query, domain)?;
        self.build(query, &matches, domain).await
    }

    /// Fuzzy-match every n-gram of `query` (lower-cased) against the catalog.
    pub fn find_matches(&self, query: &str, domain: &Domain) -> Result<Vec<Match>> {
        let models = self.catalog.entity_types(domain)?;
        let relationships = self.catalog.relationships(domain)?;
        let ratio = self.config.match_ratio;

        Ok(ngrams(query)
            .into_iter()
            .map(|token| {
                let text = token.text.to_lowercase();
                Match {
                    models: close_matches(&text, &models, ratio),
                    relationships: close_matches(&text, &relationships, ratio),
                    token,
                }
            })
            .collect())
    }

    /// Assemble propositions from per-token matches of `query`.
    pub async fn build(&self, query: &str, matches: &[Match], domain: &Domain) -> Result<Vec<Proposition>> {
        let query_words = words(query);
        let mut subjects: Vec<Candidate> = Vec::new();
        let mut predicates: Vec<Candidate> = Vec::new();
        let mut objects: Vec<Term> = Vec::new();

        for m in matches {
            subjects.extend(m.models.iter().cloned());
            predicates.extend(m.relationships.iter().cloned());

            let seed = if m.token.is_quoted() {
                Some(m.token.unquoted())
            } else if preceding_word(&query_words, &m.token).is_some_and(is_preposition) {
                Some(m.token.text.clone())
            } else {
                None
            };

            if let Some(seed) = seed {
                let hits = search(self.gateway, domain, &seed).await?;
                debug!(seed = %seed, hits = hits.len(), "object lookup");
                objects.extend(
                    hits.into_iter()
                        .take(self.config.object_search_limit)
                        .map(Term::Entity),
                );
            }
        }

        if !subjects.is_empty() && predicates.is_empty() {
            let relationships = self.catalog.relationships(domain)?;
            for subject in &subjects {
                predicates.extend(relationships.iter().filter(|r| r.binds_to(subject)).cloned());
            }
        }

        if objects.is_empty() {
            objects.push(Term::Empty);
        }

        let subjects = dedupe(subjects);
        let predicates = dedupe(predicates);
        debug!(
            subjects = subjects.len(),
            predicates = predicates.len(),
            objects = objects.len(),
            "proposition parts"
        );

        let mut propositions = Vec::new();
        for subject in &subjects {
            for predicate in predicates.iter().filter(|p| p.binds_to(subject)) {
                for object in &objects {
                    propositions.push(Proposition::relation(
                        subject.clone(),
                        predicate.clone(),
                        object.clone(),
                    ));
                }
            }
        }

        let fallback = search(self.gateway, domain, query).await?;
        debug!(structured = propositions.len(), literal = fallback.len(), "propositions built");
        propositions.extend(fallback.into_iter().map(Proposition::instance_of));

        Ok(propositions)
    }
}

/// Keep the first occurrence of each candidate.
fn dedupe(items: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = HashSet::with_capacity(items.len());
    items.into_iter().filter(|c| seen.insert(c.clone())).collect()
}
