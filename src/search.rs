//! Literal entity search.
//!
//! `search` is a case-insensitive substring match on entity names;
//! `triple_search` resolves a fully specified subject–predicate–object
//! pattern. Both are scoped to one domain and return everything they find.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::Domain;
use crate::execution::{GraphGateway, Record};
use crate::model::NodeId;
use crate::pattern::PatternQuery;
use crate::{Error, Result};

/// Characters removed from a query before searching.
const STRIPPED: &[char] = &['"', '\'', '`', ';', ':', '{', '}', '(', ')', '|'];

/// An entity instance as returned by search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub name: String,
    /// Name of the entity's type.
    #[serde(rename = "model")]
    pub type_label: String,
}

impl GraphNode {
    /// Decode an `{id, name, model}` record. Malformed records are errors.
    pub fn from_record(row: &Record) -> Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            type_label: row.get("model")?,
        })
    }
}

/// Loose reference to a catalog entry or a named node, as sent by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl NamedRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), label: None }
    }
}

/// A resolved subject–predicate–object pattern.
///
/// `subject` names an entity type, `predicate` a relationship type and
/// `object` a literal node name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriplePattern {
    pub subject: NamedRef,
    pub predicate: NamedRef,
    pub object: NamedRef,
}

impl TriplePattern {
    pub fn new(subject: &str, predicate: &str, object: &str) -> Self {
        Self {
            subject: NamedRef::new(subject),
            predicate: NamedRef::new(predicate),
            object: NamedRef::new(object),
        }
    }

    /// Parse the JSON form `{"subject": {...}, "predicate": {...}, "object": {...}}`.
    pub fn from_json(raw: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        for part in ["subject", "predicate", "object"] {
            if value.get(part).is_none_or(serde_json::Value::is_null) {
                return Err(Error::MissingParameter(format!("q.{part}")));
            }
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// Lower-case, drop quoting/punctuation characters, trim.
pub fn normalize(query: &str) -> String {
    query
        .to_lowercase()
        .chars()
        .filter(|c| !STRIPPED.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Entities of `domain` whose name contains `query` (after normalization).
///
/// A query that normalizes to nothing matches every entity of the domain.
pub async fn search<G>(gateway: &G, domain: &Domain, query: &str) -> Result<Vec<GraphNode>>
where
    G: GraphGateway + ?Sized,
{
    let needle = normalize(query);
    let rows = gateway.run(&PatternQuery::NameContains { needle }, domain).await?;
    let hits = rows.iter().map(GraphNode::from_record).collect::<Result<Vec<_>>>()?;
    debug!(domain = %domain.slug, query, hits = hits.len(), "literal search");
    Ok(hits)
}

/// Instances of the subject type linked by the predicate to the named object.
pub async fn triple_search<G>(gateway: &G, domain: &Domain, triple: &TriplePattern) -> Result<Vec<GraphNode>>
where
    G: GraphGateway + ?Sized,
{
    let query = PatternQuery::RelatedTo {
        subject_type: triple.subject.name.clone(),
        predicate: triple.predicate.name.clone(),
        object_name: triple.object.name.clone(),
    };
    let rows = gateway.run(&query, domain).await?;
    rows.iter().map(GraphNode::from_record).collect()
}
