//! Pattern queries: the read vocabulary of the graph gateway.
//!
//! Each variant is one fixed graph pattern, already scoped to a domain when
//! it runs. The gateway decides how to evaluate it; callers only see the
//! flat records each pattern documents.

use serde::{Deserialize, Serialize};

/// A parameterized graph pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "pattern", rename_all = "snake_case")]
pub enum PatternQuery {
    /// Instances of any domain type whose lower-cased `name` contains
    /// `needle` (already normalized by the caller).
    ///
    /// Yields `{id, name, model}`.
    NameContains { needle: String },

    /// Instances of `subject_type` with an outgoing `predicate` edge to a
    /// node named exactly `object_name`.
    ///
    /// Yields distinct `{id, name, model}`.
    RelatedTo {
        subject_type: String,
        predicate: String,
        object_name: String,
    },

    /// Per country instance: rows of instance-of edges landing on the
    /// country or on any node one edge away from it, minus the country's own
    /// row.
    ///
    /// Yields `{isoa3, id, count}`.
    CountryInstanceCounts,

    /// Per domain type node with at least one instance: the instance count.
    ///
    /// Yields `{id, name, count}`.
    TypeInstanceCounts,

    /// Instances whose `_author` list contains `user`.
    ///
    /// Yields distinct `{id, name, model}`.
    AuthoredBy { user: i64 },
}

impl PatternQuery {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PatternQuery::NameContains { .. } => "name_contains",
            PatternQuery::RelatedTo { .. } => "related_to",
            PatternQuery::CountryInstanceCounts => "country_instance_counts",
            PatternQuery::TypeInstanceCounts => "type_instance_counts",
            PatternQuery::AuthoredBy { .. } => "authored_by",
        }
    }
}
