//! Graph query gateway.
//!
//! Runs [`PatternQuery`] values against a storage backend and returns flat
//! records. Every run opens one read-only transaction, evaluates the pattern
//! scoped to the domain's type nodes, and materializes the full result.

use std::collections::HashMap;

use async_trait::async_trait;
use hashbrown::HashSet;
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::Domain;
use crate::layout::{APP_LABEL, AUTHOR, COUNTRY_MODEL, INSTANCE_OF, ISOA3, MODEL_NAME, NAME, TYPE_LABEL};
use crate::model::*;
use crate::pattern::PatternQuery;
use crate::storage::StorageBackend;
use crate::tx::TxMode;
use crate::{Error, Result};

// ============================================================================
// Records
// ============================================================================

/// A single flat result row: field name → scalar.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    pub values: HashMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Get a typed value from the row.
    pub fn get<T: FromValue>(&self, key: &str) -> Result<T> {
        let val = self.values.get(key)
            .ok_or_else(|| Error::NotFound(format!("Column '{key}'")))?;
        T::from_value(val)
    }
}

/// Convert from Value to concrete types.
pub trait FromValue: Sized {
    fn from_value(val: &Value) -> Result<Self>;
}

impl FromValue for String {
    fn from_value(val: &Value) -> Result<Self> {
        match val {
            Value::String(s) => Ok(s.clone()),
            _ => Err(Error::TypeError {
                expected: "String".into(),
                got: val.type_name().into(),
            }),
        }
    }
}

impl FromValue for i64 {
    fn from_value(val: &Value) -> Result<Self> {
        val.as_int().ok_or_else(|| Error::TypeError {
            expected: "Integer".into(),
            got: val.type_name().into(),
        })
    }
}

impl FromValue for NodeId {
    fn from_value(val: &Value) -> Result<Self> {
        match val.as_int() {
            Some(i) if i >= 0 => Ok(NodeId(i as u64)),
            _ => Err(Error::TypeError {
                expected: "NodeId".into(),
                got: val.type_name().into(),
            }),
        }
    }
}

// ============================================================================
// Gateway trait
// ============================================================================

/// Executes pattern queries; the only suspension point of the engine.
#[async_trait]
pub trait GraphGateway: Send + Sync {
    /// Run `query` restricted to `domain`. Fails with `Error::GraphQuery`.
    async fn run(&self, query: &PatternQuery, domain: &Domain) -> Result<Vec<Record>>;
}

// ============================================================================
// StoreGateway
// ============================================================================

/// Gateway evaluating patterns directly over a [`StorageBackend`].
pub struct StoreGateway<B: StorageBackend> {
    backend: B,
}

impl<B: StorageBackend> StoreGateway<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Access the underlying backend (for loading data).
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

#[async_trait]
impl<B: StorageBackend> GraphGateway for StoreGateway<B> {
    async fn run(&self, query: &PatternQuery, domain: &Domain) -> Result<Vec<Record>> {
        let tx = self.backend.begin_tx(TxMode::ReadOnly).await.map_err(into_graph_error)?;

        match evaluate(&self.backend, &tx, query, domain).await {
            Ok(rows) => {
                self.backend.commit_tx(tx).await.map_err(into_graph_error)?;
                debug!(pattern = query.kind(), domain = %domain.slug, rows = rows.len(), "pattern evaluated");
                Ok(rows)
            }
            Err(e) => {
                if let Err(rollback) = self.backend.rollback_tx(tx).await {
                    warn!(error = %rollback, "rollback after failed pattern run failed");
                }
                Err(into_graph_error(e))
            }
        }
    }
}

fn into_graph_error(e: Error) -> Error {
    match e {
        Error::GraphQuery(_) => e,
        other => Error::GraphQuery(other.to_string()),
    }
}

async fn evaluate<B: StorageBackend>(
    backend: &B,
    tx: &B::Tx,
    query: &PatternQuery,
    domain: &Domain,
) -> Result<Vec<Record>> {
    let types = backend
        .nodes_by_property(tx, TYPE_LABEL, APP_LABEL, &Value::from(domain.app_label()))
        .await?;

    let mut rows = Vec::new();
    match query {
        PatternQuery::NameContains { needle } => {
            for ty in &types {
                let model = model_name(ty)?;
                for inst in instances(backend, tx, ty).await? {
                    let Some(name) = inst.get_str(NAME) else { continue };
                    if name.to_lowercase().contains(needle.as_str()) {
                        rows.push(entity_record(inst.id, name, model));
                    }
                }
            }
        }

        PatternQuery::RelatedTo { subject_type, predicate, object_name } => {
            let mut seen = HashSet::new();
            for ty in types.iter().filter(|t| t.get_str(NAME) == Some(subject_type.as_str())) {
                let model = model_name(ty)?;
                for inst in instances(backend, tx, ty).await? {
                    let Some(name) = inst.get_str(NAME) else { continue };
                    let targets = backend
                        .neighbors(tx, inst.id, Direction::Outgoing, Some(predicate.as_str()))
                        .await?;
                    let hit = targets.iter().any(|t| t.get_str(NAME) == Some(object_name.as_str()));
                    if hit && seen.insert(inst.id) {
                        rows.push(entity_record(inst.id, name, model));
                    }
                }
            }
        }

        PatternQuery::CountryInstanceCounts => {
            for ty in types.iter().filter(|t| t.get_str(MODEL_NAME) == Some(COUNTRY_MODEL)) {
                for country in instances(backend, tx, ty).await? {
                    let Some(isoa3) = country.get_str(ISOA3) else { continue };
                    // The zero-hop row (the country's own instance-of edge) is
                    // part of the pattern and gets subtracted below.
                    let mut matched = incoming_instance_edges(backend, tx, country.id).await?;
                    for near in backend.neighbors(tx, country.id, Direction::Both, None).await? {
                        matched += incoming_instance_edges(backend, tx, near.id).await?;
                    }
                    let count = matched.saturating_sub(1);
                    rows.push(
                        Record::new()
                            .with("isoa3", isoa3)
                            .with("id", country.id.0)
                            .with("count", count as i64),
                    );
                }
            }
        }

        PatternQuery::TypeInstanceCounts => {
            for ty in &types {
                let model = model_name(ty)?;
                let count = backend
                    .get_relationships(tx, ty.id, Direction::Outgoing, Some(INSTANCE_OF))
                    .await?
                    .len();
                if count > 0 {
                    rows.push(
                        Record::new()
                            .with("id", ty.id.0)
                            .with("name", model)
                            .with("count", count as i64),
                    );
                }
            }
        }

        PatternQuery::AuthoredBy { user } => {
            let author = Value::Int(*user);
            let mut seen = HashSet::new();
            for ty in &types {
                let model = model_name(ty)?;
                for inst in instances(backend, tx, ty).await? {
                    let Some(name) = inst.get_str(NAME) else { continue };
                    let edited = inst.get(AUTHOR).is_some_and(|a| a.contains(&author));
                    if edited && seen.insert(inst.id) {
                        rows.push(entity_record(inst.id, name, model));
                    }
                }
            }
        }
    }
    Ok(rows)
}

fn model_name(type_node: &Node) -> Result<&str> {
    type_node.get_str(MODEL_NAME).ok_or_else(|| {
        Error::GraphQuery(format!("type node {} has no {MODEL_NAME}", type_node.id))
    })
}

async fn instances<B: StorageBackend>(backend: &B, tx: &B::Tx, type_node: &Node) -> Result<Vec<Node>> {
    backend.neighbors(tx, type_node.id, Direction::Outgoing, Some(INSTANCE_OF)).await
}

async fn incoming_instance_edges<B: StorageBackend>(backend: &B, tx: &B::Tx, node: NodeId) -> Result<usize> {
    Ok(backend
        .get_relationships(tx, node, Direction::Incoming, Some(INSTANCE_OF))
        .await?
        .len())
}

fn entity_record(id: NodeId, name: &str, model: &str) -> Record {
    Record::new()
        .with("id", id.0)
        .with("name", name)
        .with("model", model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_typed_get() {
        let row = Record::new().with("id", 7u64).with("name", "Acme");
        assert_eq!(row.get::<NodeId>("id").unwrap(), NodeId(7));
        assert_eq!(row.get::<String>("name").unwrap(), "Acme");
        assert!(matches!(row.get::<i64>("name"), Err(Error::TypeError { .. })));
        assert!(matches!(row.get::<String>("model"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_negative_id_is_rejected() {
        let row = Record::new().with("id", -1i64);
        assert!(row.get::<NodeId>("id").is_err());
    }

    #[test]
    fn test_record_serializes_flat() {
        let row = Record::new().with("count", 3i64);
        assert_eq!(serde_json::to_value(&row).unwrap(), serde_json::json!({"count": 3}));
    }
}
