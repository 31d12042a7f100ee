//! In-memory storage backend.
//!
//! This is the reference implementation of `StorageBackend`.
//! It uses simple maps protected by RwLock.
//!
//! ## Limitations
//!
//! - **No real transactions**: `commit_tx()` and `rollback_tx()` are no-ops.
//!   Writes are applied immediately. Rollback does NOT undo mutations.
//! - **No property indexes**: all property lookups scan the label index.
//!
//! Nodes are kept in id order, so label and property scans return nodes in
//! creation order. Callers must not rely on that for other backends.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use parking_lot::RwLock;
use async_trait::async_trait;

use crate::model::*;
use crate::tx::{Transaction, TxMode, TxId};
use crate::{Error, Result};
use super::StorageBackend;

// ============================================================================
// MemoryBackend
// ============================================================================

/// In-memory property graph storage. Cloning shares the same graph.
#[derive(Clone)]
pub struct MemoryBackend {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    nodes: RwLock<BTreeMap<NodeId, Node>>,
    relationships: RwLock<HashMap<RelId, Relationship>>,
    /// node_id → list of relationship IDs
    adjacency: RwLock<HashMap<NodeId, Vec<RelId>>>,
    /// label → node IDs (poor man's label index)
    label_index: RwLock<HashMap<String, Vec<NodeId>>>,
    next_node_id: AtomicU64,
    next_rel_id: AtomicU64,
    next_tx_id: AtomicU64,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                nodes: RwLock::new(BTreeMap::new()),
                relationships: RwLock::new(HashMap::new()),
                adjacency: RwLock::new(HashMap::new()),
                label_index: RwLock::new(HashMap::new()),
                next_node_id: AtomicU64::new(1),
                next_rel_id: AtomicU64::new(1),
                next_tx_id: AtomicU64::new(1),
            }),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// MemoryTx
// ============================================================================

/// In-memory transaction (just a marker, no MVCC).
pub struct MemoryTx {
    id: TxId,
    mode: TxMode,
}

impl Transaction for MemoryTx {
    fn mode(&self) -> TxMode { self.mode }
    fn id(&self) -> TxId { self.id }
}

// ============================================================================
// StorageBackend impl
// ============================================================================

#[async_trait]
impl StorageBackend for MemoryBackend {
    type Tx = MemoryTx;

    async fn begin_tx(&self, mode: TxMode) -> Result<MemoryTx> {
        let id = TxId(self.inner.next_tx_id.fetch_add(1, Ordering::Relaxed));
        Ok(MemoryTx { id, mode })
    }

    /// No-op: memory backend applies writes immediately, not on commit.
    async fn commit_tx(&self, _tx: MemoryTx) -> Result<()> { Ok(()) }

    /// WARNING: No-op. Mutations applied during this transaction are NOT reverted.
    async fn rollback_tx(&self, _tx: MemoryTx) -> Result<()> { Ok(()) }

    // ========================================================================
    // Writes
    // ========================================================================

    async fn create_node(
        &self,
        tx: &mut MemoryTx,
        labels: &[&str],
        props: PropertyMap,
    ) -> Result<NodeId> {
        ensure_writable(tx)?;
        let id = NodeId(self.inner.next_node_id.fetch_add(1, Ordering::Relaxed));
        let node = Node {
            id,
            labels: labels.iter().map(|l| l.to_string()).collect(),
            properties: props,
        };

        {
            let mut idx = self.inner.label_index.write();
            for label in &node.labels {
                idx.entry(label.clone()).or_default().push(id);
            }
        }

        self.inner.nodes.write().insert(id, node);
        self.inner.adjacency.write().insert(id, Vec::new());

        Ok(id)
    }

    async fn set_node_property(
        &self,
        tx: &mut MemoryTx,
        id: NodeId,
        key: &str,
        val: Value,
    ) -> Result<()> {
        ensure_writable(tx)?;
        let mut nodes = self.inner.nodes.write();
        let node = nodes.get_mut(&id).ok_or_else(|| Error::NotFound(format!("Node {id}")))?;
        node.properties.insert(key.to_string(), val);
        Ok(())
    }

    async fn create_relationship(
        &self,
        tx: &mut MemoryTx,
        src: NodeId,
        dst: NodeId,
        rel_type: &str,
        props: PropertyMap,
    ) -> Result<RelId> {
        ensure_writable(tx)?;
        {
            let nodes = self.inner.nodes.read();
            if !nodes.contains_key(&src) {
                return Err(Error::NotFound(format!("Source node {src}")));
            }
            if !nodes.contains_key(&dst) {
                return Err(Error::NotFound(format!("Target node {dst}")));
            }
        }

        let id = RelId(self.inner.next_rel_id.fetch_add(1, Ordering::Relaxed));
        let rel = Relationship {
            id,
            src,
            dst,
            rel_type: rel_type.to_string(),
            properties: props,
        };

        self.inner.relationships.write().insert(id, rel);

        let mut adj = self.inner.adjacency.write();
        adj.entry(src).or_default().push(id);
        if src != dst {
            adj.entry(dst).or_default().push(id);
        }

        Ok(id)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    async fn get_node(&self, _tx: &MemoryTx, id: NodeId) -> Result<Option<Node>> {
        Ok(self.inner.nodes.read().get(&id).cloned())
    }

    async fn get_relationships(
        &self,
        _tx: &MemoryTx,
        node: NodeId,
        dir: Direction,
        rel_type: Option<&str>,
    ) -> Result<Vec<Relationship>> {
        let adj = self.inner.adjacency.read();
        let rels = self.inner.relationships.read();

        let rel_ids = adj.get(&node).cloned().unwrap_or_default();
        let mut result = Vec::new();

        for rid in rel_ids {
            if let Some(rel) = rels.get(&rid) {
                let matches_dir = match dir {
                    Direction::Outgoing => rel.src == node,
                    Direction::Incoming => rel.dst == node,
                    Direction::Both => true,
                };
                let matches_type = rel_type.is_none_or(|t| rel.rel_type == t);

                if matches_dir && matches_type {
                    result.push(rel.clone());
                }
            }
        }

        Ok(result)
    }

    async fn nodes_by_property(
        &self,
        _tx: &MemoryTx,
        label: &str,
        key: &str,
        value: &Value,
    ) -> Result<Vec<Node>> {
        let idx = self.inner.label_index.read();
        let nodes = self.inner.nodes.read();

        let ids = idx.get(label).cloned().unwrap_or_default();
        Ok(ids.iter()
            .filter_map(|id| nodes.get(id))
            .filter(|n| n.get(key) == Some(value))
            .cloned()
            .collect())
    }
}

fn ensure_writable(tx: &MemoryTx) -> Result<()> {
    if tx.is_read_only() {
        return Err(Error::GraphQuery(format!(
            "write attempted in read-only transaction {}", tx.id().0
        )));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get_node() {
        let db = MemoryBackend::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).await.unwrap();

        let id = db.create_node(&mut tx, &["Organization"], props([("name", "Acme")])).await.unwrap();
        let node = db.get_node(&tx, id).await.unwrap().unwrap();

        assert_eq!(node.labels, vec!["Organization"]);
        assert_eq!(node.get_str("name"), Some("Acme"));
    }

    #[tokio::test]
    async fn test_read_only_tx_rejects_writes() {
        let db = MemoryBackend::new();
        let mut tx = db.begin_tx(TxMode::ReadOnly).await.unwrap();

        let result = db.create_node(&mut tx, &["Organization"], PropertyMap::new()).await;
        assert!(matches!(result, Err(Error::GraphQuery(_))));
    }

    #[tokio::test]
    async fn test_relationship_to_missing_node() {
        let db = MemoryBackend::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).await.unwrap();

        let a = db.create_node(&mut tx, &["Organization"], PropertyMap::new()).await.unwrap();
        let result = db.create_relationship(&mut tx, a, NodeId(999), "owner", PropertyMap::new()).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_relationships_filters() {
        let db = MemoryBackend::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).await.unwrap();

        let a = db.create_node(&mut tx, &["Project"], PropertyMap::new()).await.unwrap();
        let b = db.create_node(&mut tx, &["Organization"], PropertyMap::new()).await.unwrap();
        let c = db.create_node(&mut tx, &["Country"], PropertyMap::new()).await.unwrap();

        db.create_relationship(&mut tx, a, b, "owner", PropertyMap::new()).await.unwrap();
        db.create_relationship(&mut tx, a, c, "activity_in_country", PropertyMap::new()).await.unwrap();

        let out = db.get_relationships(&tx, a, Direction::Outgoing, None).await.unwrap();
        assert_eq!(out.len(), 2);

        let owners = db.get_relationships(&tx, a, Direction::Outgoing, Some("owner")).await.unwrap();
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].dst, b);

        let incoming = db.get_relationships(&tx, b, Direction::Incoming, None).await.unwrap();
        assert_eq!(incoming.len(), 1);
        assert!(db.get_relationships(&tx, b, Direction::Outgoing, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_neighbors_counts_parallel_edges() {
        let db = MemoryBackend::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).await.unwrap();

        let a = db.create_node(&mut tx, &["Project"], PropertyMap::new()).await.unwrap();
        let b = db.create_node(&mut tx, &["Organization"], PropertyMap::new()).await.unwrap();
        db.create_relationship(&mut tx, a, b, "owner", PropertyMap::new()).await.unwrap();
        db.create_relationship(&mut tx, a, b, "partner", PropertyMap::new()).await.unwrap();

        let around_b = db.neighbors(&tx, b, Direction::Both, None).await.unwrap();
        assert_eq!(around_b.len(), 2);
        assert!(around_b.iter().all(|n| n.id == a));
    }

    #[tokio::test]
    async fn test_nodes_by_property_in_creation_order() {
        let db = MemoryBackend::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).await.unwrap();

        let first = db.create_node(&mut tx, &["ModelType"], props([("app_label", "energy")])).await.unwrap();
        db.create_node(&mut tx, &["ModelType"], props([("app_label", "common")])).await.unwrap();
        let third = db.create_node(&mut tx, &["ModelType"], props([("app_label", "energy")])).await.unwrap();

        let found = db
            .nodes_by_property(&tx, "ModelType", "app_label", &Value::from("energy"))
            .await
            .unwrap();
        let ids: Vec<NodeId> = found.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![first, third]);
    }
}
