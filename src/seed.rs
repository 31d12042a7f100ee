//! Writes entities into a backend following the graph layout.
//!
//! Each write runs in its own `ReadWrite` transaction. Nothing here
//! validates against the catalog; it only keeps type nodes unique per
//! domain and wires instance-of edges.

use hashbrown::HashMap;
use tracing::debug;

use crate::domain::Domain;
use crate::layout::{APP_LABEL, AUTHOR, COUNTRY_MODEL, INSTANCE_OF, ISOA3, MODEL_NAME, NAME, TYPE_LABEL};
use crate::model::*;
use crate::storage::StorageBackend;
use crate::tx::TxMode;
use crate::Result;

/// Loader for one domain's data.
pub struct GraphSeeder<'a, B: StorageBackend> {
    backend: &'a B,
    domain: Domain,
    /// model name → type node
    types: HashMap<String, NodeId>,
}

impl<'a, B: StorageBackend> GraphSeeder<'a, B> {
    pub fn new(backend: &'a B, domain: Domain) -> Self {
        Self { backend, domain, types: HashMap::new() }
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// The domain's type node for `model`, created on first use.
    pub async fn type_node(&mut self, model: &str) -> Result<NodeId> {
        if let Some(id) = self.types.get(model) {
            return Ok(*id);
        }

        let mut tx = self.backend.begin_tx(TxMode::ReadWrite).await?;
        let existing = self
            .backend
            .nodes_by_property(&tx, TYPE_LABEL, MODEL_NAME, &Value::from(model))
            .await?
            .into_iter()
            .find(|n| n.get_str(APP_LABEL) == Some(self.domain.app_label()));

        let id = match existing {
            Some(node) => node.id,
            None => {
                let properties = props([
                    (APP_LABEL, self.domain.app_label()),
                    (MODEL_NAME, model),
                    (NAME, model),
                ]);
                let id = self.backend.create_node(&mut tx, &[TYPE_LABEL], properties).await?;
                debug!(domain = %self.domain.slug, model, id = %id, "type node created");
                id
            }
        };
        self.backend.commit_tx(tx).await?;

        self.types.insert(model.to_string(), id);
        Ok(id)
    }

    /// Create a named instance of `model`.
    pub async fn entity(&mut self, model: &str, name: &str) -> Result<NodeId> {
        self.entity_with(model, name, PropertyMap::new()).await
    }

    /// Create an instance of `model` with extra properties.
    pub async fn entity_with(&mut self, model: &str, name: &str, mut properties: PropertyMap) -> Result<NodeId> {
        let type_id = self.type_node(model).await?;
        properties.insert(NAME.into(), Value::from(name));

        let mut tx = self.backend.begin_tx(TxMode::ReadWrite).await?;
        let id = self.backend.create_node(&mut tx, &[model], properties).await?;
        self.backend
            .create_relationship(&mut tx, type_id, id, INSTANCE_OF, PropertyMap::new())
            .await?;
        self.backend.commit_tx(tx).await?;
        Ok(id)
    }

    /// Create a country identified by its ISO 3166 alpha-3 code.
    pub async fn country(&mut self, name: &str, isoa3: &str) -> Result<NodeId> {
        self.entity_with(COUNTRY_MODEL, name, props([(ISOA3, isoa3)])).await
    }

    /// `(src) -[rel_type]-> (dst)`.
    pub async fn relate(&self, src: NodeId, rel_type: &str, dst: NodeId) -> Result<RelId> {
        let mut tx = self.backend.begin_tx(TxMode::ReadWrite).await?;
        let id = self
            .backend
            .create_relationship(&mut tx, src, dst, rel_type, PropertyMap::new())
            .await?;
        self.backend.commit_tx(tx).await?;
        Ok(id)
    }

    /// Record the users that edited `node`, replacing any previous list.
    pub async fn set_authors(&self, node: NodeId, users: &[i64]) -> Result<()> {
        let authors = Value::List(users.iter().copied().map(Value::Int).collect());
        let mut tx = self.backend.begin_tx(TxMode::ReadWrite).await?;
        self.backend.set_node_property(&mut tx, node, AUTHOR, authors).await?;
        self.backend.commit_tx(tx).await
    }
}
