//! # detective: natural-language search over a property graph
//!
//! Reads a free-text question, fuzzy-matches its fragments against the entity
//! types and relationships of a domain, and turns the matches into ranked
//! subject–predicate–object propositions. Also answers literal name searches,
//! fully specified triple searches and a few dashboard aggregates.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `GraphGateway` and `SchemaCatalog` are the only seams
//!    between the pipeline and the outside world
//! 2. **Clean DTOs**: `Candidate`, `GraphNode`, `Proposition` cross all boundaries
//! 3. **Explicit domain**: every call takes the `&Domain` it is scoped to
//! 4. **Text processing is pure**: tokenizing and matching do no I/O
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use detective::{Detective, Domain, RelationshipDefinition, TypeDefinition};
//! use detective::seed::GraphSeeder;
//!
//! # async fn example() -> detective::Result<()> {
//! let detective = Detective::open_memory().await?;
//! let energy = Domain::new("energy");
//! detective.domains().register(energy.clone());
//! detective.catalog().register_type(&energy, TypeDefinition::new("Organization"))?;
//! detective.catalog().register_type(&energy, TypeDefinition::new("EnergyProduct"))?;
//! detective.catalog().register_relationship(
//!     &energy,
//!     RelationshipDefinition::new("owns", "owns", "Organization"),
//! )?;
//!
//! let mut seeder = GraphSeeder::new(detective.gateway().backend(), energy.clone());
//! let acme = seeder.entity("Organization", "Acme").await?;
//! let farm = seeder.entity("EnergyProduct", "SolarFarm1").await?;
//! seeder.relate(acme, "owns", farm).await?;
//!
//! for p in detective.interpret("organization owns \"SolarFarm1\"", &energy).await? {
//!     println!("{}", p.label);
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod storage;
pub mod tx;
pub mod layout;
pub mod domain;
pub mod config;
pub mod catalog;
pub mod pattern;
pub mod execution;
pub mod nlq;
pub mod search;
pub mod summary;
pub mod page;
pub mod service;
pub mod seed;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{Node, Relationship, Value, PropertyMap, NodeId, RelId, Direction};

// ============================================================================
// Re-exports: Storage
// ============================================================================

pub use storage::{StorageBackend, MemoryBackend};
pub use tx::{Transaction, TxMode, TxId};

// ============================================================================
// Re-exports: Search engine
// ============================================================================

pub use config::EngineConfig;
pub use domain::{Domain, DomainRegistry};
pub use catalog::{Candidate, RelationshipDefinition, SchemaCatalog, StaticCatalog, Syntax, TypeDefinition};
pub use execution::{GraphGateway, Record, StoreGateway};
pub use nlq::{Proposition, PropositionBuilder, Term};
pub use pattern::PatternQuery;
pub use search::{GraphNode, NamedRef, TriplePattern};
pub use summary::{Summary, SummaryBucket};
pub use service::{Operation, SummaryRequest};

// ============================================================================
// Top-level Detective handle
// ============================================================================

/// The primary entry point. Bundles a graph gateway, a schema catalog, the
/// domain registry and the engine configuration.
///
/// All methods take `&self`; the handle can be shared across tasks.
pub struct Detective<G: GraphGateway, C: SchemaCatalog> {
    gateway: G,
    catalog: C,
    domains: DomainRegistry,
    config: EngineConfig,
}

impl<G: GraphGateway, C: SchemaCatalog> Detective<G, C> {
    /// Create a handle with default configuration.
    pub fn new(gateway: G, catalog: C) -> Self {
        Self { gateway, catalog, domains: DomainRegistry::new(), config: EngineConfig::default() }
    }

    /// Create a handle with `config`, rejecting out-of-range settings.
    pub fn with_config(gateway: G, catalog: C, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { gateway, catalog, domains: DomainRegistry::new(), config })
    }

    /// Interpret a free-text query as propositions.
    pub async fn interpret(&self, query: &str, domain: &Domain) -> Result<Vec<Proposition>> {
        PropositionBuilder::new(&self.gateway, &self.catalog, &self.config)
            .interpret(query, domain)
            .await
    }

    /// Entities whose name contains `query`. An empty `query` is a missing
    /// parameter; one that is only punctuation matches every entity.
    pub async fn literal_search(&self, query: &str, domain: &Domain) -> Result<Vec<GraphNode>> {
        if query.is_empty() {
            return Err(Error::MissingParameter("q".into()));
        }
        search::search(&self.gateway, domain, query).await
    }

    /// Instances of `triple.subject` related by `triple.predicate` to the
    /// node named `triple.object`.
    pub async fn triple_search(&self, triple: &TriplePattern, domain: &Domain) -> Result<Vec<GraphNode>> {
        search::triple_search(&self.gateway, domain, triple).await
    }

    pub async fn summary_by_country(&self, domain: &Domain) -> Result<Summary> {
        summary::count_by_country(&self.gateway, domain).await
    }

    pub async fn summary_by_type(&self, domain: &Domain) -> Result<Summary> {
        summary::count_by_type(&self.gateway, domain).await
    }

    /// Entities edited by `user`.
    pub async fn mine(&self, user: i64, domain: &Domain) -> Result<Vec<GraphNode>> {
        summary::authored_by(&self.gateway, domain, user).await
    }

    pub fn domains(&self) -> &DomainRegistry {
        &self.domains
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

/// In-memory graph and catalog for testing and embedding.
impl Detective<StoreGateway<MemoryBackend>, StaticCatalog> {
    pub async fn open_memory() -> Result<Self> {
        let gateway = StoreGateway::new(MemoryBackend::new());
        Ok(Self::new(gateway, StaticCatalog::new()))
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Missing '{0}' parameter")]
    MissingParameter(String),

    #[error("Invalid '{name}' parameter: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Domain not found: {0}")]
    DomainNotFound(String),

    #[error("Unknown summary operation: {0}")]
    UnknownOperation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("No results on page {page} (of {pages})")]
    PageNotFound { page: usize, pages: usize },

    #[error("Graph query error: {0}")]
    GraphQuery(String),

    #[error("Malformed candidate: {0}")]
    MalformedCandidate(String),

    #[error("Type error: expected {expected}, got {got}")]
    TypeError { expected: String, got: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Response class of an error, for callers mapping errors onto a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    BadRequest,
    Unauthorized,
    NotFound,
    Internal,
}

impl Error {
    pub fn status(&self) -> Status {
        match self {
            Error::MissingParameter(_)
            | Error::InvalidParameter { .. }
            | Error::UnknownOperation(_)
            | Error::Json(_) => Status::BadRequest,
            Error::Unauthorized(_) => Status::Unauthorized,
            Error::DomainNotFound(_) | Error::PageNotFound { .. } => Status::NotFound,
            Error::GraphQuery(_)
            | Error::MalformedCandidate(_)
            | Error::TypeError { .. }
            | Error::NotFound(_)
            | Error::Config(_) => Status::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status() {
        assert_eq!(Error::MissingParameter("q".into()).status(), Status::BadRequest);
        assert_eq!(Error::Unauthorized("login".into()).status(), Status::Unauthorized);
        assert_eq!(Error::PageNotFound { page: 3, pages: 1 }.status(), Status::NotFound);
        assert_eq!(Error::DomainNotFound("x".into()).status(), Status::NotFound);
        assert_eq!(Error::GraphQuery("down".into()).status(), Status::Internal);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(Error::MissingParameter("q".into()).to_string(), "Missing 'q' parameter");
        assert_eq!(
            Error::PageNotFound { page: 3, pages: 1 }.to_string(),
            "No results on page 3 (of 1)"
        );
    }

    #[test]
    fn test_with_config_validates() {
        let gateway = StoreGateway::new(MemoryBackend::new());
        let config = EngineConfig { match_ratio: 1.5, ..EngineConfig::default() };
        let err = Detective::with_config(gateway, StaticCatalog::new(), config).err();
        assert!(matches!(err, Some(Error::Config(_))));

        let gateway = StoreGateway::new(MemoryBackend::new());
        let config = EngineConfig { match_ratio: 0.8, ..EngineConfig::default() };
        let detective = Detective::with_config(gateway, StaticCatalog::new(), config).unwrap();
        assert_eq!(detective.config().match_ratio, 0.8);
    }
}
