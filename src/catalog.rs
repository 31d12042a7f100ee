//! # Schema catalog
//!
//! Per-domain list of entity types and of the relationships a query may use
//! as predicates. The catalog is filled at domain registration time and only
//! read afterwards; a registration swaps the domain's schema under a write
//! lock, so concurrent readers see either the old or the new schema.

use hashbrown::HashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::Domain;
use crate::{Error, Result};

// ============================================================================
// Candidates
// ============================================================================

/// A matchable unit: an entity type or a relationship.
///
/// `name` is the machine key (type class name, relationship type), `label`
/// the display text fuzzy matching runs against. Relationship candidates
/// also carry the name of the type that owns them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl Candidate {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self { name: name.into(), label: label.into(), subject: None }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Whether this relationship candidate can hang off `subject`.
    pub fn binds_to(&self, subject: &Candidate) -> bool {
        self.subject.as_deref() == Some(subject.name.as_str())
    }
}

// ============================================================================
// Definitions
// ============================================================================

/// A registered entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDefinition {
    /// Class name, e.g. `EnergyProduct`.
    pub name: String,
    /// Human name, e.g. `Energy product`. Derived from `name` when absent.
    #[serde(default)]
    pub verbose_name: Option<String>,
}

impl TypeDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), verbose_name: None }
    }

    pub fn with_verbose_name(mut self, verbose_name: impl Into<String>) -> Self {
        self.verbose_name = Some(verbose_name.into());
        self
    }

    /// Title-cased verbose name, the label queries are matched against.
    pub fn label(&self) -> String {
        match &self.verbose_name {
            Some(v) => title_case(v),
            None => title_case(&split_camel_case(&self.name)),
        }
    }

    pub fn to_candidate(&self) -> Candidate {
        Candidate::new(self.name.clone(), self.label())
    }
}

/// A relationship a subject type may hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipDefinition {
    /// Relationship type in the graph.
    pub name: String,
    /// Display label, e.g. `owns`.
    pub label: String,
    /// Name of the entity type that holds the relationship.
    pub subject: String,
}

impl RelationshipDefinition {
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self { name: name.into(), label: label.into(), subject: subject.into() }
    }

    pub fn to_candidate(&self) -> Candidate {
        Candidate::new(self.name.clone(), self.label.clone()).with_subject(self.subject.clone())
    }
}

/// Catalog view handed to clients building their own queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Syntax {
    pub subject: SubjectSyntax,
    pub predicate: PredicateSyntax,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectSyntax {
    pub model: Vec<Candidate>,
    /// Always null; named entities are found through search, not listed.
    pub entity: Option<Vec<Candidate>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredicateSyntax {
    pub relationship: Vec<Candidate>,
}

// ============================================================================
// SchemaCatalog trait
// ============================================================================

/// Read side of the schema, as seen by the interpretation pipeline.
pub trait SchemaCatalog: Send + Sync {
    /// Entity types of the domain, as `{name, label}` candidates.
    fn entity_types(&self, domain: &Domain) -> Result<Vec<Candidate>>;

    /// Relationships of the domain, as candidates with `subject` set.
    fn relationships(&self, domain: &Domain) -> Result<Vec<Candidate>>;

    fn syntax(&self, domain: &Domain) -> Result<Syntax> {
        Ok(Syntax {
            subject: SubjectSyntax { model: self.entity_types(domain)?, entity: None },
            predicate: PredicateSyntax { relationship: self.relationships(domain)? },
        })
    }
}

// ============================================================================
// StaticCatalog
// ============================================================================

#[derive(Debug, Clone, Default)]
struct DomainSchema {
    types: Vec<TypeDefinition>,
    relationships: Vec<RelationshipDefinition>,
}

/// In-process catalog filled through explicit registrations.
#[derive(Default)]
pub struct StaticCatalog {
    schemas: RwLock<HashMap<String, DomainSchema>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity type in a domain.
    pub fn register_type(&self, domain: &Domain, def: TypeDefinition) -> Result<()> {
        if def.name.trim().is_empty() {
            return Err(Error::MalformedCandidate("entity type with empty name".into()));
        }
        if def.label().trim().is_empty() {
            return Err(Error::MalformedCandidate(format!("entity type {} has an empty label", def.name)));
        }

        let mut schemas = self.schemas.write();
        let schema = schemas.entry(domain.slug.clone()).or_default();
        if schema.types.iter().any(|t| t.name == def.name) {
            return Err(Error::MalformedCandidate(format!(
                "entity type {} registered twice in {}", def.name, domain.slug
            )));
        }
        debug!(domain = %domain.slug, name = %def.name, "entity type registered");
        schema.types.push(def);
        Ok(())
    }

    /// Register a relationship. Its subject type must already be registered.
    pub fn register_relationship(&self, domain: &Domain, def: RelationshipDefinition) -> Result<()> {
        if def.name.trim().is_empty() || def.label.trim().is_empty() {
            return Err(Error::MalformedCandidate(format!(
                "relationship {:?} needs both a name and a label", def.name
            )));
        }

        let mut schemas = self.schemas.write();
        let schema = schemas.entry(domain.slug.clone()).or_default();
        if !schema.types.iter().any(|t| t.name == def.subject) {
            return Err(Error::MalformedCandidate(format!(
                "relationship {} refers to unknown subject type {:?} in {}",
                def.name, def.subject, domain.slug
            )));
        }
        if schema.relationships.iter().any(|r| r.name == def.name && r.subject == def.subject) {
            return Err(Error::MalformedCandidate(format!(
                "relationship {} on {} registered twice", def.name, def.subject
            )));
        }
        debug!(domain = %domain.slug, name = %def.name, subject = %def.subject, "relationship registered");
        schema.relationships.push(def);
        Ok(())
    }

    /// Replace a domain's whole schema at once.
    pub fn reload(
        &self,
        domain: &Domain,
        types: Vec<TypeDefinition>,
        relationships: Vec<RelationshipDefinition>,
    ) -> Result<()> {
        let staged = StaticCatalog::new();
        for def in types {
            staged.register_type(domain, def)?;
        }
        for def in relationships {
            staged.register_relationship(domain, def)?;
        }
        let schema = staged.schemas.into_inner().remove(&domain.slug).unwrap_or_default();
        info!(
            domain = %domain.slug,
            types = schema.types.len(),
            relationships = schema.relationships.len(),
            "schema reloaded"
        );
        self.schemas.write().insert(domain.slug.clone(), schema);
        Ok(())
    }
}

impl SchemaCatalog for StaticCatalog {
    fn entity_types(&self, domain: &Domain) -> Result<Vec<Candidate>> {
        let schemas = self.schemas.read();
        Ok(schemas
            .get(&domain.slug)
            .map(|s| s.types.iter().map(TypeDefinition::to_candidate).collect())
            .unwrap_or_default())
    }

    fn relationships(&self, domain: &Domain) -> Result<Vec<Candidate>> {
        let schemas = self.schemas.read();
        Ok(schemas
            .get(&domain.slug)
            .map(|s| s.relationships.iter().map(RelationshipDefinition::to_candidate).collect())
            .unwrap_or_default())
    }
}

// ============================================================================
// Label helpers
// ============================================================================

/// `EnergyProduct` → `energy product`.
pub fn split_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() && i > 0 {
            out.push(' ');
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// Upper-case the first letter of every run of letters, lower-case the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn energy() -> Domain {
        Domain::new("energy")
    }

    #[test]
    fn test_labels() {
        assert_eq!(title_case("Energy product"), "Energy Product");
        assert_eq!(title_case("power generation (in watts)"), "Power Generation (In Watts)");
        assert_eq!(split_camel_case("EnergyProduct"), "energy product");
        assert_eq!(TypeDefinition::new("Organization").label(), "Organization");
        assert_eq!(
            TypeDefinition::new("EnergyProject").with_verbose_name("Energy project").label(),
            "Energy Project"
        );
    }

    #[test]
    fn test_register_and_list() {
        let catalog = StaticCatalog::new();
        catalog.register_type(&energy(), TypeDefinition::new("Organization")).unwrap();
        catalog
            .register_relationship(&energy(), RelationshipDefinition::new("owns", "owns", "Organization"))
            .unwrap();

        assert_eq!(
            catalog.entity_types(&energy()).unwrap(),
            vec![Candidate::new("Organization", "Organization")]
        );
        assert_eq!(
            catalog.relationships(&energy()).unwrap(),
            vec![Candidate::new("owns", "owns").with_subject("Organization")]
        );
        assert!(catalog.entity_types(&Domain::new("health")).unwrap().is_empty());
    }

    #[test]
    fn test_relationship_needs_known_subject() {
        let catalog = StaticCatalog::new();
        let err = catalog
            .register_relationship(&energy(), RelationshipDefinition::new("owns", "owns", "Organization"))
            .unwrap_err();
        assert!(matches!(err, Error::MalformedCandidate(_)));
    }

    #[test]
    fn test_rejects_empty_and_duplicate_types() {
        let catalog = StaticCatalog::new();
        assert!(catalog.register_type(&energy(), TypeDefinition::new(" ")).is_err());
        catalog.register_type(&energy(), TypeDefinition::new("Country")).unwrap();
        assert!(catalog.register_type(&energy(), TypeDefinition::new("Country")).is_err());
    }

    #[test]
    fn test_reload_is_all_or_nothing() {
        let catalog = StaticCatalog::new();
        catalog.register_type(&energy(), TypeDefinition::new("Organization")).unwrap();

        let bad = catalog.reload(
            &energy(),
            vec![TypeDefinition::new("Country")],
            vec![RelationshipDefinition::new("owns", "owns", "Organization")],
        );
        assert!(bad.is_err());
        assert_eq!(catalog.entity_types(&energy()).unwrap()[0].name, "Organization");

        catalog
            .reload(&energy(), vec![TypeDefinition::new("Country")], Vec::new())
            .unwrap();
        assert_eq!(catalog.entity_types(&energy()).unwrap()[0].name, "Country");
    }

    #[test]
    fn test_syntax_view() {
        let catalog = StaticCatalog::new();
        catalog.register_type(&energy(), TypeDefinition::new("Organization")).unwrap();
        let syntax = catalog.syntax(&energy()).unwrap();
        let json = serde_json::to_value(&syntax).unwrap();
        assert_eq!(json["subject"]["entity"], serde_json::Value::Null);
        assert_eq!(json["subject"]["model"][0]["label"], "Organization");
        assert_eq!(json["predicate"]["relationship"], serde_json::json!([]));
    }

    #[test]
    fn test_binds_to() {
        let org = Candidate::new("Organization", "Organization");
        let owns = Candidate::new("owns", "owns").with_subject("Organization");
        let product = Candidate::new("EnergyProduct", "Energy Product");
        assert!(owns.binds_to(&org));
        assert!(!owns.binds_to(&product));
        assert!(!Candidate::new("x", "x").binds_to(&org));
    }
}
