//! Domains (topics): named partitions of the schema and the data.
//!
//! A domain is resolved once per request and then passed explicitly to every
//! catalog, gateway and search call.

use hashbrown::HashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Error, Result};

/// A resolved domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Domain {
    /// Public identifier, also the request namespace (e.g. `"energy"`).
    pub slug: String,
    /// Partition key stored on type nodes.
    pub app_label: String,
}

impl Domain {
    /// A domain whose app label equals its slug.
    pub fn new(slug: impl Into<String>) -> Self {
        let slug = slug.into();
        Self { app_label: slug.clone(), slug }
    }

    pub fn with_app_label(mut self, app_label: impl Into<String>) -> Self {
        self.app_label = app_label.into();
        self
    }

    pub fn app_label(&self) -> &str {
        &self.app_label
    }
}

/// Namespace → domain resolution.
#[derive(Default)]
pub struct DomainRegistry {
    domains: RwLock<HashMap<String, Domain>>,
}

impl DomainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a domain under its slug.
    pub fn register(&self, domain: Domain) {
        info!(slug = %domain.slug, app_label = %domain.app_label, "domain registered");
        self.domains.write().insert(domain.slug.clone(), domain);
    }

    /// Resolve a request namespace to its domain.
    pub fn resolve(&self, namespace: &str) -> Result<Domain> {
        let found = self.domains.read().get(namespace).cloned();
        match found {
            Some(domain) => Ok(domain),
            None => {
                debug!(namespace, "no domain for namespace");
                Err(Error::DomainNotFound(namespace.to_string()))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.domains.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.read().is_empty()
    }
}
