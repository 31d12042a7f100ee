//! Summary operations: the request-level surface.
//!
//! A request names a domain namespace and one of a closed set of operations;
//! the response is a JSON body. List operations are paginated and answer
//! `{objects, meta: {q, page, limit, total_count}}`, aggregate operations
//! answer their map as is.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::catalog::SchemaCatalog;
use crate::execution::GraphGateway;
use crate::nlq::Proposition;
use crate::page::Paginator;
use crate::search::TriplePattern;
use crate::{Detective, Error, Result};

/// Summary operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Entities per country.
    Countries,
    /// Instances per entity type.
    Types,
    /// Entities edited by the requesting user.
    Mine,
    /// Literal name search.
    Search,
    /// Subject–predicate–object search.
    RdfSearch,
    /// Natural-language interpretation.
    Human,
    /// Catalog view for query builders.
    Syntax,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::Countries,
        Operation::Types,
        Operation::Mine,
        Operation::Search,
        Operation::RdfSearch,
        Operation::Human,
        Operation::Syntax,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Countries => "countries",
            Operation::Types => "types",
            Operation::Mine => "mine",
            Operation::Search => "search",
            Operation::RdfSearch => "rdf_search",
            Operation::Human => "human",
            Operation::Syntax => "syntax",
        }
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| Error::UnknownOperation(s.to_string()))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query-string parameters plus the authenticated user, if any.
#[derive(Debug, Clone, Default)]
pub struct SummaryRequest {
    pub params: HashMap<String, String>,
    pub user: Option<i64>,
}

impl SummaryRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_user(mut self, user: i64) -> Self {
        self.user = Some(user);
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// A parameter that must be present and non-empty.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.param(key)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::MissingParameter(key.to_string()))
    }

    /// 1-based page number, 1 when absent.
    pub fn page(&self) -> Result<usize> {
        self.positive_int("page").map(|p| p.unwrap_or(1))
    }

    /// Page size, `default` when absent.
    pub fn limit(&self, default: usize) -> Result<usize> {
        self.positive_int("limit").map(|l| l.unwrap_or(default))
    }

    fn positive_int(&self, key: &str) -> Result<Option<usize>> {
        self.param(key)
            .map(|raw| {
                raw.trim().parse::<usize>().map_err(|e| Error::InvalidParameter {
                    name: key.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }
}

impl<G: GraphGateway, C: SchemaCatalog> Detective<G, C> {
    /// Run a summary operation for the domain registered under `namespace`.
    pub async fn summary(
        &self,
        namespace: &str,
        operation: &str,
        request: &SummaryRequest,
    ) -> Result<serde_json::Value> {
        let operation: Operation = operation.parse()?;
        let domain = self.domains().resolve(namespace)?;
        info!(domain = %domain.slug, operation = %operation, "summary request");

        match operation {
            Operation::Countries => Ok(serde_json::to_value(self.summary_by_country(&domain).await?)?),
            Operation::Types => Ok(serde_json::to_value(self.summary_by_type(&domain).await?)?),
            Operation::Syntax => Ok(serde_json::to_value(self.catalog().syntax(&domain)?)?),
            Operation::Mine => {
                let user = request
                    .user
                    .ok_or_else(|| Error::Unauthorized("this operation requires authentication".into()))?;
                let entities = self.mine(user, &domain).await?;
                let objects: Vec<Proposition> = entities.into_iter().map(Proposition::instance_of).collect();
                self.paginate(request, objects, None)
            }
            Operation::Search => {
                let q = request.require("q")?.to_lowercase();
                let hits = self.literal_search(&q, &domain).await?;
                self.paginate(request, hits, Some(json!(q)))
            }
            Operation::RdfSearch => {
                let triple = TriplePattern::from_json(request.require("q")?)?;
                let hits = self.triple_search(&triple, &domain).await?;
                self.paginate(request, hits, Some(serde_json::to_value(&triple)?))
            }
            Operation::Human => {
                let q = request.require("q")?;
                let propositions = self.interpret(q, &domain).await?;
                self.paginate(request, propositions, Some(json!(q)))
            }
        }
    }

    fn paginate<T: Serialize>(
        &self,
        request: &SummaryRequest,
        items: Vec<T>,
        q: Option<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        let limit = request.limit(self.config().default_page_limit)?;
        let page = request.page()?;
        let page = Paginator::new(limit)?.page(items, page, q)?;
        Ok(serde_json::to_value(page)?)
    }
}
