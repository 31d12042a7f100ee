//! Dashboard aggregates.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::domain::Domain;
use crate::execution::GraphGateway;
use crate::model::NodeId;
use crate::pattern::PatternQuery;
use crate::search::GraphNode;
use crate::Result;

/// Count attached to a grouping node (a country or a type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummaryBucket {
    pub id: NodeId,
    pub count: i64,
}

/// Buckets keyed by ISO code or by lower-cased type name.
pub type Summary = BTreeMap<String, SummaryBucket>;

/// Entities per country, keyed by ISO 3166 alpha-3 code.
///
/// Countries without any related entity report 0; countries that are not
/// instances of the domain's `Country` type are not listed.
pub async fn count_by_country<G>(gateway: &G, domain: &Domain) -> Result<Summary>
where
    G: GraphGateway + ?Sized,
{
    let rows = gateway.run(&PatternQuery::CountryInstanceCounts, domain).await?;
    let mut summary = Summary::new();
    for row in &rows {
        let isoa3: String = row.get("isoa3")?;
        let bucket = SummaryBucket { id: row.get("id")?, count: row.get::<i64>("count")?.max(0) };
        summary.insert(isoa3, bucket);
    }
    debug!(domain = %domain.slug, countries = summary.len(), "country summary");
    Ok(summary)
}

/// Instances per entity type, keyed by lower-cased type name.
pub async fn count_by_type<G>(gateway: &G, domain: &Domain) -> Result<Summary>
where
    G: GraphGateway + ?Sized,
{
    let rows = gateway.run(&PatternQuery::TypeInstanceCounts, domain).await?;
    let mut summary = Summary::new();
    for row in &rows {
        let name: String = row.get("name")?;
        let bucket = SummaryBucket { id: row.get("id")?, count: row.get("count")? };
        summary.insert(name.to_lowercase(), bucket);
    }
    debug!(domain = %domain.slug, types = summary.len(), "type summary");
    Ok(summary)
}

/// Entities the given user has edited.
pub async fn authored_by<G>(gateway: &G, domain: &Domain, user: i64) -> Result<Vec<GraphNode>>
where
    G: GraphGateway + ?Sized,
{
    let rows = gateway.run(&PatternQuery::AuthoredBy { user }, domain).await?;
    rows.iter().map(GraphNode::from_record).collect()
}
