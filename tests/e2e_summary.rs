//! End-to-end tests for the dashboard aggregates.

use detective::seed::GraphSeeder;
use detective::{Detective, Domain, MemoryBackend, NodeId, StaticCatalog, StoreGateway, SummaryBucket};
use pretty_assertions::assert_eq;

type MemoryDetective = Detective<StoreGateway<MemoryBackend>, StaticCatalog>;

struct Fixture {
    detective: MemoryDetective,
    energy: Domain,
    france: NodeId,
    spain: NodeId,
    acme: NodeId,
}

// ============================================================================
// Helper: three entities linked to France, none to Spain.
// ============================================================================

async fn setup_countries() -> Fixture {
    let detective = Detective::open_memory().await.unwrap();
    let energy = Domain::new("energy");
    detective.domains().register(energy.clone());

    let mut seeder = GraphSeeder::new(detective.gateway().backend(), energy.clone());
    let france = seeder.country("France", "FRA").await.unwrap();
    let spain = seeder.country("Spain", "ESP").await.unwrap();
    let acme = seeder.entity("Organization", "Acme").await.unwrap();
    let globex = seeder.entity("Organization", "Globex").await.unwrap();
    let farm = seeder.entity("EnergyProduct", "SolarFarm1").await.unwrap();
    seeder.relate(acme, "based_in", france).await.unwrap();
    seeder.relate(globex, "based_in", france).await.unwrap();
    seeder.relate(farm, "located_in", france).await.unwrap();
    seeder.relate(acme, "owns", farm).await.unwrap();

    Fixture { detective, energy, france, spain, acme }
}

// ============================================================================
// 1. Countries
// ============================================================================

#[tokio::test]
async fn test_country_counts() {
    let f = setup_countries().await;

    let summary = f.detective.summary_by_country(&f.energy).await.unwrap();

    assert_eq!(summary.len(), 2);
    assert_eq!(summary["FRA"], SummaryBucket { id: f.france, count: 3 });
    assert_eq!(summary["ESP"], SummaryBucket { id: f.spain, count: 0 });
}

#[tokio::test]
async fn test_country_counts_follow_either_direction() {
    let f = setup_countries().await;
    let mut seeder = GraphSeeder::new(f.detective.gateway().backend(), f.energy.clone());
    let grid = seeder.entity("EnergyProduct", "Iberian Grid").await.unwrap();
    seeder.relate(f.spain, "hosts", grid).await.unwrap();

    let summary = f.detective.summary_by_country(&f.energy).await.unwrap();

    assert_eq!(summary["ESP"].count, 1);
}

#[tokio::test]
async fn test_countries_of_other_domains_are_ignored() {
    let f = setup_countries().await;
    let mut health = GraphSeeder::new(f.detective.gateway().backend(), Domain::new("health"));
    health.country("Italy", "ITA").await.unwrap();

    let summary = f.detective.summary_by_country(&f.energy).await.unwrap();

    assert!(!summary.contains_key("ITA"));
}

// ============================================================================
// 2. Types
// ============================================================================

#[tokio::test]
async fn test_type_counts() {
    let f = setup_countries().await;

    let summary = f.detective.summary_by_type(&f.energy).await.unwrap();

    let counts: Vec<(&str, i64)> = summary.iter().map(|(k, b)| (k.as_str(), b.count)).collect();
    assert_eq!(counts, vec![("country", 2), ("energyproduct", 1), ("organization", 2)]);
}

#[tokio::test]
async fn test_type_counts_empty_domain() {
    let f = setup_countries().await;
    let summary = f.detective.summary_by_type(&Domain::new("health")).await.unwrap();
    assert!(summary.is_empty());
}

// ============================================================================
// 3. Authored entities
// ============================================================================

#[tokio::test]
async fn test_mine() {
    let f = setup_countries().await;
    let mut seeder = GraphSeeder::new(f.detective.gateway().backend(), f.energy.clone());
    seeder.set_authors(f.acme, &[7, 9]).await.unwrap();
    let extra = seeder.entity("Organization", "Initech").await.unwrap();
    seeder.set_authors(extra, &[9]).await.unwrap();

    let mine = f.detective.mine(7, &f.energy).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].name, "Acme");
    assert_eq!(mine[0].type_label, "Organization");

    assert_eq!(f.detective.mine(9, &f.energy).await.unwrap().len(), 2);
    assert!(f.detective.mine(1, &f.energy).await.unwrap().is_empty());
}
