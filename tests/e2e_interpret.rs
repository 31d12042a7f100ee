//! End-to-end tests for natural-language interpretation.
//!
//! Each test exercises: tokenize -> fuzzy match -> object lookup ->
//! proposition assembly -> fallback search, against MemoryBackend.

use detective::seed::GraphSeeder;
use detective::{
    Detective, Domain, MemoryBackend, RelationshipDefinition, StaticCatalog, StoreGateway, Term,
    TypeDefinition,
};
use pretty_assertions::assert_eq;

type MemoryDetective = Detective<StoreGateway<MemoryBackend>, StaticCatalog>;

// ============================================================================
// Helper: an "energy" domain with Acme owning SolarFarm1.
// ============================================================================

async fn setup_energy() -> (MemoryDetective, Domain) {
    let detective = Detective::open_memory().await.unwrap();
    let energy = Domain::new("energy");
    detective.domains().register(energy.clone());

    let catalog = detective.catalog();
    catalog.register_type(&energy, TypeDefinition::new("Organization")).unwrap();
    catalog
        .register_type(&energy, TypeDefinition::new("EnergyProduct").with_verbose_name("energy product"))
        .unwrap();
    catalog.register_type(&energy, TypeDefinition::new("Country")).unwrap();
    catalog
        .register_relationship(&energy, RelationshipDefinition::new("owns", "owns", "Organization"))
        .unwrap();

    let mut seeder = GraphSeeder::new(detective.gateway().backend(), energy.clone());
    let acme = seeder.entity("Organization", "Acme").await.unwrap();
    let farm = seeder.entity("EnergyProduct", "SolarFarm1").await.unwrap();
    seeder.relate(acme, "owns", farm).await.unwrap();

    (detective, energy)
}

fn labels(propositions: &[detective::Proposition]) -> Vec<&str> {
    propositions.iter().map(|p| p.label.as_str()).collect()
}

// ============================================================================
// 1. Quoted entity name: only the instance-of reading
// ============================================================================

#[tokio::test]
async fn test_quoted_entity_name() {
    let (detective, energy) = setup_energy().await;

    let propositions = detective.interpret("\"Acme\"", &energy).await.unwrap();

    assert_eq!(labels(&propositions), vec!["Acme is instance of Organization"]);
    let p = &propositions[0];
    assert_eq!(p.predicate.name, "<<INSTANCE>>");
    assert!(matches!(&p.subject, Term::Entity(n) if n.name == "Acme"));
}

// ============================================================================
// 2. Type name alone: predicates widened from the type, empty object
// ============================================================================

#[tokio::test]
async fn test_type_name_widens_predicates() {
    let (detective, energy) = setup_energy().await;

    let propositions = detective.interpret("organization", &energy).await.unwrap();

    assert_eq!(labels(&propositions), vec!["Organization that owns "]);
    assert_eq!(propositions[0].object, Term::Empty);
}

// ============================================================================
// 3. Full subject, predicate and quoted object
// ============================================================================

#[tokio::test]
async fn test_subject_predicate_object() {
    let (detective, energy) = setup_energy().await;

    let propositions = detective
        .interpret("organization owns \"SolarFarm1\"", &energy)
        .await
        .unwrap();

    assert_eq!(labels(&propositions), vec!["Organization that owns SolarFarm1"]);
    let p = &propositions[0];
    assert!(matches!(&p.subject, Term::Candidate(c) if c.name == "Organization"));
    assert_eq!(p.predicate.subject.as_deref(), Some("Organization"));
    match &p.object {
        Term::Entity(node) => assert_eq!(node.type_label, "EnergyProduct"),
        other => panic!("expected an entity object, got {other:?}"),
    }
}

// ============================================================================
// 4. A word after a preposition is looked up as an entity
// ============================================================================

#[tokio::test]
async fn test_preposition_seeds_object() {
    let (detective, energy) = setup_energy().await;

    let propositions = detective.interpret("organization of acme", &energy).await.unwrap();

    assert_eq!(labels(&propositions), vec!["Organization that owns Acme"]);
}

#[tokio::test]
async fn test_object_lookup_keeps_first_five_hits() {
    let (detective, energy) = setup_energy().await;
    let mut seeder = GraphSeeder::new(detective.gateway().backend(), energy.clone());
    for n in 2..=7 {
        seeder.entity("Organization", &format!("Acme {n}")).await.unwrap();
    }

    let propositions = detective.interpret("organization of acme", &energy).await.unwrap();

    assert_eq!(
        labels(&propositions),
        vec![
            "Organization that owns Acme",
            "Organization that owns Acme 2",
            "Organization that owns Acme 3",
            "Organization that owns Acme 4",
            "Organization that owns Acme 5",
        ]
    );
    assert!(propositions.iter().all(|p| matches!(p.object, Term::Entity(_))));
}

// ============================================================================
// 5. No catalog match: only literal hits
// ============================================================================

#[tokio::test]
async fn test_literal_fallback_only() {
    let (detective, energy) = setup_energy().await;

    let propositions = detective.interpret("solar", &energy).await.unwrap();

    assert_eq!(labels(&propositions), vec!["SolarFarm1 is instance of EnergyProduct"]);
}

#[tokio::test]
async fn test_nothing_matches() {
    let (detective, energy) = setup_energy().await;
    assert!(detective.interpret("zzz", &energy).await.unwrap().is_empty());
}

// ============================================================================
// 6. Empty query
// ============================================================================

#[tokio::test]
async fn test_empty_query() {
    let (detective, energy) = setup_energy().await;
    assert!(detective.interpret("", &energy).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_lone_quote_lists_every_entity() {
    let (detective, energy) = setup_energy().await;

    let propositions = detective.interpret("\"", &energy).await.unwrap();

    assert_eq!(
        labels(&propositions),
        vec!["Acme is instance of Organization", "SolarFarm1 is instance of EnergyProduct"]
    );
}

// ============================================================================
// 7. Same graph, same query, same answer
// ============================================================================

#[tokio::test]
async fn test_interpret_is_idempotent() {
    let (detective, energy) = setup_energy().await;

    let first = detective.interpret("organization owns \"SolarFarm1\"", &energy).await.unwrap();
    let second = detective.interpret("organization owns \"SolarFarm1\"", &energy).await.unwrap();

    assert_eq!(first, second);
}

// ============================================================================
// 8. Every relation reading binds its predicate to its subject
// ============================================================================

#[tokio::test]
async fn test_predicates_bind_to_subjects() {
    let (detective, energy) = setup_energy().await;
    detective
        .catalog()
        .register_relationship(&energy, RelationshipDefinition::new("yields", "yields", "EnergyProduct"))
        .unwrap();

    let propositions = detective
        .interpret("organization energy product", &energy)
        .await
        .unwrap();

    assert!(!propositions.is_empty());
    for p in &propositions {
        if let Term::Candidate(subject) = &p.subject {
            assert_eq!(p.predicate.subject.as_deref(), Some(subject.name.as_str()));
        }
    }
    assert!(labels(&propositions).contains(&"Organization that owns "));
    assert!(labels(&propositions).contains(&"Energy Product that yields "));
}

// ============================================================================
// 9. Entities of other domains stay invisible
// ============================================================================

#[tokio::test]
async fn test_other_domain_is_invisible() {
    let (detective, energy) = setup_energy().await;
    let health = Domain::new("health");
    detective.domains().register(health.clone());
    let mut seeder = GraphSeeder::new(detective.gateway().backend(), health.clone());
    seeder.entity("Organization", "Acme Clinic").await.unwrap();

    let energy_hits = detective.interpret("acme", &energy).await.unwrap();
    assert_eq!(labels(&energy_hits), vec!["Acme is instance of Organization"]);

    let health_hits = detective.interpret("acme", &health).await.unwrap();
    assert_eq!(labels(&health_hits), vec!["Acme Clinic is instance of Organization"]);
}
