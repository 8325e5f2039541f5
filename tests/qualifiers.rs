use sealed_di::{InjectError, Injector, Tag};
use std::sync::Arc;

const PRIMARY: Tag = Tag::new("primary");
const REPLICA: Tag = Tag::new("replica");
const FAST: Tag = Tag::new("fast");

trait Gateway: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &'static str;
}

#[derive(Debug)]
struct PrimaryGateway;
impl Gateway for PrimaryGateway {
    fn name(&self) -> &'static str {
        "primary"
    }
}

#[derive(Debug)]
struct ReplicaGateway;
impl Gateway for ReplicaGateway {
    fn name(&self) -> &'static str {
        "replica"
    }
}

#[derive(Debug)]
struct MockGateway;
impl Gateway for MockGateway {
    fn name(&self) -> &'static str {
        "mock"
    }
}

#[test]
fn test_qualifier_picks_the_matching_candidate() {
    let injector = Injector::new();
    injector.bind::<dyn Gateway>().tagged(PRIMARY).to_instance(Arc::new(PrimaryGateway));
    injector.bind::<dyn Gateway>().tagged(REPLICA).to_instance(Arc::new(ReplicaGateway));

    let primary = injector.query::<dyn Gateway>().qualified(PRIMARY).resolve().unwrap();
    let replica = injector.query::<dyn Gateway>().qualified(REPLICA).resolve().unwrap();

    assert_eq!(primary.name(), "primary");
    assert_eq!(replica.name(), "replica");
}

#[test]
fn test_unqualified_query_against_two_candidates_fails() {
    let injector = Injector::new();
    injector.bind::<dyn Gateway>().tagged(PRIMARY).to_instance(Arc::new(PrimaryGateway));
    injector.bind::<dyn Gateway>().tagged(REPLICA).to_instance(Arc::new(ReplicaGateway));

    let err = injector.resolve::<dyn Gateway>().unwrap_err();
    assert!(matches!(err, InjectError::MoreThanOne { .. }));
    assert!(err.to_string().contains("More than one"));
}

#[test]
fn test_candidate_tags_may_exceed_the_qualifiers() {
    // Superset matching: a candidate tagged {primary, fast} satisfies a
    // query for {primary}.
    let injector = Injector::new();
    injector
        .bind::<dyn Gateway>()
        .tagged(PRIMARY)
        .tagged(FAST)
        .to_instance(Arc::new(PrimaryGateway));
    injector.bind::<dyn Gateway>().tagged(REPLICA).to_instance(Arc::new(ReplicaGateway));

    let gateway = injector.query::<dyn Gateway>().qualified(PRIMARY).resolve().unwrap();
    assert_eq!(gateway.name(), "primary");

    // And the multi-qualifier form selects the same candidate.
    let gateway = injector
        .query::<dyn Gateway>()
        .qualified_by([PRIMARY, FAST])
        .resolve()
        .unwrap();
    assert_eq!(gateway.name(), "primary");
}

#[test]
fn test_qualifier_without_match_stays_ambiguous() {
    let injector = Injector::new();
    injector.bind::<dyn Gateway>().tagged(PRIMARY).to_instance(Arc::new(PrimaryGateway));
    injector.bind::<dyn Gateway>().tagged(REPLICA).to_instance(Arc::new(ReplicaGateway));

    // No candidate carries FAST; the empty subset does not narrow anything
    // and the query ends ambiguous, carrying its qualifiers for diagnosis.
    let err = injector.query::<dyn Gateway>().qualified(FAST).resolve().unwrap_err();
    match &err {
        InjectError::MoreThanOne { qualifiers, .. } => {
            assert!(qualifiers.contains(FAST));
        }
        other => panic!("expected MoreThanOne, got {}", other),
    }
}

#[test]
fn test_mock_wins_over_the_real_candidate() {
    let injector = Injector::new();
    injector.bind::<dyn Gateway>().to_instance(Arc::new(PrimaryGateway));
    injector.bind::<dyn Gateway>().as_mock().to_instance(Arc::new(MockGateway));

    let gateway = injector.resolve::<dyn Gateway>().unwrap();
    assert_eq!(gateway.name(), "mock");
}

#[test]
fn test_lone_candidate_needs_no_qualifier_match() {
    // Stage one runs unfiltered, so a single candidate resolves even when
    // the query carries qualifiers the candidate does not.
    let injector = Injector::new();
    injector.bind::<dyn Gateway>().tagged(PRIMARY).to_instance(Arc::new(PrimaryGateway));

    let gateway = injector.query::<dyn Gateway>().qualified(FAST).resolve().unwrap();
    assert_eq!(gateway.name(), "primary");
}

#[test]
fn test_qualifier_narrows_then_mock_decides() {
    // Three candidates; {primary} matches two of them; among those the mock
    // gets the last word.
    let injector = Injector::new();
    injector.bind::<dyn Gateway>().tagged(PRIMARY).to_instance(Arc::new(PrimaryGateway));
    injector
        .bind::<dyn Gateway>()
        .tagged(PRIMARY)
        .as_mock()
        .to_instance(Arc::new(MockGateway));
    injector.bind::<dyn Gateway>().tagged(REPLICA).to_instance(Arc::new(ReplicaGateway));

    let gateway = injector.query::<dyn Gateway>().qualified(PRIMARY).resolve().unwrap();
    assert_eq!(gateway.name(), "mock");
}

#[test]
fn test_mock_outside_the_qualified_subset_is_ignored() {
    // The mock pass runs over the narrowed set: a mock that failed the
    // qualifier filter cannot hijack the query.
    let injector = Injector::new();
    injector.bind::<dyn Gateway>().tagged(PRIMARY).to_instance(Arc::new(PrimaryGateway));
    injector.bind::<dyn Gateway>().tagged(PRIMARY).to_instance(Arc::new(PrimaryGateway));
    injector.bind::<dyn Gateway>().tagged(REPLICA).as_mock().to_instance(Arc::new(MockGateway));

    let err = injector.query::<dyn Gateway>().qualified(PRIMARY).resolve().unwrap_err();
    assert!(matches!(err, InjectError::MoreThanOne { .. }));
}

#[test]
fn test_two_mocks_stay_ambiguous() {
    let injector = Injector::new();
    injector.bind::<dyn Gateway>().as_mock().to_instance(Arc::new(MockGateway));
    injector.bind::<dyn Gateway>().as_mock().to_instance(Arc::new(MockGateway));

    let err = injector.resolve::<dyn Gateway>().unwrap_err();
    assert!(matches!(err, InjectError::MoreThanOne { .. }));
}
