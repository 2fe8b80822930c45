//! Routing decisions of the support desk

mod mock_classifiers;

use deskroute_classifiers::EscalationPolicy;
use deskroute_retrieval::{Corpus, HashingEmbedder, RetrievalOutcome, SemanticRetriever};
use deskroute_router::{Route, SupportDesk};
use mock_classifiers::{FailingClassifier, MockClassifier};
use std::sync::Arc;

fn retriever() -> SemanticRetriever {
    let corpus = Corpus::from_texts([
        "Сброс пароля через портал",
        "Настройка VPN клиента",
        "Принтер: замена картриджа",
        "Почта: настройка подписи",
    ]);
    SemanticRetriever::from_corpus(corpus, Arc::new(HashingEmbedder::new(128).unwrap())).unwrap()
}

fn desk_with(classifier: MockClassifier) -> SupportDesk {
    SupportDesk::new(Arc::new(classifier), EscalationPolicy::new(0.6), retriever(), 3)
}

#[test]
fn test_low_confidence_escalates() {
    let desk = desk_with(MockClassifier::new("mock").with_score(0.55));
    let route = desk.route("Что-то непонятное").unwrap();

    assert!(route.is_escalated());
    assert_eq!(route.classification().score, 0.55);
    assert_eq!(desk.metrics().snapshot().escalations, 1);
}

#[test]
fn test_confident_request_is_answered() {
    let desk = desk_with(MockClassifier::new("mock").with_score(0.75).with_label("access"));

    match desk.route("Как сбросить пароль").unwrap() {
        Route::Answered { classification, answers } => {
            assert_eq!(classification.label, "access");
            let docs = answers.documents();
            assert!(!docs.is_empty() && docs.len() <= 3);
            assert!(docs.windows(2).all(|w| w[0].score >= w[1].score));
        }
        other => panic!("expected an answer, got {:?}", other),
    }
}

#[test]
fn test_threshold_boundary_does_not_escalate() {
    let desk = desk_with(MockClassifier::new("mock").with_score(0.6));
    assert!(!desk.route("граница").unwrap().is_escalated());
    assert!(desk.should_escalate(0.59));
    assert!(!desk.should_escalate(0.6));
}

#[test]
fn test_escalation_skips_retrieval() {
    let embedder = Arc::new(HashingEmbedder::new(16).unwrap());
    let desk = SupportDesk::new(
        Arc::new(MockClassifier::new("mock").with_score(0.1)),
        EscalationPolicy::default(),
        SemanticRetriever::empty(embedder),
        3,
    );
    desk.route("что угодно").unwrap();
    assert_eq!(desk.metrics().snapshot().knowledge_base_empty, 0);
}

#[test]
fn test_empty_knowledge_base_answer() {
    let embedder = Arc::new(HashingEmbedder::new(16).unwrap());
    let desk = SupportDesk::new(
        Arc::new(MockClassifier::new("mock").with_score(0.9)),
        EscalationPolicy::default(),
        SemanticRetriever::empty(embedder),
        3,
    );

    match desk.route("пароль").unwrap() {
        Route::Answered { answers, .. } => assert_eq!(answers, RetrievalOutcome::KnowledgeBaseEmpty),
        other => panic!("expected an answer, got {:?}", other),
    }
    assert_eq!(desk.metrics().snapshot().knowledge_base_empty, 1);
}

#[test]
fn test_search_answers_respects_top_k() {
    let desk = desk_with(MockClassifier::new("mock"));
    assert_eq!(desk.search_answers("VPN", 1).unwrap().documents().len(), 1);
    assert_eq!(desk.search_answers("VPN", 10).unwrap().documents().len(), 4);
}

#[test]
fn test_classifier_failure_propagates_without_counting() {
    let desk = SupportDesk::new(
        Arc::new(FailingClassifier::new("failing")),
        EscalationPolicy::default(),
        retriever(),
        3,
    );
    assert!(desk.route("пароль").is_err());
    assert_eq!(desk.metrics().snapshot().total_requests, 0);
}

#[test]
fn test_route_serializes_with_decision_tag() {
    let desk = desk_with(MockClassifier::new("mock").with_score(0.2));
    let json = serde_json::to_value(desk.route("x").unwrap()).unwrap();
    assert_eq!(json["decision"], "escalated");
    assert_eq!(json["classification"]["label"], "access");
}

#[test]
fn test_from_config_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixtures::write_desk(dir.path());
    let desk = SupportDesk::from_config(&config).unwrap();

    assert_eq!(desk.retriever().len(), 4);
    let classification = desk.classify("Принтер не печатает").unwrap();
    assert_eq!(classification.label, "hardware");

    let route = desk.route("Принтер не печатает").unwrap();
    if let Route::Answered { answers, .. } = route {
        assert!(answers.documents().len() <= 3);
    }
}

#[test]
fn test_from_config_missing_artifact_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = fixtures::write_desk(dir.path());
    config.model_path = dir.path().join("absent.json");
    assert!(SupportDesk::from_config(&config).unwrap_err().is_config());
}

#[test]
fn test_from_config_empty_knowledge_base_dir_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = fixtures::write_desk(dir.path());
    let empty = dir.path().join("empty_kb");
    std::fs::create_dir_all(&empty).unwrap();
    config.knowledge_base_dir = empty;
    assert!(SupportDesk::from_config(&config).unwrap_err().is_config());
}
