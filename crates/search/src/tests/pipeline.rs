//! End-to-end answering with in-memory services.

use super::support::{doc, service, FakeLlmClient, FakeSearchClient};
use crate::rag::answer::CitationError;
use crate::rag::ask::QaService;
use crate::rag::types::{AnswerMode, Citations, Notice};
use smartsearch_core::{AppConfig, AppError};
use std::sync::Arc;

const INDEX: &str = "cogsrch-snowflake-index-files";

fn snowflake_docs() -> FakeSearchClient {
    FakeSearchClient::new().with_page(
        INDEX,
        vec![doc("a", 2.0, 3), doc("b", 0.5, 4), doc("c", 3.0, 2)],
    )
}

#[tokio::test]
async fn test_quick_answer_uses_captions_in_one_call() {
    let search = Arc::new(snowflake_docs());
    let llm = Arc::new(FakeLlmClient::replying(
        "CLP is column-level protection.\nSOURCES: https://blob/a.pdf, https://blob/c.pdf",
    ));
    let qa = service(search.clone(), llm.clone(), &[INDEX]);

    let outcome = qa.ask("What is CLP?", AnswerMode::Quick, 0.5).await.unwrap();

    assert_eq!(outcome.answer.body, "CLP is column-level protection.");
    assert_eq!(
        outcome.answer.citations,
        Citations::Listed(vec![
            "https://blob/a.pdf".to_string(),
            "https://blob/c.pdf".to_string()
        ])
    );
    let ids: Vec<_> = outcome.results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
    assert!(outcome.notices.is_empty());

    let requests = llm.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.model, "gpt-35-turbo");
    assert_eq!(request.max_tokens, Some(256));
    assert_eq!(request.temperature, Some(0.5));
    assert!(request.prompt.contains("Content: a caption\nSource: https://blob/a.pdf"));
    assert!(request.prompt.contains("Content: c caption"));
    assert!(!request.prompt.contains("b caption"));
    assert!(!request.prompt.contains("a page 1"));
    assert!(request.prompt.contains("SOURCES:"));
    assert!(request.system.as_deref().unwrap_or_default().contains("\"en\""));

    assert_eq!(outcome.usage.map(|u| u.total_tokens), Some(15));
}

#[tokio::test]
async fn test_best_answer_maps_every_chunk_then_combines() {
    let search = Arc::new(snowflake_docs());
    let llm = Arc::new(FakeLlmClient::scripted(
        &["a1 extract", "", "a3 extract", "   ", "c2 extract"],
        "Micro-partitions.\nSOURCES: https://blob/c.pdf",
    ));
    let qa = service(search, llm.clone(), &[INDEX]);

    let outcome = qa.ask("How is data stored?", AnswerMode::Best, 0.2).await.unwrap();

    // 3 + 2 chunks mapped, one combine
    let requests = llm.requests();
    assert_eq!(requests.len(), 6);
    assert!(requests.iter().all(|r| r.max_tokens == Some(500)));
    assert!(requests.iter().all(|r| r.temperature == Some(0.2)));
    assert!(requests[0].prompt.contains("a page 1"));
    assert!(requests[4].prompt.contains("c page 2"));

    let combine = &requests[5].prompt;
    assert!(combine.contains("Content: a1 extract\nSource: https://blob/a.pdf"));
    assert!(combine.contains("Content: c2 extract\nSource: https://blob/c.pdf"));
    assert!(!combine.contains("Content: \n"));
    assert_eq!(combine.matches("Content:").count(), 3);

    assert_eq!(outcome.answer.body, "Micro-partitions.");
    assert_eq!(
        outcome.answer.citations,
        Citations::Listed(vec!["https://blob/c.pdf".to_string()])
    );
    assert_eq!(outcome.usage.map(|u| u.total_tokens), Some(90));
}

#[tokio::test]
async fn test_no_relevant_results_skips_generation() {
    let search = Arc::new(
        FakeSearchClient::new().with_page(INDEX, vec![doc("low", 0.4, 2), doc("edge", 1.0, 1)]),
    );
    let llm = Arc::new(FakeLlmClient::replying("unused"));
    let qa = service(search, llm.clone(), &[INDEX]);

    for mode in [AnswerMode::Quick, AnswerMode::Best] {
        let outcome = qa.ask("What is CLP?", mode, 0.5).await.unwrap();
        assert_eq!(outcome.answer.body, "No results found");
        assert!(matches!(outcome.answer.citations, Citations::NotAvailable(_)));
        assert!(outcome.results.is_empty());
        assert!(outcome.language.is_none());
        assert!(!outcome.generated());
    }
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_best_mode_without_chunks_skips_generation() {
    let search = Arc::new(FakeSearchClient::new().with_page(INDEX, vec![doc("empty", 3.0, 0)]));
    let llm = Arc::new(FakeLlmClient::replying("unused"));
    let qa = service(search, llm.clone(), &[INDEX]);

    let outcome = qa.ask("What is CLP?", AnswerMode::Best, 0.5).await.unwrap();
    assert_eq!(outcome.answer.body, "No results found");
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_failed_index_becomes_notice() {
    let search = Arc::new(
        FakeSearchClient::new()
            .failing("offline")
            .with_page(INDEX, vec![doc("a", 2.0, 1)]),
    );
    let llm = Arc::new(FakeLlmClient::replying("Answer.\nSOURCES: https://blob/a.pdf"));
    let qa = service(search.clone(), llm, &["offline", INDEX]);

    let outcome = qa.ask("What is CLP?", AnswerMode::Quick, 0.5).await.unwrap();

    let indexes: Vec<_> = search.calls().into_iter().map(|(index, _)| index).collect();
    assert_eq!(indexes, vec!["offline", INDEX]);
    assert_eq!(outcome.results.len(), 1);
    match outcome.notices.as_slice() {
        [Notice::RetrievalFailed { index, .. }] => assert_eq!(index, "offline"),
        other => panic!("unexpected notices: {:?}", other),
    }
}

#[tokio::test]
async fn test_all_indexes_failing_answers_no_results() {
    let search = Arc::new(FakeSearchClient::new().failing(INDEX));
    let llm = Arc::new(FakeLlmClient::replying("unused"));
    let qa = service(search, llm.clone(), &[INDEX]);

    let outcome = qa.ask("What is CLP?", AnswerMode::Quick, 0.5).await.unwrap();
    assert_eq!(outcome.answer.body, "No results found");
    assert_eq!(outcome.notices.len(), 1);
    assert!(outcome.notices[0].to_string().contains("check connection"));
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_malformed_results_are_discarded() {
    let mut broken = doc("broken", 3.0, 1);
    broken.captions = None;
    let search = Arc::new(FakeSearchClient::new().with_page(INDEX, vec![doc("a", 2.0, 1), broken]));
    let llm = Arc::new(FakeLlmClient::replying("unused"));
    let qa = service(search, llm.clone(), &[INDEX]);

    let outcome = qa.ask("What is CLP?", AnswerMode::Quick, 0.5).await.unwrap();
    assert!(outcome.results.is_empty());
    assert!(matches!(
        outcome.notices.as_slice(),
        [Notice::MalformedResults { .. }]
    ));
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_results_keep_retrieval_order_across_indexes() {
    let search = Arc::new(
        FakeSearchClient::new()
            .with_page("first", vec![doc("x", 2.0, 1), doc("y", 3.0, 1)])
            .with_page("second", vec![doc("z", 3.5, 1), doc("x", 1.5, 1)]),
    );
    let llm = Arc::new(FakeLlmClient::replying("Answer."));
    let qa = service(search, llm, &["first", "second"]);

    let outcome = qa.ask("What is CLP?", AnswerMode::Quick, 0.5).await.unwrap();
    let ids: Vec<_> = outcome.results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["x", "y", "z"]);
    assert_eq!(outcome.results[0].score, 1.5);
}

#[tokio::test]
async fn test_answer_without_delimiter_is_not_available() {
    let search = Arc::new(snowflake_docs());
    let llm = Arc::new(FakeLlmClient::replying("I don't know."));
    let qa = service(search, llm, &[INDEX]);

    let outcome = qa.ask("What is CLP?", AnswerMode::Quick, 0.5).await.unwrap();
    assert_eq!(outcome.answer.body, "I don't know.");
    assert_eq!(
        outcome.answer.citations,
        Citations::NotAvailable(CitationError::DelimiterAbsent)
    );
}

#[tokio::test]
async fn test_language_hint_comes_from_results() {
    let mut spanish = doc("es", 2.0, 1);
    spanish.language = Some("es".to_string());
    let search = Arc::new(FakeSearchClient::new().with_page(INDEX, vec![spanish]));
    let llm = Arc::new(FakeLlmClient::replying("Respuesta."));
    let qa = service(search, llm.clone(), &[INDEX]);

    let outcome = qa.ask("¿Qué es CLP?", AnswerMode::Quick, 0.5).await.unwrap();
    assert_eq!(outcome.language.as_deref(), Some("es"));
    let system = llm.requests()[0].system.clone().unwrap_or_default();
    assert!(system.contains("\"es\""));
}

#[tokio::test]
async fn test_empty_query_is_rejected_before_search() {
    let search = Arc::new(snowflake_docs());
    let llm = Arc::new(FakeLlmClient::replying("unused"));
    let qa = service(search.clone(), llm.clone(), &[INDEX]);

    match qa.ask("   ", AnswerMode::Quick, 0.5).await {
        Err(AppError::InvalidInput(message)) => assert_eq!(message, "Please enter a question!"),
        other => panic!("unexpected: {:?}", other.map(|o| o.answer)),
    }
    assert!(search.calls().is_empty());
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_out_of_range_temperature_is_rejected() {
    let search = Arc::new(snowflake_docs());
    let llm = Arc::new(FakeLlmClient::replying("unused"));
    let qa = service(search.clone(), llm, &[INDEX]);

    assert!(qa.ask("What is CLP?", AnswerMode::Quick, 1.5).await.is_err());
    assert!(search.calls().is_empty());
}

#[tokio::test]
async fn test_generation_failure_is_returned() {
    let search = Arc::new(snowflake_docs());
    let llm = Arc::new(FakeLlmClient::failing());
    let qa = service(search, llm, &[INDEX]);

    let result = qa.ask("What is CLP?", AnswerMode::Quick, 0.5).await;
    assert!(matches!(result, Err(AppError::Llm(_))));
}

#[test]
fn test_from_config_requires_every_setting() {
    let mut config = AppConfig::default();
    config.search.endpoint = "https://search.example.net".to_string();
    config.search.api_key = "search-key".to_string();
    config.openai.endpoint = "https://openai.example.net".to_string();

    match QaService::from_config(&config) {
        Err(AppError::Config(message)) => assert!(message.contains("AZURE_OPENAI_API_KEY")),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("service built without an API key"),
    }

    config.search.endpoint = String::new();
    match QaService::from_config(&config) {
        Err(AppError::Config(message)) => assert!(message.contains("AZURE_SEARCH_ENDPOINT")),
        _ => panic!("expected a configuration error"),
    }
}

#[test]
fn test_from_config_builds_with_full_settings() {
    let workspace = tempfile::TempDir::new().unwrap();
    let mut config = AppConfig::default();
    config.workspace = workspace.path().to_path_buf();
    config.search.endpoint = "https://search.example.net".to_string();
    config.search.api_key = "search-key".to_string();
    config.openai.endpoint = "https://openai.example.net".to_string();
    config.openai.api_key = "openai-key".to_string();

    let qa = QaService::from_config(&config).unwrap();
    assert_eq!(qa.indexes().to_vec(), vec![INDEX.to_string()]);
}
