//! Gemini client tests against a mocked Generative Language API.

use docqa::llm::{GeminiClient, LLMClient, Provider};
use docqa::rag::embeddings::{Embedder, GeminiEmbedder};
use docqa::types::AppError;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const KEY: &str = "test-gemini-key";

fn chat_client(server: &MockServer, model: &str) -> GeminiClient {
    GeminiClient::new(KEY.to_string(), server.uri(), model.to_string(), 5).unwrap()
}

fn embedder(server: &MockServer) -> GeminiEmbedder {
    GeminiEmbedder::new(KEY.to_string(), server.uri(), "models/gemini-embedding-001", 5).unwrap()
}

fn candidate(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5}
    })
}

/// Echoes one embedding per request, `[index, len]`.
struct EchoEmbeddings;

impl Respond for EchoEmbeddings {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        let embeddings: Vec<serde_json::Value> = body["requests"]
            .as_array()
            .unwrap()
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let text = r["content"]["parts"][0]["text"].as_str().unwrap();
                json!({"values": [i as f32, text.len() as f32]})
            })
            .collect();
        ResponseTemplate::new(200).set_body_json(json!({"embeddings": embeddings}))
    }
}

// ============= generateContent =============

#[tokio::test]
async fn test_generate_sends_key_and_prompt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(header("x-goog-api-key", KEY))
        .and(body_partial_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "What is Rust?"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("A systems language.")))
        .expect(1)
        .mount(&server)
        .await;

    let client = chat_client(&server, "gemini-2.5-flash");
    let answer = client.generate("What is Rust?").await.unwrap();

    assert_eq!(answer, "A systems language.");
    assert_eq!(client.model_name(), "gemini-2.5-flash");
}

#[tokio::test]
async fn test_generate_with_system_instruction() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(body_partial_json(json!({
            "systemInstruction": {"parts": [{"text": "Answer in one word."}]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("Yes")))
        .mount(&server)
        .await;

    // Already-qualified model names are used as-is
    let client = chat_client(&server, "models/gemini-2.5-flash");
    let answer = client
        .generate_with_system("Answer in one word.", "Is Rust fast?")
        .await
        .unwrap();

    assert_eq!(answer, "Yes");
}

#[tokio::test]
async fn test_blocked_prompt_is_llm_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"promptFeedback": {"blockReason": "SAFETY"}})),
        )
        .mount(&server)
        .await;

    let err = chat_client(&server, "gemini-2.5-flash")
        .generate("something unsafe")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::LLM(_)));
    assert!(err.message().contains("SAFETY"));
}

#[tokio::test]
async fn test_api_error_message_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {
                "code": 429,
                "message": "Resource has been exhausted (e.g. check quota).",
                "status": "RESOURCE_EXHAUSTED"
            }
        })))
        .mount(&server)
        .await;

    let err = chat_client(&server, "gemini-2.5-flash")
        .generate("hi")
        .await
        .unwrap_err();

    let message = err.message();
    assert!(message.contains("429"));
    assert!(message.contains("RESOURCE_EXHAUSTED"));
    assert!(message.contains("Resource has been exhausted"));
}

#[tokio::test]
async fn test_provider_creates_working_client() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("pong")))
        .mount(&server)
        .await;

    let provider = Provider::Gemini {
        api_key: KEY.to_string(),
        base_url: format!("{}/", server.uri()),
        model: "gemini-2.0-flash".to_string(),
        timeout_secs: 5,
    };
    let client = provider.create_client().unwrap();

    assert_eq!(client.generate("ping").await.unwrap(), "pong");
}

// ============= batchEmbedContents =============

#[tokio::test]
async fn test_embed_documents_uses_document_task() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-embedding-001:batchEmbedContents"))
        .and(header("x-goog-api-key", KEY))
        .and(body_partial_json(json!({
            "requests": [{
                "model": "models/gemini-embedding-001",
                "taskType": "RETRIEVAL_DOCUMENT"
            }]
        })))
        .respond_with(EchoEmbeddings)
        .mount(&server)
        .await;

    let vectors = embedder(&server)
        .embed_documents(&["abc".to_string()])
        .await
        .unwrap();

    assert_eq!(vectors, vec![vec![0.0, 3.0]]);
}

#[tokio::test]
async fn test_embed_documents_batches_by_hundred() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-embedding-001:batchEmbedContents"))
        .respond_with(EchoEmbeddings)
        .expect(3)
        .mount(&server)
        .await;

    let texts: Vec<String> = (0..250).map(|i| format!("chunk {}", i)).collect();
    let vectors = embedder(&server).embed_documents(&texts).await.unwrap();

    assert_eq!(vectors.len(), 250);
    // Indices restart with every batch
    assert_eq!(vectors[99][0], 99.0);
    assert_eq!(vectors[100][0], 0.0);
    assert_eq!(vectors[249][0], 49.0);
}

#[tokio::test]
async fn test_embed_query_uses_query_task() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "requests": [{"taskType": "RETRIEVAL_QUERY"}]
        })))
        .respond_with(EchoEmbeddings)
        .mount(&server)
        .await;

    let vector = embedder(&server).embed_query("hello").await.unwrap();
    assert_eq!(vector, vec![0.0, 5.0]);
}

#[tokio::test]
async fn test_embedding_count_mismatch_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"embeddings": [{"values": [1.0]}]})),
        )
        .mount(&server)
        .await;

    let err = embedder(&server)
        .embed_documents(&["a".to_string(), "b".to_string()])
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Embedding(_)));
    assert!(err.message().contains("Expected 2 embeddings, got 1"));
}

#[tokio::test]
async fn test_embedding_http_error_is_embedding_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "API key not valid.", "status": "PERMISSION_DENIED"}
        })))
        .mount(&server)
        .await;

    let err = embedder(&server).embed_query("hi").await.unwrap_err();

    assert!(matches!(err, AppError::Embedding(_)));
    assert!(err.message().contains("API key not valid."));
}
