use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::config::EmbeddingConfig;

fn test_config(api_url: String, api_key: Option<String>) -> EmbeddingConfig {
    EmbeddingConfig {
        api_url,
        api_key,
        model: "jina-embeddings-v2-base-en".to_string(),
        dimension: 4,
        timeout_secs: 5,
        max_retries: 3,
        retry_delay_ms: 10,
    }
}

fn embeddings_body(vectors: &[Vec<f32>]) -> serde_json::Value {
    serde_json::json!({
        "data": vectors
            .iter()
            .map(|v| serde_json::json!({ "embedding": v }))
            .collect::<Vec<_>>()
    })
}

#[tokio::test]
async fn fallback_mode_returns_constant_vectors() {
    let client = JinaClient::new(&test_config("http://localhost:1/unused".to_string(), None))
        .expect("can build client");

    let texts = vec!["a".to_string(), "b".to_string()];
    let vectors = client.embed(&texts).await.expect("fallback never fails");

    assert_eq!(vectors.len(), 2);
    assert_eq!(vectors[0], vec![0.0; 4]);
    assert_eq!(vectors[0], vectors[1]);
}

#[tokio::test]
async fn fallback_mode_is_deterministic() {
    let client = JinaClient::new(&test_config("http://localhost:1/unused".to_string(), None))
        .expect("can build client");

    let texts = vec!["hello".to_string()];
    let first = client.embed(&texts).await.expect("embed succeeds");
    let second = client.embed(&texts).await.expect("embed succeeds");
    assert_eq!(first, second);
}

#[tokio::test]
async fn empty_input_returns_empty_output() {
    let client = JinaClient::new(&test_config("http://localhost:1/unused".to_string(), None))
        .expect("can build client");

    let vectors = client.embed(&[]).await.expect("embed succeeds");
    assert!(vectors.is_empty());
}

#[tokio::test]
async fn batch_preserves_order_and_length() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(
            serde_json::json!({ "input": ["first", "second"] }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(embeddings_body(&[
            vec![1.0, 0.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0, 0.0],
        ])))
        .mount(&server)
        .await;

    let client = JinaClient::new(&test_config(
        format!("{}/v1/embeddings", server.uri()),
        Some("test-key".to_string()),
    ))
    .expect("can build client");

    let texts = vec!["first".to_string(), "second".to_string()];
    let vectors = client.embed(&texts).await.expect("embed succeeds");

    assert_eq!(vectors.len(), texts.len());
    assert_eq!(vectors[0], vec![1.0, 0.0, 0.0, 0.0]);
    assert_eq!(vectors[1], vec![0.0, 1.0, 0.0, 0.0]);
}

#[tokio::test]
async fn count_mismatch_rejects_whole_batch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(embeddings_body(&[vec![1.0, 0.0, 0.0, 0.0]])),
        )
        .mount(&server)
        .await;

    let client = JinaClient::new(&test_config(
        server.uri(),
        Some("test-key".to_string()),
    ))
    .expect("can build client");

    let texts = vec!["a".to_string(), "b".to_string()];
    let err = client.embed(&texts).await.expect_err("should reject");
    assert!(matches!(err, RagError::InvalidEmbeddingResponse(_)));
}

#[tokio::test]
async fn wrong_dimension_rejects_whole_batch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(embeddings_body(&[
            vec![1.0, 0.0, 0.0, 0.0],
            vec![0.5, 0.5],
        ])))
        .mount(&server)
        .await;

    let client = JinaClient::new(&test_config(
        server.uri(),
        Some("test-key".to_string()),
    ))
    .expect("can build client");

    let texts = vec!["a".to_string(), "b".to_string()];
    let err = client.embed(&texts).await.expect_err("should reject");
    assert!(matches!(err, RagError::InvalidEmbeddingResponse(_)));
}

#[tokio::test]
async fn retries_server_errors_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(embeddings_body(&[vec![1.0, 0.0, 0.0, 0.0]])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = JinaClient::new(&test_config(
        server.uri(),
        Some("test-key".to_string()),
    ))
    .expect("can build client");

    let texts = vec!["a".to_string()];
    let vectors = client.embed(&texts).await.expect("third attempt succeeds");
    assert_eq!(vectors.len(), 1);
}

#[tokio::test]
async fn exhausted_retries_surface_upstream_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let client = JinaClient::new(&test_config(
        server.uri(),
        Some("test-key".to_string()),
    ))
    .expect("can build client");

    let texts = vec!["a".to_string()];
    let err = client.embed(&texts).await.expect_err("should fail");
    assert!(matches!(
        err,
        RagError::UpstreamUnavailable { attempts: 3, .. }
    ));
}

#[tokio::test]
async fn embed_one_returns_single_vector() {
    let client = JinaClient::new(&test_config("http://localhost:1/unused".to_string(), None))
        .expect("can build client");

    let vector = client.embed_one("query").await.expect("embed succeeds");
    assert_eq!(vector.len(), 4);
}
