use std::sync::Arc;

use annotation_common::properties::Properties;
use annotation_common::serialization::SerializerRegistry;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::pipeline_cache::PipelineCache;
use crate::prometheus::track_metrics;

#[derive(Clone)]
pub struct State {
    pub defaults: Arc<Properties>,
    pub pipelines: PipelineCache,
    pub serializers: Arc<SerializerRegistry>,
}

pub fn router(state: State, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::annotate).post(handlers::annotate))
        .route("/ping", get(handlers::ping).post(handlers::ping))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(axum::middleware::from_fn(track_metrics))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use annotation_common::document::Document;
    use annotation_common::properties::{ANNOTATORS, INPUT_FORMAT, OUTPUT_FORMAT};
    use annotation_common::serialization::{
        BinarySerializer, DocumentSerializer, ProtobufSerializer,
    };
    use axum::body::Body;
    use axum::http::{self, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt; // for `oneshot`

    use super::*;
    use crate::pipeline_cache::testing::CountingEngine;

    fn app(engine: &CountingEngine) -> (Router, PipelineCache) {
        let pipelines = PipelineCache::new(Arc::new(engine.clone()), 16, None);
        let state = State {
            defaults: Arc::new(
                Properties::new()
                    .with(ANNOTATORS, "tokenize,ssplit,pos,lemma")
                    .with(INPUT_FORMAT, "text")
                    .with(OUTPUT_FORMAT, "json"),
            ),
            pipelines: pipelines.clone(),
            serializers: Arc::new(SerializerRegistry::with_builtins()),
        };
        (router(state, 1024 * 1024), pipelines)
    }

    fn annotate_request(properties: &str, body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method(http::Method::POST)
            .uri(format!("/?properties={}", urlencoding::encode(properties)))
            .body(body.into())
            .unwrap()
    }

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec()
    }

    #[tokio::test]
    async fn ping_answers_pong() {
        let (app, _) = app(&CountingEngine::default());

        for method in [http::Method::GET, http::Method::POST] {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri("/ping")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers()[http::header::CONTENT_TYPE], "text/plain");
            assert_eq!(body_bytes(response).await, b"pong\n");
        }
    }

    #[tokio::test]
    async fn annotates_text_into_json() {
        let engine = CountingEngine::default();
        let (app, _) = app(&engine);

        let response = app
            .oneshot(annotate_request(
                r#"{"inputFormat":"text","outputFormat":"json"}"#,
                "Hello world.",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[http::header::CONTENT_TYPE].clone();
        assert!(content_type.to_str().unwrap().contains("json"));
        let content_length = response.headers()[http::header::CONTENT_LENGTH].clone();

        let body = body_bytes(response).await;
        assert_eq!(content_length, body.len().to_string().as_str());

        let value: Value = serde_json::from_slice(&body).unwrap();
        let sentences = value["sentences"].as_array().unwrap();
        assert_eq!(sentences.len(), 1);
        let words: Vec<&str> = sentences[0]["tokens"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["word"].as_str().unwrap())
            .collect();
        assert_eq!(words, vec!["Hello", "world", "."]);
        assert_eq!(engine.builds(), 1);
    }

    #[tokio::test]
    async fn unknown_output_format_is_rejected_before_building() {
        let engine = CountingEngine::default();
        let (app, pipelines) = app(&engine);

        let response = app
            .oneshot(annotate_request(r#"{"outputFormat":"bogus"}"#, "Hello world."))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(!body.is_empty());
        assert!(!body.contains('\n'));
        assert!(body.contains("bogus"));

        pipelines.run_pending_tasks().await;
        assert_eq!(engine.builds(), 0);
        assert_eq!(pipelines.entry_count(), 0);
    }

    #[tokio::test]
    async fn identical_requests_reuse_the_pipeline() {
        let engine = CountingEngine::default();
        let (app, _) = app(&engine);

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(annotate_request(r#"{"annotators":"tokenize,ssplit"}"#, "Hi there."))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        assert_eq!(engine.builds(), 1);
    }

    #[tokio::test]
    async fn malformed_properties_are_a_client_error() {
        let (app, _) = app(&CountingEngine::default());

        let response = app
            .oneshot(annotate_request(r#"{"outputFormat" "xml"}"#, "Hi."))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[http::header::CONTENT_TYPE], "text/plain");
    }

    #[tokio::test]
    async fn pipeline_failures_are_server_errors() {
        let engine = CountingEngine::default();
        let (app, pipelines) = app(&engine);

        let response = app
            .oneshot(annotate_request(r#"{"annotators":"tokenize,parse"}"#, "Hi."))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = String::from_utf8(body_bytes(response).await).unwrap();
        assert_eq!(body, "annotation failed: unknown annotator: parse");

        pipelines.run_pending_tasks().await;
        assert_eq!(pipelines.entry_count(), 0);
    }

    #[tokio::test]
    async fn serialized_documents_round_trip_through_protobuf() {
        let (app, _) = app(&CountingEngine::default());
        let mut body = Vec::new();
        ProtobufSerializer
            .write(&Document::new("Read this. Then that."), &mut body)
            .unwrap();

        let response = app
            .oneshot(annotate_request(
                r#"{"inputFormat":"serialized","inputSerializer":"protobuf",
                    "outputFormat":"serialized","outputSerializer":"protobuf"}"#,
                body,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[http::header::CONTENT_TYPE],
            "application/x-protobuf"
        );
        let bytes = body_bytes(response).await;
        let (document, rest) = ProtobufSerializer.read(&bytes).unwrap();
        assert!(rest.is_empty());
        assert_eq!(document.sentences.len(), 2);
        assert_eq!(document.tokens[0].lemma.as_deref(), Some("read"));
    }

    #[tokio::test]
    async fn serialized_input_defaults_to_binary() {
        let (app, _) = app(&CountingEngine::default());
        let mut body = Vec::new();
        BinarySerializer
            .write(&Document::new("Stored first. Stored second."), &mut body)
            .unwrap();

        let response = app
            .oneshot(annotate_request(
                r#"{"inputFormat":"serialized","outputFormat":"serialized"}"#,
                body,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[http::header::CONTENT_TYPE],
            "application/octet-stream"
        );
        let bytes = body_bytes(response).await;
        let (document, _) = BinarySerializer.read(&bytes).unwrap();
        assert_eq!(document.sentences.len(), 2);
        assert!(document.tokens.iter().all(|t| t.pos.is_some()));
    }

    #[tokio::test]
    async fn unreadable_serialized_bodies_are_client_errors() {
        let engine = CountingEngine::default();
        let (app, _) = app(&engine);

        // a binary string header claiming 1 TiB of text
        let mut huge_length = vec![253];
        huge_length.extend_from_slice(&(1u64 << 40).to_le_bytes());
        let mut truncated = Vec::new();
        ProtobufSerializer
            .write(&Document::new("cut short"), &mut truncated)
            .unwrap();
        truncated.truncate(truncated.len() - 3);

        for (properties, body) in [
            (r#"{"inputFormat":"serialized"}"#, huge_length),
            (r#"{"inputFormat":"serialized","inputSerializer":"protobuf"}"#, truncated),
            (r#"{"inputFormat":"serialized"}"#, vec![0xff, 0xff]),
        ] {
            let response = app
                .clone()
                .oneshot(annotate_request(properties, body))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{properties}");
            let message = String::from_utf8(body_bytes(response).await).unwrap();
            assert!(message.starts_with("failed to read document"), "{message}");
        }
        assert_eq!(engine.builds(), 0);
    }

    #[tokio::test]
    async fn xml_output_uses_xml_content_type() {
        let (app, _) = app(&CountingEngine::default());

        let response = app
            .oneshot(annotate_request(r#"{"outputFormat":"XML"}"#, "Hi."))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[http::header::CONTENT_TYPE], "text/xml");
        let body = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(body.starts_with("<?xml"));
    }
}
