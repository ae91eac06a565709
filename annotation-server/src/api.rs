use annotation_common::engine::AnnotationError;
use annotation_common::serialization::{SerializationError, SerializerRegistry};
use axum::http::{header::CONTENT_TYPE, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::metrics_consts::ANNOTATE_REQUESTS;

#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    #[error("unsupported input format: {0}")]
    UnsupportedInputFormat(String),
    #[error("unknown output format: {0}")]
    UnknownOutputFormat(String),
    #[error("unknown serializer: {0}")]
    UnknownSerializer(String),
    #[error("failed to read document: {0}")]
    Deserialization(String),

    #[error("annotation failed: {0}")]
    Annotation(#[from] AnnotationError),
    #[error("failed to serialize document: {0}")]
    Serialization(#[from] SerializationError),
}

impl AnnotateError {
    pub fn unknown_serializer(name: &str, serializers: &SerializerRegistry) -> Self {
        AnnotateError::UnknownSerializer(format!(
            "{} (registered: {})",
            name,
            serializers.names().join(", ")
        ))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AnnotateError::MalformedRequest(_)
            | AnnotateError::UnsupportedInputFormat(_)
            | AnnotateError::UnknownOutputFormat(_)
            | AnnotateError::UnknownSerializer(_)
            | AnnotateError::Deserialization(_) => StatusCode::BAD_REQUEST,

            AnnotateError::Annotation(_) | AnnotateError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            AnnotateError::MalformedRequest(_) => "malformed_request",
            AnnotateError::UnsupportedInputFormat(_) => "unsupported_input_format",
            AnnotateError::UnknownOutputFormat(_) => "unknown_output_format",
            AnnotateError::UnknownSerializer(_) => "unknown_serializer",
            AnnotateError::Deserialization(_) => "deserialization",
            AnnotateError::Annotation(_) => "annotation",
            AnnotateError::Serialization(_) => "serialization",
        }
    }

    /// The message collapsed onto one line, as sent back to the client.
    pub fn message(&self) -> String {
        self.to_string()
            .split(['\r', '\n'])
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl IntoResponse for AnnotateError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        if status.is_server_error() {
            error!(reason = self.reason(), "annotation request failed: {}", message);
        } else {
            warn!(reason = self.reason(), "rejected annotation request: {}", message);
        }
        metrics::counter!(ANNOTATE_REQUESTS, "outcome" => self.reason()).increment(1);

        (status, [(CONTENT_TYPE, "text/plain")], message).into_response()
    }
}
