use std::time::Instant;

use annotation_common::engine::AnnotationError;
use axum::body::{Body, Bytes};
use axum::extract::{RawQuery, State};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use tracing::{debug, instrument};

use crate::api::AnnotateError;
use crate::metrics_consts::{ANNOTATE_REQUESTS, ANNOTATION_TIME};
use crate::negotiate::negotiate;
use crate::router;
use crate::{loader, resolver};

/// Resolves the request's configuration, loads its document, annotates it
/// with a cached pipeline and writes it back in the requested format.
///
/// Everything that can be rejected for being malformed is checked before a
/// pipeline is looked up or built.
#[instrument(skip_all, fields(body_len = body.len()))]
pub async fn annotate(
    State(state): State<router::State>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Response, AnnotateError> {
    let properties = resolver::resolve(&state.defaults, query.as_deref())?;
    let mut document = loader::load(&properties, &state.serializers, &body)?;
    let negotiated = negotiate(&properties, &state.serializers)?;
    debug!(
        properties = ?properties.iter().collect::<Vec<_>>(),
        format = ?negotiated.format,
        "negotiated output"
    );

    let pipeline = state.pipelines.get_or_build(&properties).await?;

    let start = Instant::now();
    let document = tokio::task::spawn_blocking(move || {
        pipeline.annotate(&mut document).map(|()| document)
    })
    .await
    .map_err(|e| AnnotationError::Internal(format!("annotation aborted: {e}")))??;
    metrics::histogram!(ANNOTATION_TIME).record(start.elapsed().as_secs_f64());

    let mut out = Vec::new();
    negotiated.outputter.print(&document, &mut out)?;

    metrics::counter!(ANNOTATE_REQUESTS, "outcome" => "ok").increment(1);

    let length = out.len();
    let mut response = Response::new(Body::from(out));
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(negotiated.content_type));
    headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
    Ok(response)
}

pub async fn ping() -> impl IntoResponse {
    ([(CONTENT_TYPE, "text/plain")], "pong\n")
}
