use std::future::{ready, Future};
use std::io;
use std::sync::Arc;

use annotation_common::rules::RuleBasedEngine;
use annotation_common::serialization::SerializerRegistry;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::pipeline_cache::PipelineCache;
use crate::prometheus::setup_metrics_recorder;
use crate::router::{self, State};

pub async fn serve<F>(config: Config, listener: TcpListener, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if config.export_prometheus {
        spawn_metrics_server(&config).await?;
    }

    let state = State {
        defaults: Arc::new(config.default_properties()),
        pipelines: PipelineCache::new(
            Arc::new(RuleBasedEngine),
            config.pipeline_cache_max_entries,
            config.pipeline_cache_idle(),
        ),
        serializers: Arc::new(SerializerRegistry::with_builtins()),
    };
    let app = router::router(state, config.max_body_bytes);

    tracing::info!("listening on {:?}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

// Prometheus gets its own listener so the public surface stays at `/` and `/ping`.
async fn spawn_metrics_server(config: &Config) -> io::Result<()> {
    let recorder = setup_metrics_recorder().map_err(io::Error::other)?;
    let metrics_router = Router::new().route("/metrics", get(move || ready(recorder.render())));
    let listener = TcpListener::bind(config.metrics_address).await?;

    tracing::info!("serving metrics on {:?}", listener.local_addr()?);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, metrics_router).await {
            tracing::error!("metrics server failed: {}", e);
        }
    });
    Ok(())
}
