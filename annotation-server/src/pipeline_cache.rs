use std::sync::Arc;
use std::time::{Duration, Instant};

use annotation_common::engine::{AnnotationEngine, AnnotationError, Pipeline};
use annotation_common::properties::Properties;
use moka::future::Cache;
use tracing::{info, instrument, warn};

use crate::metrics_consts::{
    PIPELINE_BUILDS, PIPELINE_BUILD_ERRORS, PIPELINE_BUILD_TIME, PIPELINE_CACHE_HITS,
    PIPELINE_CACHE_MISSES,
};

/// Built pipelines keyed by the full configuration that produced them.
///
/// Entries can disappear at any time (capacity pressure or idle expiry), so
/// every lookup goes through [`PipelineCache::get_or_build`], which rebuilds
/// on a miss. Concurrent misses for equal configurations share one build.
/// Failed builds are handed to every waiting caller and are never stored.
#[derive(Clone)]
pub struct PipelineCache {
    engine: Arc<dyn AnnotationEngine>,
    pipelines: Cache<Properties, Arc<dyn Pipeline>>,
}

impl PipelineCache {
    pub fn new(
        engine: Arc<dyn AnnotationEngine>,
        max_entries: u64,
        idle_expiry: Option<Duration>,
    ) -> Self {
        let mut builder = Cache::builder().max_capacity(max_entries);
        if let Some(idle) = idle_expiry {
            builder = builder.time_to_idle(idle);
        }

        Self {
            engine,
            pipelines: builder.build(),
        }
    }

    /// The cached pipeline for `properties`, if it is still around.
    pub async fn get(&self, properties: &Properties) -> Option<Arc<dyn Pipeline>> {
        self.pipelines.get(properties).await
    }

    #[instrument(skip_all)]
    pub async fn get_or_build(
        &self,
        properties: &Properties,
    ) -> Result<Arc<dyn Pipeline>, AnnotationError> {
        if let Some(pipeline) = self.pipelines.get(properties).await {
            metrics::counter!(PIPELINE_CACHE_HITS).increment(1);
            return Ok(pipeline);
        }
        metrics::counter!(PIPELINE_CACHE_MISSES).increment(1);

        let engine = self.engine.clone();
        let key = properties.clone();
        self.pipelines
            .try_get_with(properties.clone(), async move {
                metrics::counter!(PIPELINE_BUILDS).increment(1);
                let start = Instant::now();

                let built = tokio::task::spawn_blocking(move || engine.build(&key))
                    .await
                    .map_err(|e| AnnotationError::Internal(format!("pipeline build aborted: {e}")))
                    .and_then(|result| result);

                match &built {
                    Ok(pipeline) => {
                        let elapsed = start.elapsed();
                        metrics::histogram!(PIPELINE_BUILD_TIME).record(elapsed.as_secs_f64());
                        info!(
                            annotators = pipeline.annotators().join(","),
                            elapsed_ms = elapsed.as_millis() as u64,
                            "built pipeline"
                        );
                    }
                    Err(e) => {
                        metrics::counter!(PIPELINE_BUILD_ERRORS).increment(1);
                        warn!("failed to build pipeline: {}", e);
                    }
                }
                built
            })
            .await
            .map_err(|e: Arc<AnnotationError>| (*e).clone())
    }

    /// Number of pipelines currently held. Approximate until
    /// [`PipelineCache::run_pending_tasks`] has run.
    pub fn entry_count(&self) -> u64 {
        self.pipelines.entry_count()
    }

    pub async fn run_pending_tasks(&self) {
        self.pipelines.run_pending_tasks().await;
    }
}
