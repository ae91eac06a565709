pub const HTTP_REQUESTS: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION: &str = "http_requests_duration_seconds";

pub const PIPELINE_CACHE_HITS: &str = "annotation_pipeline_cache_hits_total";
pub const PIPELINE_CACHE_MISSES: &str = "annotation_pipeline_cache_misses_total";
pub const PIPELINE_BUILDS: &str = "annotation_pipeline_builds_total";
pub const PIPELINE_BUILD_ERRORS: &str = "annotation_pipeline_build_errors_total";
pub const PIPELINE_BUILD_TIME: &str = "annotation_pipeline_build_seconds";

pub const ANNOTATION_TIME: &str = "annotation_run_seconds";
// Labelled by `outcome`: ok, or the failure reason
pub const ANNOTATE_REQUESTS: &str = "annotation_requests_total";
