pub mod api;
pub mod config;
pub mod handlers;
pub mod loader;
pub mod metrics_consts;
pub mod negotiate;
pub mod pipeline_cache;
pub mod prometheus;
pub mod resolver;
pub mod router;
pub mod server;
