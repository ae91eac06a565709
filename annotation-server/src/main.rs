use envconfig::Envconfig;
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use annotation_server::config::Config;
use annotation_server::server::serve;

async fn shutdown() {
    let mut term = signal::unix::signal(signal::unix::SignalKind::terminate())
        .expect("failed to register SIGTERM handler");

    let mut interrupt = signal::unix::signal(signal::unix::SignalKind::interrupt())
        .expect("failed to register SIGINT handler");

    tokio::select! {
        _ = term.recv() => {},
        _ = interrupt.recv() => {},
    };

    tracing::info!("Shutting down gracefully...");
}

#[tokio::main]
async fn main() {
    let mut config = Config::init_from_env().expect("Invalid configuration:");
    if let Some(port) = std::env::args().nth(1) {
        let port: u16 = port.parse().expect("port argument must be an integer");
        config = config.with_port(port);
    }

    // RUST_LOG wins over LOG_LEVEL when both are set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let log_layer = {
        let base_layer = fmt::layer().with_target(true).with_level(true);
        if config.json_logs {
            base_layer.json().with_filter(filter).boxed()
        } else {
            base_layer.with_filter(filter).boxed()
        }
    };
    tracing_subscriber::registry().with(log_layer).init();

    let listener = tokio::net::TcpListener::bind(config.address)
        .await
        .expect("could not bind port");
    serve(config, listener, shutdown())
        .await
        .expect("server failed");
}
