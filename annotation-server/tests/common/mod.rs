use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use annotation_server::config::Config;
use annotation_server::server::serve;

pub static DEFAULT_CONFIG: Lazy<Config> = Lazy::new(|| Config {
    address: SocketAddr::from_str("127.0.0.1:0").unwrap(),
    default_annotators: "tokenize,ssplit,pos,lemma".to_string(),
    default_input_format: "text".to_string(),
    default_output_format: "json".to_string(),
    pipeline_cache_max_entries: 16,
    pipeline_cache_idle_seconds: 0,
    max_body_bytes: 1024 * 1024,
    export_prometheus: false,
    metrics_address: SocketAddr::from_str("127.0.0.1:0").unwrap(),
    log_level: "info".to_string(),
    json_logs: false,
});

pub struct ServerHandle {
    pub addr: SocketAddr,
    shutdown: Arc<Notify>,
}

impl ServerHandle {
    pub async fn for_config(config: Config) -> ServerHandle {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let notify = Arc::new(Notify::new());
        let shutdown = notify.clone();

        tokio::spawn(async move {
            serve(config, listener, async move { notify.notified().await })
                .await
                .expect("server failed")
        });
        ServerHandle { addr, shutdown }
    }

    pub async fn annotate<T: Into<reqwest::Body>>(
        &self,
        properties: Option<&str>,
        body: T,
    ) -> reqwest::Response {
        let mut url = format!("http://{:?}/", self.addr);
        if let Some(properties) = properties {
            url.push_str("?properties=");
            url.push_str(&urlencoding::encode(properties));
        }
        reqwest::Client::new()
            .post(url)
            .body(body)
            .send()
            .await
            .expect("failed to send request")
    }

    pub async fn ping(&self) -> reqwest::Response {
        reqwest::get(format!("http://{:?}/ping", self.addr))
            .await
            .expect("failed to send request")
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.shutdown.notify_one()
    }
}
