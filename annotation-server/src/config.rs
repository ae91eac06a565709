use std::net::SocketAddr;
use std::time::Duration;

use annotation_common::properties::{Properties, ANNOTATORS, INPUT_FORMAT, OUTPUT_FORMAT};
use envconfig::Envconfig;

#[derive(Envconfig, Clone, Debug)]
pub struct Config {
    #[envconfig(default = "0.0.0.0:9000")]
    pub address: SocketAddr,

    #[envconfig(default = "tokenize,ssplit,pos,lemma")]
    pub default_annotators: String,

    #[envconfig(default = "text")]
    pub default_input_format: String,

    #[envconfig(default = "json")]
    pub default_output_format: String,

    #[envconfig(default = "64")]
    pub pipeline_cache_max_entries: u64,

    // 0 disables idle expiry, entries then only leave on capacity pressure
    #[envconfig(default = "900")]
    pub pipeline_cache_idle_seconds: u64,

    #[envconfig(default = "10485760")]
    pub max_body_bytes: usize,

    #[envconfig(default = "false")]
    pub export_prometheus: bool,

    #[envconfig(default = "127.0.0.1:9001")]
    pub metrics_address: SocketAddr,

    #[envconfig(default = "info")]
    pub log_level: String,

    #[envconfig(default = "false")]
    pub json_logs: bool,
}

impl Config {
    /// Server-wide settings every request starts from.
    pub fn default_properties(&self) -> Properties {
        Properties::new()
            .with(ANNOTATORS, &self.default_annotators)
            .with(INPUT_FORMAT, &self.default_input_format)
            .with(OUTPUT_FORMAT, &self.default_output_format)
    }

    pub fn pipeline_cache_idle(&self) -> Option<Duration> {
        match self.pipeline_cache_idle_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.address.set_port(port);
        self
    }
}
