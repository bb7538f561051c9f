use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// How long an unconfirmed hold keeps its seats.
    #[serde(default = "default_hold_ttl")]
    pub hold_ttl_seconds: u64,
    /// Cadence of the background expiry sweep.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    /// Capacity of the in-process event fan-out channel.
    #[serde(default = "default_event_capacity")]
    pub event_channel_capacity: usize,
}

fn default_hold_ttl() -> u64 {
    600
}

fn default_sweep_interval() -> u64 {
    30
}

fn default_event_capacity() -> usize {
    256
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            hold_ttl_seconds: default_hold_ttl(),
            sweep_interval_seconds: default_sweep_interval(),
            event_channel_capacity: default_event_capacity(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file; optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `CINEBOOK__SERVER__PORT=8080` overrides server.port
            .add_source(config::Environment::with_prefix("CINEBOOK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
