use anyhow::Result;
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;
use std::net::SocketAddr;

use crate::forecast::{StepFailurePolicy, DEFAULT_WEATHER_WINDOW_HOURS};
use crate::ml::ModelType;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub model: ModelConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub enable_cors: bool,
}
impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

/// Historical dataset location
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig { pub csv_path: String }

/// Serialized model artifact
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub path: String,
    pub kind: ModelType,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastConfig {
    #[serde(default = "default_weather_window")]
    pub weather_window_hours: i64,
    #[serde(default)]
    pub on_step_failure: StepFailurePolicy,
    /// Upper bound on concurrently open sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    /// Sessions unused this long may be evicted to make room
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            weather_window_hours: DEFAULT_WEATHER_WINDOW_HOURS,
            on_step_failure: StepFailurePolicy::default(),
            max_sessions: default_max_sessions(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

fn default_request_timeout() -> u64 { 30 }
fn default_weather_window() -> i64 { DEFAULT_WEATHER_WINDOW_HOURS }
fn default_max_sessions() -> usize { 1024 }
fn default_session_idle_secs() -> u64 { 3600 }

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file("config/default.toml"))
                .merge(Env::prefixed("TRAFFIC__").split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        Ok(figment.extract()?)
    }
}
