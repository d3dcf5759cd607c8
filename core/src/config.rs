use config::{ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub source: SourceConfig,
    pub buffer: BufferConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    pub start_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BufferConfig {
    pub capacity: NonZeroUsize,
    pub flush_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
    pub metrics_enabled: bool,
    pub metrics_port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

impl SourceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl BufferConfig {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        // Load default configuration
        builder = builder.add_source(config::Config::try_from(&Config::default())?);

        // Layer on config file if it exists
        if Path::new("config.toml").exists() {
            builder = builder.add_source(File::with_name("config"));
        }

        // Layer on environment variables (FETCHER_ prefix)
        builder = builder.add_source(
            Environment::with_prefix("FETCHER")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Config = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.start_url.is_empty() {
            return Err(ConfigError::Message("source.start_url is required".into()));
        }

        if let Err(e) = reqwest::Url::parse(&self.source.start_url) {
            return Err(ConfigError::Message(format!(
                "source.start_url is not a valid URL: {e}"
            )));
        }

        if self.source.request_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "source.request_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.buffer.flush_interval_ms == 0 {
            return Err(ConfigError::Message(
                "buffer.flush_interval_ms must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

const DEFAULT_BUFFER_CAPACITY: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(capacity) => capacity,
    None => unreachable!(),
};

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig {
                start_url: "https://swapi.dev/api/people/?format=json".to_string(),
                request_timeout_secs: 10,
            },
            buffer: BufferConfig {
                capacity: DEFAULT_BUFFER_CAPACITY,
                flush_interval_ms: 250,
            },
            telemetry: TelemetryConfig {
                log_level: "info".to_string(),
                log_format: LogFormat::Pretty,
                metrics_enabled: false,
                metrics_port: 9090,
            },
        }
    }
}
