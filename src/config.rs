use crate::billing::config::AwsConfig;
use crate::cache::CacheConfig;
use crate::metrics::MetricsConfig;
use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub aws: AwsConfig,
    pub cache: CacheConfig,
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8787,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origin: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origin: "http://localhost:5173".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub log_request: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_request: false,
        }
    }
}

/// Plain environment variables honoured on top of `DASHBOARD_*`
const PLAIN_ENV_OVERRIDES: [(&str, &str); 3] = [
    ("PORT", "server.port"),
    ("CORS_ORIGIN", "cors.allowed_origin"),
    ("AWS_REGION", "aws.region"),
];

impl Config {
    /// Load from `config.yaml` in the working directory when present
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("config.yaml")
    }

    /// Defaults, then the file at `path` when it exists, then environment
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |name| std::env::var(name).ok())
    }

    fn load_with_env<P, F>(path: P, env: F) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let mut builder =
            ConfigBuilder::builder().add_source(ConfigBuilder::try_from(&Config::default())?);

        if path.as_ref().exists() {
            builder = builder.add_source(File::from(path.as_ref()));
        }

        builder = builder.add_source(
            Environment::with_prefix("DASHBOARD")
                .prefix_separator("_")
                .separator("__"),
        );

        for (variable, key) in PLAIN_ENV_OVERRIDES {
            builder = builder.set_override_option(key, env(variable).filter(|v| !v.is_empty()))?;
        }

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8787);
        assert_eq!(config.cors.allowed_origin, "http://localhost:5173");
        assert_eq!(config.aws.region, "us-east-1");
        assert_eq!(config.cache.ttl_seconds, 60);
        assert!(config.cache.enabled);
        assert!(!config.metrics.enabled);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_load_from_yaml_file() {
        let yaml_content = r#"
server:
  host: "127.0.0.1"
  port: 4000
cors:
  allowed_origin: "https://dashboard.example.com"
aws:
  region: "eu-west-1"
  profile: "billing"
cache:
  ttl_seconds: 120
logging:
  level: "warn"
"#;

        let mut temp_file = NamedTempFile::with_suffix(".yaml").unwrap();
        temp_file.write_all(yaml_content.as_bytes()).unwrap();

        let config = Config::load_with_env(temp_file.path(), no_env).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.cors.allowed_origin, "https://dashboard.example.com");
        assert_eq!(config.aws.region, "eu-west-1");
        assert_eq!(config.aws.profile.as_deref(), Some("billing"));
        assert_eq!(config.cache.ttl_seconds, 120);
        assert_eq!(config.cache.max_entries, 1000);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_plain_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("PORT", "9999"),
            ("CORS_ORIGIN", "http://localhost:3000"),
            ("AWS_REGION", ""),
        ]);

        let config = Config::load_with_env("nonexistent.yaml", |name| {
            env.get(name).map(|v| v.to_string())
        })
        .unwrap();

        assert_eq!(config.server.port, 9999);
        assert_eq!(config.cors.allowed_origin, "http://localhost:3000");
        // Empty values are ignored
        assert_eq!(config.aws.region, "us-east-1");
    }

    #[test]
    fn test_config_load_nonexistent_file() {
        let config = Config::load_with_env("nonexistent.yaml", no_env).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8787);
    }
}
