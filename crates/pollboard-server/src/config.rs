use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://pollboard.db".to_string(),
            max_connections: 5,
        }
    }
}

impl Config {
    /// A missing config file is not an error: the defaults boot a local
    /// instance with a SQLite file in the working directory.
    pub fn load(path: &str) -> Result<Self> {
        if !std::path::Path::new(path).exists() {
            tracing::info!("config file {path} not found, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {path}"))?;
        let config =
            toml::from_str(&raw).with_context(|| format!("parsing config file {path}"))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn defaults_when_file_missing() {
        let config = Config::load("does-not-exist.toml").expect("defaults");
        assert_eq!(config.server.bind_address, "127.0.0.1:8000");
        assert_eq!(config.database.url, "sqlite://pollboard.db");
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn parses_partial_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pollboard.toml");
        std::fs::write(&path, "[server]\nbind_address = \"0.0.0.0:9000\"\n").expect("write");

        let config = Config::load(path.to_str().expect("utf8 path")).expect("config");
        assert_eq!(config.server.bind_address, "0.0.0.0:9000");
        // Unspecified sections fall back to defaults.
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn rejects_malformed_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pollboard.toml");
        std::fs::write(&path, "[server\nbind_address = 12").expect("write");

        assert!(Config::load(path.to_str().expect("utf8 path")).is_err());
    }
}
