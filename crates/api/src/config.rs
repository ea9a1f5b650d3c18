//! Layered configuration: built-in defaults, optional file, environment

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Override file read when `TURNOVER_CONFIG` is unset
pub const DEFAULT_CONFIG_PATH: &str = "config/turnover.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub seed: SeedConfig,
}

impl Settings {
    /// Load from `path` (or `TURNOVER_CONFIG`, or [`DEFAULT_CONFIG_PATH`]),
    /// then `TURNOVER__SECTION__KEY` environment variables
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let path = path
            .map(str::to_string)
            .or_else(|| std::env::var("TURNOVER_CONFIG").ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            .add_source(config::File::with_name(&path).required(false))
            .add_source(
                config::Environment::with_prefix("TURNOVER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// `.json` linear pipeline or `.onnx` model
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection URL; wins over everything else. `memory` selects the
    /// in-process store.
    #[serde(default)]
    pub url: Option<String>,
    pub sqlite_path: String,
    /// Force the embedded database even when PostgreSQL is configured
    #[serde(default)]
    pub embedded_only: bool,
    #[serde(default)]
    pub postgres: PostgresConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostgresConfig {
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub name: Option<String>,
}

impl DatabaseConfig {
    /// Connection URL after applying the backend selection rule
    pub fn resolve_url(&self) -> String {
        if let Some(url) = self.url.as_deref().filter(|u| !u.is_empty()) {
            return url.to_string();
        }

        let pg = &self.postgres;
        match (&pg.user, pg.port) {
            (Some(user), Some(port)) if !self.embedded_only => format!(
                "postgresql://{}:{}@{}:{}/{}",
                user,
                pg.password.as_deref().unwrap_or(""),
                pg.host.as_deref().unwrap_or("localhost"),
                port,
                pg.name.as_deref().unwrap_or("postgres")
            ),
            _ => format!("sqlite://{}?mode=rwc", self.sqlite_path),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `trace`, `debug`, `info`, `warn` or `error`
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Directory holding `extrait_sirh.csv`, `extrait_eval.csv`, `extrait_sondage.csv`
    pub data_dir: PathBuf,
    /// Seed the source tables at startup
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database() -> DatabaseConfig {
        DatabaseConfig {
            url: None,
            sqlite_path: "app.db".to_string(),
            embedded_only: false,
            postgres: PostgresConfig::default(),
        }
    }

    #[test]
    fn test_defaults_load() {
        let settings = Settings::load(Some("does/not/exist.toml")).unwrap();
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.logging.level, "info");
        assert!(settings.seed.enabled);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("turnover.toml");
        std::fs::write(&path, "[server]\nport = 9100\n[logging]\njson = true\n").unwrap();

        let settings = Settings::load(path.to_str()).unwrap();
        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert!(settings.logging.json);
    }

    #[test]
    fn test_sqlite_when_postgres_incomplete() {
        let mut db = database();
        assert_eq!(db.resolve_url(), "sqlite://app.db?mode=rwc");

        db.postgres.user = Some("hr".to_string());
        assert!(db.resolve_url().starts_with("sqlite:"));
    }

    #[test]
    fn test_postgres_from_parts() {
        let mut db = database();
        db.postgres = PostgresConfig {
            user: Some("hr".to_string()),
            password: Some("secret".to_string()),
            host: Some("db".to_string()),
            port: Some(5432),
            name: Some("turnover".to_string()),
        };
        assert_eq!(db.resolve_url(), "postgresql://hr:secret@db:5432/turnover");

        db.embedded_only = true;
        assert!(db.resolve_url().starts_with("sqlite:"));
    }

    #[test]
    fn test_explicit_url_wins() {
        let mut db = database();
        db.embedded_only = true;
        db.url = Some("postgres://x@y/z".to_string());
        assert_eq!(db.resolve_url(), "postgres://x@y/z");
    }
}
