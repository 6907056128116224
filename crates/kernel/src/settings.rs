use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "BOOKSHELF_ENV";
const CONFIG_DIR_ENV: &str = "BOOKSHELF_CONFIG_DIR";
const ENV_PREFIX: &str = "BOOKSHELF";
/// Connection string override honoured by deployment scripts.
const DB_URL_ENV: &str = "DB_URL";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl Environment {
    fn parse(raw: &str) -> anyhow::Result<Self> {
        match raw {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(anyhow!(
                "unsupported environment '{}'; expected local/staging/production",
                other
            )),
        }
    }
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub books: BooksSettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, environment overlay,
    /// `BOOKSHELF_*` variables and finally `DB_URL`.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = std::env::var(CONFIG_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                std::env::current_dir()
                    .map(|cwd| cwd.join("config"))
                    .unwrap_or_else(|_| PathBuf::from("config"))
            });

        let builder =
            Self::file_sources(&config_dir, &environment).add_source(env_source(ENV_PREFIX));

        let mut settings = Self::from_builder(builder, &environment)?;

        if let Ok(url) = std::env::var(DB_URL_ENV) {
            if !url.is_empty() {
                settings.database.url = Some(url);
            }
        }

        Ok(settings)
    }

    fn file_sources(config_dir: &Path, environment: &str) -> ConfigBuilder<DefaultState> {
        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment));

        config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
    }

    fn from_builder(
        builder: ConfigBuilder<DefaultState>,
        environment: &str,
    ) -> anyhow::Result<Self> {
        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        // Override environment field with parsed enum variant.
        settings.environment = Environment::parse(environment)?;

        Ok(settings)
    }
}

/// `{PREFIX}_SECTION__KEY` variables, e.g. `BOOKSHELF_DATABASE__URL`.
fn env_source(prefix: &str) -> config::Environment {
    config::Environment::with_prefix(prefix)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    #[serde(default = "ServerSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Path every module router is nested under; empty mounts at the root.
    #[serde(default)]
    pub route_prefix: String,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: Self::default_request_timeout_ms(),
            route_prefix: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "DatabaseSettings::default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "DatabaseSettings::default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

impl DatabaseSettings {
    fn default_max_connections() -> u32 {
        5
    }

    fn default_acquire_timeout_ms() -> u64 {
        5000
    }

    /// Connection string for the store; its absence is fatal at startup.
    pub fn url(&self) -> anyhow::Result<&str> {
        self.url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| anyhow!("{} environment variable not set", DB_URL_ENV))
    }

    /// Connection string with any password replaced, safe for logs.
    pub fn redacted_url(&self) -> Option<String> {
        let url = self.url.as_deref()?;
        let Some((scheme, rest)) = url.split_once("://") else {
            return Some(url.to_string());
        };
        match rest.rsplit_once('@') {
            Some((userinfo, host)) => {
                let user = userinfo.split(':').next().unwrap_or_default();
                Some(format!("{scheme}://{user}:***@{host}"))
            }
            None => Some(url.to_string()),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: Self::default_max_connections(),
            acquire_timeout_ms: Self::default_acquire_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "TelemetrySettings::default_filter")]
    pub filter: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl TelemetrySettings {
    fn default_filter() -> String {
        "info,sqlx=warn".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            filter: Self::default_filter(),
            log_format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct BooksSettings {
    #[serde(default)]
    pub missing_fields: MissingFields,
}

/// How the create-book decoder treats absent payload fields.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MissingFields {
    /// Absent fields are a validation error.
    #[default]
    Reject,
    /// Absent fields take their zero value (`""` or `0`).
    Default,
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn from_toml(toml: &str, environment: &str) -> anyhow::Result<Settings> {
        let builder = config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml));
        Settings::from_builder(builder, environment)
    }

    #[test]
    fn default_environment_is_local() {
        let settings = Settings::default();
        assert_eq!(settings.environment, Environment::Local);
    }

    #[test]
    fn default_server_listens_on_8080_without_prefix() {
        let settings = Settings::default();
        assert_eq!(settings.server.bind_address(), "0.0.0.0:8080");
        assert!(settings.server.route_prefix.is_empty());
    }

    #[test]
    fn missing_database_url_is_reported() {
        let settings = Settings::default();
        let err = settings.database.url().unwrap_err();
        assert_eq!(err.to_string(), "DB_URL environment variable not set");
    }

    #[test]
    fn empty_database_url_counts_as_missing() {
        let database = DatabaseSettings {
            url: Some(String::new()),
            ..DatabaseSettings::default()
        };
        assert!(database.url().is_err());
    }

    #[test]
    fn layered_toml_overrides_defaults() {
        let settings = from_toml(
            r#"
            [server]
            port = 9090
            route_prefix = "/api"

            [database]
            url = "postgres://books:secret@db:5432/books"

            [telemetry]
            log_format = "json"

            [books]
            missing_fields = "default"
            "#,
            "staging",
        )
        .unwrap();

        assert_eq!(settings.environment, Environment::Staging);
        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.route_prefix, "/api");
        assert_eq!(
            settings.database.url().unwrap(),
            "postgres://books:secret@db:5432/books"
        );
        assert_eq!(settings.database.max_connections, 5);
        assert_eq!(settings.telemetry.log_format, LogFormat::Json);
        assert_eq!(settings.books.missing_fields, MissingFields::Default);
    }

    #[test]
    fn prefixed_env_vars_nest_with_double_underscore() {
        let mut vars = config::Map::new();
        vars.insert(
            "SHELFTEST_DATABASE__URL".to_string(),
            "postgres://env@db/books".to_string(),
        );
        vars.insert("SHELFTEST_SERVER__PORT".to_string(), "9191".to_string());
        vars.insert(
            "SHELFTEST_SERVER__REQUEST_TIMEOUT_MS".to_string(),
            "250".to_string(),
        );
        vars.insert(
            "SHELFTEST_BOOKS__MISSING_FIELDS".to_string(),
            "default".to_string(),
        );

        let builder = config::Config::builder()
            .add_source(File::from_str("[server]\nport = 8081\n", FileFormat::Toml))
            .add_source(env_source("SHELFTEST").source(Some(vars)));
        let settings = Settings::from_builder(builder, "local").unwrap();

        assert_eq!(settings.database.url().unwrap(), "postgres://env@db/books");
        assert_eq!(settings.server.port, 9191);
        assert_eq!(settings.server.request_timeout_ms, 250);
        assert_eq!(settings.books.missing_fields, MissingFields::Default);
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let err = from_toml("", "qa").unwrap_err();
        assert!(err.to_string().contains("unsupported environment 'qa'"));
    }

    #[test]
    fn redacted_url_hides_password() {
        let database = DatabaseSettings {
            url: Some("postgres://books:secret@db:5432/books".to_string()),
            ..DatabaseSettings::default()
        };
        assert_eq!(
            database.redacted_url().as_deref(),
            Some("postgres://books:***@db:5432/books")
        );
    }
}
