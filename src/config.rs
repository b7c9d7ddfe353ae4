use std::path::PathBuf;

use serde::Deserialize;

/// Keys that must carry a non-empty value before the server may start.
pub const REQUIRED_VARS: [&str; 5] = ["JWT_SECRET", "DB_HOST", "DB_USER", "DB_PASSWORD", "DB_NAME"];

/// Production frontend (Netlify).
pub const PRODUCTION_ORIGIN: &str = "https://tiendacl.netlify.app";
/// Local frontend dev server.
pub const LOCAL_ORIGIN: &str = "http://localhost:3000";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_UPLOADS_DIR: &str = "uploads";
pub const DEFAULT_JWT_EXPIRES_HOURS: i64 = 24;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required configuration: {}", .0.join(", "))]
    MissingVars(Vec<&'static str>),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("failed to read configuration: {0}")]
    Source(#[from] ::config::ConfigError),
}

/// Flat view of every recognised key, as read from defaults, files and the
/// environment. All values stay strings so that empty values can be treated
/// as unset and numeric parse failures can name their key.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSettings {
    pub jwt_secret: Option<String>,
    pub db_host: Option<String>,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    pub db_name: Option<String>,
    pub db_port: Option<String>,
    pub db_max_connections: Option<String>,
    pub frontend_url: Option<String>,
    pub host: Option<String>,
    pub port: Option<String>,
    pub node_env: Option<String>,
    pub uploads_dir: Option<String>,
    pub jwt_expires_hours: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    /// Ordered, exact-match list of accepted `Origin` values.
    pub allowed_origins: Vec<String>,
    pub uploads_dir: PathBuf,
    /// Value of NODE_ENV, kept under its historical name for the frontend.
    pub environment: String,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Validates raw settings. Every missing required key is reported at once.
    pub fn from_settings(raw: RawSettings) -> Result<Self, ConfigError> {
        let values = [raw.jwt_secret, raw.db_host, raw.db_user, raw.db_password, raw.db_name].map(non_empty);
        let missing: Vec<&'static str> =
            REQUIRED_VARS.iter().zip(values.iter()).filter(|(_, v)| v.is_none()).map(|(k, _)| *k).collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingVars(missing));
        }
        let [jwt_secret, db_host, db_user, db_password, db_name] = values.map(Option::unwrap_or_default);

        let port = parse_or("PORT", raw.port, DEFAULT_PORT)?;
        if port == 0 {
            return Err(ConfigError::Invalid { key: "PORT", value: "0".into() });
        }
        #[cfg(unix)]
        if port < 1024 {
            tracing::warn!("Usando el puerto privilegiado {}; puede requerir permisos elevados", port);
        }
        let db_port = parse_or("DB_PORT", raw.db_port, DEFAULT_DB_PORT)?;
        let max_connections = parse_or("DB_MAX_CONNECTIONS", raw.db_max_connections, DEFAULT_DB_MAX_CONNECTIONS)?;
        if max_connections == 0 {
            return Err(ConfigError::Invalid { key: "DB_MAX_CONNECTIONS", value: "0".into() });
        }
        let token_ttl_hours = parse_or("JWT_EXPIRES_HOURS", raw.jwt_expires_hours, DEFAULT_JWT_EXPIRES_HOURS)?;
        if token_ttl_hours <= 0 {
            return Err(ConfigError::Invalid { key: "JWT_EXPIRES_HOURS", value: token_ttl_hours.to_string() });
        }

        Ok(Self {
            server: ServerConfig {
                host: non_empty(raw.host).unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port,
            },
            database: DatabaseConfig {
                host: db_host,
                port: db_port,
                user: db_user,
                password: db_password,
                name: db_name,
                max_connections,
            },
            auth: AuthConfig { jwt_secret, token_ttl_hours },
            allowed_origins: allowed_origins(non_empty(raw.frontend_url)),
            uploads_dir: PathBuf::from(non_empty(raw.uploads_dir).unwrap_or_else(|| DEFAULT_UPLOADS_DIR.to_string())),
            environment: non_empty(raw.node_env).unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
        })
    }
}

/// Production origin, the configured frontend (if any), then local dev.
pub fn allowed_origins(frontend_url: Option<String>) -> Vec<String> {
    let mut origins = vec![PRODUCTION_ORIGIN.to_string()];
    origins.extend(frontend_url);
    origins.push(LOCAL_ORIGIN.to_string());
    origins
}

pub fn load() -> Result<AppConfig, ConfigError> {
    // Load .env first (optional)
    let _ = dotenvy::dotenv();

    let defaults: &str = include_str!("../config/default.toml");
    let mut builder = ::config::Config::builder()
        .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml))
        // Optional local file: tiendacl.toml (in CWD)
        .add_source(::config::File::with_name("tiendacl").required(false));

    if let Ok(custom_path) = std::env::var("TIENDACL_CONFIG") {
        builder = builder.add_source(::config::File::with_name(&custom_path).required(false));
    }
    // Unprefixed so DB_HOST, PORT, NODE_ENV etc. keep their usual names
    builder = builder.add_source(::config::Environment::default().try_parsing(false));

    let raw: RawSettings = builder.build()?.try_deserialize()?;
    AppConfig::from_settings(raw)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_or<T: std::str::FromStr>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match non_empty(value) {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid { key, value: v }),
        None => Ok(default),
    }
}
