use std::env;
use std::fmt;

const DEFAULT_CORS_ORIGINS: &str =
    "http://localhost:5173,http://localhost:5500,http://127.0.0.1:5500";

/// Google OAuth client credentials.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

/// JWT secrets and lifetimes. Access and refresh tokens are signed with different keys.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_minutes: u64,
    pub refresh_ttl_hours: u64,
}

/// Application configuration, read once at startup and handed to whoever needs it.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    pub jwt: JwtConfig,
    pub google: GoogleConfig,
    pub frontend_url: String,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing required environment variable: {}", key),
            ConfigError::Invalid { key, value } => write!(f, "invalid value for {}: {:?}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));
        let optional = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            server_port: parse("SERVER_PORT", optional("SERVER_PORT", "8080"))?,
            server_host: optional("SERVER_HOST", "127.0.0.1"),
            jwt: JwtConfig {
                access_secret: required("JWT_ACCESS_SECRET")?,
                refresh_secret: required("JWT_REFRESH_SECRET")?,
                access_ttl_minutes: parse("JWT_ACCESS_TTL_MIN", optional("JWT_ACCESS_TTL_MIN", "15"))?,
                refresh_ttl_hours: parse("JWT_REFRESH_TTL_HR", optional("JWT_REFRESH_TTL_HR", "168"))?,
            },
            google: GoogleConfig {
                client_id: required("GOOGLE_CLIENT_ID")?,
                client_secret: required("GOOGLE_CLIENT_SECRET")?,
                redirect_url: required("GOOGLE_REDIRECT_URL")?,
            },
            frontend_url: optional("FRONTEND_URL", "http://localhost:5173")
                .trim_end_matches('/')
                .to_string(),
            cors_allowed_origins: optional("CORS_ALLOWED_ORIGINS", DEFAULT_CORS_ORIGINS)
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect(),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}
