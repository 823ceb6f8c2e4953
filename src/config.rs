//! Server configuration.

use std::path::PathBuf;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen host.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Deployment environment name, reported by the health endpoint.
    pub environment: String,
    /// SQLite database path.
    pub database_url: String,
    /// Maximum pooled database connections.
    pub pool_size: u32,
    /// Whether the CORS layer is installed.
    pub enable_cors: bool,
    /// The single origin allowed by CORS.
    pub cors_origin: String,
    /// Route serving GraphQL requests.
    pub graphql_path: String,
    /// Whether `GET {graphql_path}` serves the GraphQL Playground.
    pub enable_playground: bool,
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Seed file used instead of the built-in sample data.
    pub seed_json_path: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from the process environment (and `.env`, if loaded).
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let environment = lookup("APP_ENV").unwrap_or_else(|| "development".to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid port number, got `{}`", raw))?,
            None => 5000,
        };

        let pool_size = match lookup("DATABASE_POOL_SIZE") {
            Some(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("DATABASE_POOL_SIZE must be a positive integer, got `{}`", raw))?,
            None => 8,
        };

        let mut graphql_path = lookup("GRAPHQL_PATH").unwrap_or_else(|| "/graphql".to_string());
        if !graphql_path.starts_with('/') {
            graphql_path.insert(0, '/');
        }
        if graphql_path == "/" {
            anyhow::bail!("GRAPHQL_PATH cannot be `/`, it is reserved for the health check");
        }

        let enable_playground = lookup("ENABLE_GRAPHQL_PLAYGROUND")
            .map(|v| parse_flag(&v))
            .unwrap_or(environment != "production");

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| "edtech.db".to_string()),
            pool_size,
            enable_cors: lookup("ENABLE_CORS").map(|v| v != "false").unwrap_or(true),
            cors_origin: lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string()),
            graphql_path,
            enable_playground,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            seed_json_path: lookup("SEED_JSON_PATH").map(PathBuf::from),
            environment,
        })
    }

    /// Returns the server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}
