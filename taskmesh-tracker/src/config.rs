/// Configuration management for the task-tracking service
///
/// Loads configuration from environment variables into a type-safe struct.
///
/// # Environment Variables
///
/// - `TRACKER_HOST`: Host to bind to (default: 0.0.0.0)
/// - `TRACKER_PORT`: Port to bind to (default: 8081)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `REDIS_URL`: Redis connection string (required, read by the shared
///   redis client)
/// - `AUTH_BASE_URL`: Base URL of the authentication service (required,
///   e.g. http://localhost:8080)
/// - `AUTH_CHECK_TIMEOUT_SECS`: Remote token check timeout (default: 3)
/// - `CONSUMER_START_ID`: Stream position to resume from (default: "0",
///   i.e. replay the channel from the beginning)

use serde::{Deserialize, Serialize};
use std::env;

/// Complete service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Authentication service integration
    pub auth: AuthIntegrationConfig,

    /// Mirror consumer configuration
    pub consumer: ConsumerConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Authentication service integration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthIntegrationConfig {
    /// Base URL of the authentication service
    pub base_url: String,

    /// Request timeout in seconds for the remote token check
    ///
    /// The check is fail-fast: no retry, and any error denies.
    pub check_timeout_secs: u64,
}

/// Mirror consumer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumerConfig {
    /// Stream ID to resume consumption after
    pub start_id: String,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or malformed.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let host = env::var("TRACKER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("TRACKER_PORT")
            .unwrap_or_else(|_| "8081".to_string())
            .parse::<u16>()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let auth_base_url = env::var("AUTH_BASE_URL")
            .map_err(|_| anyhow::anyhow!("AUTH_BASE_URL environment variable is required"))?;

        let check_timeout_secs = env::var("AUTH_CHECK_TIMEOUT_SECS")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u64>()?;

        let start_id = env::var("CONSUMER_START_ID").unwrap_or_else(|_| "0".to_string());

        Ok(Self {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            auth: AuthIntegrationConfig {
                base_url: auth_base_url,
                check_timeout_secs,
            },
            consumer: ConsumerConfig { start_id },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8081,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
            },
            auth: AuthIntegrationConfig {
                base_url: "http://localhost:8080".to_string(),
                check_timeout_secs: 3,
            },
            consumer: ConsumerConfig {
                start_id: "0".to_string(),
            },
        };

        assert_eq!(config.bind_address(), "127.0.0.1:8081");
    }
}
