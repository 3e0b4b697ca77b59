/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: *)
/// - `JWT_SECRET`: Secret key for JWT signing (required, at least 32 characters)
/// - `JWT_EXPIRATION_MINUTES`: Access token lifetime (default: 30, at most one year)
/// - `GROQ_API_KEY`: Groq API key; story generation answers 503 without it
/// - `GROQ_MODEL`: Groq model (default: llama-3.3-70b-versatile)
/// - `GROQ_TIMEOUT_SECONDS`: Groq request timeout (default: 30)
/// - `RUST_LOG`: Log filter (default: taskhub_api=debug,tower_http=debug)
///
/// # Example
///
/// ```no_run
/// use taskhub_api::config::Config;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}:{}", config.api.host, config.api.port);
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use taskhub_shared::auth::jwt::DEFAULT_EXPIRATION_MINUTES;
use taskhub_shared::storygen::groq::{self, GroqConfig};

/// Longest accepted access token lifetime (one year)
pub const MAX_EXPIRATION_MINUTES: i64 = 60 * 24 * 365;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Text generation provider configuration
    pub groq: GroqSettings,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Must be at least 32 characters. Generate with: `openssl rand -hex 32`
    #[serde(skip_serializing)]
    pub secret: String,

    /// Access token lifetime in minutes
    pub expiration_minutes: i64,
}

/// Groq configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroqSettings {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    pub model: String,

    pub timeout_seconds: u64,
}

impl GroqSettings {
    pub fn to_client_config(&self) -> GroqConfig {
        GroqConfig {
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            base_url: groq::DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(self.timeout_seconds),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// A `.env` file in the working directory is read first if present.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_host = var_or("API_HOST", "0.0.0.0");
        let api_port = var_or("API_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is invalid: {}", e))?;

        let cors_origins = var_or("CORS_ORIGINS", "*")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = var_or("DATABASE_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS is invalid: {}", e))?;

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let expiration_minutes = var_or("JWT_EXPIRATION_MINUTES", &DEFAULT_EXPIRATION_MINUTES.to_string())
            .parse::<i64>()
            .map_err(|e| anyhow::anyhow!("JWT_EXPIRATION_MINUTES is invalid: {}", e))?;

        if expiration_minutes <= 0 {
            anyhow::bail!("JWT_EXPIRATION_MINUTES must be positive");
        }

        if expiration_minutes > MAX_EXPIRATION_MINUTES {
            anyhow::bail!(
                "JWT_EXPIRATION_MINUTES must be at most {}",
                MAX_EXPIRATION_MINUTES
            );
        }

        let groq_api_key = lookup("GROQ_API_KEY").filter(|key| !key.trim().is_empty());
        let groq_model = var_or("GROQ_MODEL", groq::DEFAULT_MODEL);
        let groq_timeout = var_or("GROQ_TIMEOUT_SECONDS", &groq::DEFAULT_TIMEOUT_SECONDS.to_string())
            .parse::<u64>()
            .map_err(|e| anyhow::anyhow!("GROQ_TIMEOUT_SECONDS is invalid: {}", e))?;

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                expiration_minutes,
            },
            groq: GroqSettings {
                api_key: groq_api_key,
                model: groq_model,
                timeout_seconds: groq_timeout,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether any origin may call the API
    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}
