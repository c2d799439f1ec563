//! Application configuration loaded from environment variables.
//!
//! # Configuration Hierarchy
//!
//! All configuration is loaded from environment variables with sensible
//! defaults for development. In production, configure via environment
//! variables or a `.env` file.
//!
//! # Security Configuration
//!
//! - `SIGNING_SECRET`: Externally supplied HMAC secret. Required when running
//!   more than one instance behind a load balancer; the file fallback is
//!   per-instance.
//! - `ADMIN_USER` / `ADMIN_PASSWORD`: Login credentials. Login returns 403
//!   until both are configured.
//! - `APP_ENV=production`: Marks cookies `Secure`.
//!
//! # Token Lifetimes
//!
//! - `SESSION_TTL_SECS`: Session token lifetime (default: 86400, one day)
//! - `REQUEST_TOKEN_TTL_SECS`: Action token lifetime (default: 300)

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Application configuration loaded from environment variables.
///
/// # Example
///
/// ```rust,ignore
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.server_addr());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Server host address (default: "0.0.0.0")
    pub host: String,

    /// Server port (default: 3000)
    pub port: u16,

    // =========================================================================
    // Signing Secret Configuration
    // =========================================================================
    /// Externally supplied signing secret (optional).
    ///
    /// When absent, a secret is read from `secret_file`, or generated and
    /// persisted there on first start.
    pub signing_secret: Option<String>,

    /// Path of the locally persisted signing secret (default: ".signing-secret")
    pub secret_file: PathBuf,

    // =========================================================================
    // Token Lifetimes
    // =========================================================================
    /// How long a session token stays valid after issuance (default: 1 day)
    pub session_ttl: Duration,

    /// How long an action (request) token stays valid (default: 5 minutes)
    pub request_token_ttl: Duration,

    // =========================================================================
    // Authentication Surface
    // =========================================================================
    /// Admin login username (login is disabled until both are set)
    pub admin_user: Option<String>,

    /// Admin login password
    pub admin_password: Option<String>,

    /// Exact paths reachable without a session.
    /// Default: "/api/health,/api/login,/api/logout,/login"
    pub public_paths: Vec<String>,

    /// Paths exempt from the CSRF double-submit check (default: empty).
    /// Security note: only add endpoints with their own integrity protection.
    pub csrf_exempt_paths: Vec<String>,

    /// Where unauthenticated browser requests are redirected (default: "/login")
    pub login_path: String,

    /// Maximum login failures per IP per minute before 429 (default: 10)
    pub login_failure_limit: u32,

    /// Burst capacity for the login failure limiter (default: 5)
    pub login_failure_burst: u32,

    // =========================================================================
    // Request Limits
    // =========================================================================
    /// Maximum request body size in bytes (default: 10MB)
    pub max_request_body_size: usize,

    /// Maximum characters accepted by the rewrite endpoint (default: 100_000)
    pub max_text_length: usize,

    // =========================================================================
    // Environment
    // =========================================================================
    /// True when APP_ENV=production; cookies are marked `Secure`.
    pub production: bool,

    /// Comma-separated list of allowed CORS origins
    /// Use "*" to allow all origins (not recommended for production)
    pub cors_allowed_origins: Vec<String>,

    // =========================================================================
    // Observability Configuration
    // =========================================================================
    /// Log level (e.g., "info", "debug", "trace")
    pub log_level: String,

    /// Port for Prometheus metrics endpoint (default: 9090, 0 = disabled)
    pub metrics_port: u16,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if any configuration value is invalid
    /// (e.g., non-numeric PORT, zero token lifetime).
    pub fn from_env() -> AppResult<Self> {
        // Load an .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let config = Self {
            // Server
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: Self::parse_env("PORT", 3000)?,

            // Signing secret
            signing_secret: env::var("SIGNING_SECRET").ok().filter(|s| !s.is_empty()),
            secret_file: env::var("SECRET_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".signing-secret")),

            // Token lifetimes
            session_ttl: Duration::from_secs(Self::parse_env("SESSION_TTL_SECS", 86_400)?),
            request_token_ttl: Duration::from_secs(Self::parse_env(
                "REQUEST_TOKEN_TTL_SECS",
                300,
            )?),

            // Authentication surface
            admin_user: env::var("ADMIN_USER").ok().filter(|s| !s.is_empty()),
            admin_password: env::var("ADMIN_PASSWORD").ok().filter(|s| !s.is_empty()),
            public_paths: Self::parse_path_list(
                "PUBLIC_PATHS",
                "/api/health,/api/login,/api/logout,/login",
            ),
            csrf_exempt_paths: Self::parse_path_list("CSRF_EXEMPT_PATHS", ""),
            login_path: env::var("LOGIN_PATH").unwrap_or_else(|_| "/login".to_string()),
            login_failure_limit: Self::parse_env("LOGIN_FAILURE_LIMIT", 10)?,
            login_failure_burst: Self::parse_env("LOGIN_FAILURE_BURST", 5)?,

            // Request limits
            max_request_body_size: Self::parse_env("MAX_REQUEST_BODY_SIZE", 10 * 1024 * 1024)?,
            max_text_length: Self::parse_env("MAX_TEXT_LENGTH", 100_000)?,

            // Environment
            production: env::var("APP_ENV")
                .map(|v| v.eq_ignore_ascii_case("production"))
                .unwrap_or(false),
            cors_allowed_origins: Self::parse_cors_origins(),

            // Observability
            log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            metrics_port: Self::parse_env("METRICS_PORT", 9090)?,
        };

        // Validate configuration before returning
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values for consistency and correctness.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if validation fails.
    fn validate(&self) -> AppResult<()> {
        if self.session_ttl.is_zero() {
            return Err(AppError::Config(
                "SESSION_TTL_SECS must be greater than 0".to_string(),
            ));
        }

        if self.request_token_ttl.is_zero() {
            return Err(AppError::Config(
                "REQUEST_TOKEN_TTL_SECS must be greater than 0".to_string(),
            ));
        }

        // A request token that outlives the session defeats its purpose
        if self.request_token_ttl > self.session_ttl {
            return Err(AppError::Config(format!(
                "REQUEST_TOKEN_TTL_SECS ({:?}) must be <= SESSION_TTL_SECS ({:?})",
                self.request_token_ttl, self.session_ttl
            )));
        }

        if self.max_request_body_size == 0 {
            return Err(AppError::Config(
                "MAX_REQUEST_BODY_SIZE must be greater than 0".to_string(),
            ));
        }

        if self.max_text_length == 0 {
            return Err(AppError::Config(
                "MAX_TEXT_LENGTH must be greater than 0".to_string(),
            ));
        }

        if self.login_failure_limit == 0 {
            return Err(AppError::Config(
                "LOGIN_FAILURE_LIMIT must be greater than 0".to_string(),
            ));
        }

        if !self.login_path.starts_with('/') {
            return Err(AppError::Config(
                "LOGIN_PATH must start with '/'".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the full server address for binding.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if admin login credentials are configured.
    pub fn login_enabled(&self) -> bool {
        self.admin_user.is_some() && self.admin_password.is_some()
    }

    /// Check if Prometheus metrics export is enabled.
    pub fn metrics_enabled(&self) -> bool {
        self.metrics_port > 0
    }

    /// Get the metrics endpoint address.
    ///
    /// Returns `None` if metrics are disabled (port = 0).
    pub fn metrics_addr(&self) -> Option<std::net::SocketAddr> {
        if self.metrics_enabled() {
            Some(std::net::SocketAddr::from((
                [0, 0, 0, 0],
                self.metrics_port,
            )))
        } else {
            None
        }
    }

    /// Parse an environment variable into the specified type with a default value.
    fn parse_env<T>(name: &str, default: T) -> AppResult<T>
    where
        T: std::str::FromStr + ToString,
        T::Err: std::fmt::Display,
    {
        match env::var(name) {
            Ok(val) => val
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid {name}: {e}"))),
            Err(_) => Ok(default),
        }
    }

    /// Parse a comma-separated path list from an environment variable.
    ///
    /// Entries not starting with '/' are dropped rather than silently matched
    /// against nothing.
    fn parse_path_list(name: &str, default: &str) -> Vec<String> {
        env::var(name)
            .unwrap_or_else(|_| default.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && s.starts_with('/'))
            .collect()
    }

    /// Parse CORS allowed origins from environment variable.
    fn parse_cors_origins() -> Vec<String> {
        env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Default configuration for testing and development.
///
/// Production deployments should use `Config::from_env()` instead.
impl Default for Config {
    fn default() -> Self {
        Self {
            // Server
            host: "0.0.0.0".to_string(),
            port: 3000,
            // Signing secret
            signing_secret: None,
            secret_file: PathBuf::from(".signing-secret"),
            // Token lifetimes
            session_ttl: Duration::from_secs(86_400),
            request_token_ttl: Duration::from_secs(300),
            // Authentication surface
            admin_user: None,
            admin_password: None,
            public_paths: vec![
                "/api/health".to_string(),
                "/api/login".to_string(),
                "/api/logout".to_string(),
                "/login".to_string(),
            ],
            csrf_exempt_paths: vec![],
            login_path: "/login".to_string(),
            login_failure_limit: 10,
            login_failure_burst: 5,
            // Request limits
            max_request_body_size: 10 * 1024 * 1024, // 10MB
            max_text_length: 100_000,
            // Environment
            production: false,
            cors_allowed_origins: vec!["*".to_string()],
            // Observability
            log_level: "info".to_string(),
            metrics_port: 9090,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.session_ttl, Duration::from_secs(86_400));
        assert_eq!(config.request_token_ttl, Duration::from_secs(300));
        assert!(config.signing_secret.is_none());
        assert!(!config.login_enabled());
        assert!(!config.production);
    }

    #[test]
    fn test_server_addr_format() {
        let config = Config {
            host: "localhost".to_string(),
            port: 3000,
            ..Config::default()
        };

        assert_eq!(config.server_addr(), "localhost:3000");
    }

    #[test]
    fn test_login_enabled_requires_both_credentials() {
        let config = Config {
            admin_user: Some("admin".to_string()),
            ..Config::default()
        };
        assert!(!config.login_enabled());

        let config = Config {
            admin_user: Some("admin".to_string()),
            admin_password: Some("hunter2".to_string()),
            ..Config::default()
        };
        assert!(config.login_enabled());
    }

    #[test]
    fn test_validate_zero_session_ttl() {
        let config = Config {
            session_ttl: Duration::ZERO,
            ..Config::default()
        };

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("SESSION_TTL_SECS"));
    }

    #[test]
    fn test_validate_token_ttl_ordering() {
        let config = Config {
            session_ttl: Duration::from_secs(60),
            request_token_ttl: Duration::from_secs(3600),
            ..Config::default()
        };

        let result = config.validate();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("REQUEST_TOKEN_TTL_SECS")
        );
    }

    #[test]
    fn test_validate_login_path_shape() {
        let config = Config {
            login_path: "login".to_string(),
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_public_paths() {
        let config = Config::default();
        assert!(config.public_paths.contains(&"/api/login".to_string()));
        assert!(config.public_paths.contains(&"/api/health".to_string()));
    }
}
