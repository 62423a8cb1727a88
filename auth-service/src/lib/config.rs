use std::env;

use auth::Algorithm;
use chrono::Duration;
use config::builder::DefaultState;
use config::Config as ConfigBuilder;
use config::ConfigBuilder as Builder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: String,
    pub expiration_minutes: i64,
}

impl JwtConfig {
    /// Signing algorithm named by `algorithm`.
    ///
    /// # Errors
    /// * `ConfigError::Message` - Unknown or non-HMAC algorithm
    pub fn signing_algorithm(&self) -> Result<Algorithm, ConfigError> {
        auth::parse_algorithm(&self.algorithm)
            .map_err(|e| ConfigError::Message(format!("jwt.algorithm: {}", e)))
    }

    /// Lifetime of issued access tokens.
    pub fn token_ttl(&self) -> Duration {
        Duration::minutes(self.expiration_minutes)
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Flat variables `DATABASE_URL`, `SECRET_KEY`, `ALGORITHM`,
    ///    `ACCESS_TOKEN_EXPIRE_MINUTES`
    /// 2. Nested environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 3. Environment-specific config file (config/{environment}.toml)
    /// 4. Default config file (config/default.toml)
    /// 5. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: DATABASE__URL=postgres://... overrides database.url
            .add_source(Environment::default().separator("__"))
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .set_override_option("jwt.secret", env::var("SECRET_KEY").ok())?
            .set_override_option("jwt.algorithm", env::var("ALGORITHM").ok())?
            .set_override_option(
                "jwt.expiration_minutes",
                env::var("ACCESS_TOKEN_EXPIRE_MINUTES").ok(),
            )?;

        Self::from_builder(builder)
    }

    /// Builder pre-populated with the built-in defaults.
    pub fn defaults() -> Result<Builder<DefaultState>, ConfigError> {
        ConfigBuilder::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.http_port", 8000)?
            .set_default("database.max_connections", 5)?
            .set_default("jwt.algorithm", "HS256")?
            .set_default("jwt.expiration_minutes", 30)
    }

    /// Build, deserialize and validate a configuration.
    pub fn from_builder(builder: Builder<DefaultState>) -> Result<Self, ConfigError> {
        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject configurations the service cannot run with.
    ///
    /// # Errors
    /// * `ConfigError::Message` - Empty secret or database URL, unsupported
    ///   algorithm, non-positive expiry or pool size
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Message("database.url must not be empty".into()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Message(
                "database.max_connections must be positive".into(),
            ));
        }
        if self.jwt.secret.is_empty() {
            return Err(ConfigError::Message("jwt.secret must not be empty".into()));
        }
        if self.jwt.expiration_minutes <= 0 {
            return Err(ConfigError::Message(
                "jwt.expiration_minutes must be positive".into(),
            ));
        }
        self.jwt.signing_algorithm()?;

        Ok(())
    }
}
