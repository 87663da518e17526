use std::env;
use std::fmt;

use auth::Authenticator;
use auth::JwtHandler;
use auth::PasswordHasher;
use config::builder::DefaultState;
use config::Config as ConfigBuilder;
use config::ConfigBuilder as Builder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// Signing secret used when nothing else is configured. Refused in production.
pub const DEV_FALLBACK_SECRET: &str = "dev-only-insecure-secret-change-me";

pub const PRODUCTION: &str = "production";

/// Upper bound for `jwt.access_token_expire_minutes` (one year).
pub const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub name: String,
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

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: String,
    pub access_token_expire_minutes: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("access_token_expire_minutes", &self.access_token_expire_minutes)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub bcrypt_cost: u32,
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.), including a `.env` file
    /// 2. Environment-specific config file (config/{RUN_MODE}.toml)
    /// 3. Default config file (config/default.toml)
    /// 4. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        Self::load_for(&run_mode)
    }

    /// Load configuration for an explicit run mode.
    ///
    /// # Errors
    /// * `ConfigError` - A source failed to parse, or the settings are unusable
    ///   for `run_mode` (see [`Config::validate`])
    pub fn load_for(run_mode: &str) -> Result<Self, ConfigError> {
        let configuration = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // DATABASE__URL=sqlite://... overrides database.url
            .add_source(Environment::default().separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate(run_mode)?;

        Ok(config)
    }

    fn defaults() -> Result<Builder<DefaultState>, ConfigError> {
        ConfigBuilder::builder()
            .set_default("app.name", "Auth Service")?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.http_port", 8000_i64)?
            .set_default("database.url", "sqlite://auth.db")?
            .set_default("database.max_connections", 5_i64)?
            .set_default("jwt.secret", DEV_FALLBACK_SECRET)?
            .set_default("jwt.algorithm", "HS256")?
            .set_default(
                "jwt.access_token_expire_minutes",
                Authenticator::DEFAULT_TOKEN_TTL_MINUTES,
            )?
            .set_default("password.bcrypt_cost", i64::from(bcrypt_default_cost()))
    }

    /// Reject settings that cannot run safely.
    ///
    /// # Errors
    /// * Empty signing secret in any mode
    /// * The built-in fallback secret when `run_mode` is production
    /// * Token lifetime not in `1..=MAX_TOKEN_TTL_MINUTES`
    pub fn validate(&self, run_mode: &str) -> Result<(), ConfigError> {
        if self.jwt.secret.is_empty() {
            return Err(ConfigError::Message("jwt.secret must not be empty".into()));
        }

        if run_mode == PRODUCTION && self.jwt.secret == DEV_FALLBACK_SECRET {
            return Err(ConfigError::Message(
                "jwt.secret must be set explicitly in production".into(),
            ));
        }

        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&self.jwt.access_token_expire_minutes) {
            return Err(ConfigError::Message(format!(
                "jwt.access_token_expire_minutes must be between 1 and {}",
                MAX_TOKEN_TTL_MINUTES
            )));
        }

        Ok(())
    }

    /// Build the process-wide authenticator from the jwt and password sections.
    ///
    /// # Errors
    /// * `ConfigError::Message` - Unsupported algorithm, bcrypt cost out of range,
    ///   or token lifetime not representable
    pub fn authenticator(&self) -> Result<Authenticator, ConfigError> {
        let password_hasher = PasswordHasher::with_cost(self.password.bcrypt_cost)
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        let jwt_handler =
            JwtHandler::with_algorithm(self.jwt.secret.as_bytes(), &self.jwt.algorithm)
                .map_err(|e| ConfigError::Message(e.to_string()))?;
        let token_ttl = chrono::Duration::try_minutes(self.jwt.access_token_expire_minutes)
            .ok_or_else(|| {
                ConfigError::Message(format!(
                    "jwt.access_token_expire_minutes out of range: {}",
                    self.jwt.access_token_expire_minutes
                ))
            })?;

        Ok(Authenticator::from_parts(password_hasher, jwt_handler, token_ttl))
    }
}

fn bcrypt_default_cost() -> u32 {
    PasswordHasher::new().cost()
}
