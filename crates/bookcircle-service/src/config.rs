use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::env;
use thiserror::Error;

/// Default access token lifetime: 15 minutes.
pub const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 900;

/// Default refresh token lifetime: 7 days.
pub const DEFAULT_REFRESH_TOKEN_TTL_SECONDS: i64 = 604_800;

/// Default bcrypt work factor.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Minimum accepted bcrypt work factor.
pub const MIN_BCRYPT_COST: u32 = 10;

/// Maximum accepted bcrypt work factor (above this, hashing latency is
/// excessive for interactive login).
pub const MAX_BCRYPT_COST: u32 = 14;

/// Minimum token secret length in bytes. Shorter secrets are brute-forceable.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Service configuration.
///
/// Token secrets are required: the service refuses to start without them
/// rather than substituting a guessable constant. They are held as
/// [`SecretString`] so Debug output redacts them and memory is zeroized on
/// drop.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub access_token_secret: SecretString,
    pub refresh_token_secret: SecretString,
    pub access_token_ttl_seconds: i64,
    pub refresh_token_ttl_seconds: i64,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("{0} must be at least {MIN_SECRET_LENGTH} bytes")]
    SecretTooShort(String),

    #[error("ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must be distinct")]
    ReusedSecret,

    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = require(vars, "DATABASE_URL")?;

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| "0.0.0.0:8080".to_string());

        let access_token_secret = require_secret(vars, "ACCESS_TOKEN_SECRET")?;
        let refresh_token_secret = require_secret(vars, "REFRESH_TOKEN_SECRET")?;

        // Independent secrets are what keep a captured refresh token from
        // being replayed as an access credential.
        if access_token_secret.expose_secret() == refresh_token_secret.expose_secret() {
            return Err(ConfigError::ReusedSecret);
        }

        let access_token_ttl_seconds = parse_ttl(
            vars,
            "ACCESS_TOKEN_TTL_SECONDS",
            DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
        )?;
        let refresh_token_ttl_seconds = parse_ttl(
            vars,
            "REFRESH_TOKEN_TTL_SECONDS",
            DEFAULT_REFRESH_TOKEN_TTL_SECONDS,
        )?;

        let bcrypt_cost = match vars.get("BCRYPT_COST") {
            None => DEFAULT_BCRYPT_COST,
            Some(raw) => {
                let cost: u32 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                    var: "BCRYPT_COST".to_string(),
                    reason: format!("not an integer: {}", raw),
                })?;
                if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
                    return Err(ConfigError::InvalidValue {
                        var: "BCRYPT_COST".to_string(),
                        reason: format!(
                            "{} outside allowed range {}-{}",
                            cost, MIN_BCRYPT_COST, MAX_BCRYPT_COST
                        ),
                    });
                }
                cost
            }
        };

        Ok(Config {
            database_url,
            bind_address,
            access_token_secret,
            refresh_token_secret,
            access_token_ttl_seconds,
            refresh_token_ttl_seconds,
            bcrypt_cost,
        })
    }
}

fn require(vars: &HashMap<String, String>, name: &str) -> Result<String, ConfigError> {
    vars.get(name)
        .filter(|v| !v.is_empty())
        .cloned()
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

fn require_secret(
    vars: &HashMap<String, String>,
    name: &str,
) -> Result<SecretString, ConfigError> {
    let value = require(vars, name)?;
    if value.len() < MIN_SECRET_LENGTH {
        return Err(ConfigError::SecretTooShort(name.to_string()));
    }
    Ok(SecretString::from(value))
}

fn parse_ttl(
    vars: &HashMap<String, String>,
    name: &str,
    default: i64,
) -> Result<i64, ConfigError> {
    match vars.get(name) {
        None => Ok(default),
        Some(raw) => {
            let ttl: i64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                var: name.to_string(),
                reason: format!("not an integer: {}", raw),
            })?;
            if ttl <= 0 {
                return Err(ConfigError::InvalidValue {
                    var: name.to_string(),
                    reason: "must be positive".to_string(),
                });
            }
            Ok(ttl)
        }
    }
}
