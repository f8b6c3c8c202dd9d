use secrecy::SecretString;
use std::collections::HashMap;
use std::env;
use thiserror::Error;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8085";
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 3600;
pub const DEFAULT_ACCESS_COOKIE_MAX_AGE_SECONDS: i64 = 3000;
pub const DEFAULT_PUBLIC_PATHS: &str = "/login,/logout,/register,/verify-server-token";
pub const DEFAULT_SELF_SERVICE_PATH: &str = "/account";
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// HMAC secrets shorter than this are trivially brute-forceable.
const MIN_JWT_SECRET_CHARS: usize = 16;

/// bcrypt refuses costs outside [4, 31]; out-of-range configs are clamped
/// rather than rejected so a typo cannot keep the service from starting.
const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub jwt_secret: SecretString,
    pub token_ttl_seconds: i64,
    pub access_cookie_max_age: i64,
    pub public_paths: Vec<String>,
    pub self_service_path: String,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
            .clone();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let jwt_secret = vars
            .get("AG_JWT_SECRET")
            .ok_or_else(|| ConfigError::MissingEnvVar("AG_JWT_SECRET".to_string()))?;

        if jwt_secret.chars().count() < MIN_JWT_SECRET_CHARS {
            return Err(ConfigError::InvalidValue {
                var: "AG_JWT_SECRET".to_string(),
                reason: format!("must be at least {MIN_JWT_SECRET_CHARS} characters"),
            });
        }

        let token_ttl_seconds = parse_positive_i64(
            vars,
            "AG_TOKEN_TTL_SECONDS",
            DEFAULT_TOKEN_TTL_SECONDS,
        )?;

        let access_cookie_max_age = parse_positive_i64(
            vars,
            "AG_ACCESS_COOKIE_MAX_AGE_SECONDS",
            DEFAULT_ACCESS_COOKIE_MAX_AGE_SECONDS,
        )?;

        let public_paths = parse_path_list(
            vars.get("AG_PUBLIC_PATHS")
                .map(String::as_str)
                .unwrap_or(DEFAULT_PUBLIC_PATHS),
        )?;

        let self_service_path = vars
            .get("AG_SELF_SERVICE_PATH")
            .cloned()
            .unwrap_or_else(|| DEFAULT_SELF_SERVICE_PATH.to_string());

        if !self_service_path.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                var: "AG_SELF_SERVICE_PATH".to_string(),
                reason: format!("path '{self_service_path}' must start with '/'"),
            });
        }

        let bcrypt_cost = match vars.get("AG_BCRYPT_COST") {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidValue {
                    var: "AG_BCRYPT_COST".to_string(),
                    reason: format!("'{raw}' is not a valid cost"),
                })?
                .clamp(MIN_BCRYPT_COST, MAX_BCRYPT_COST),
            None => DEFAULT_BCRYPT_COST,
        };

        Ok(Config {
            database_url,
            bind_address,
            jwt_secret: SecretString::from(jwt_secret.clone()),
            token_ttl_seconds,
            access_cookie_max_age,
            public_paths,
            self_service_path,
            bcrypt_cost,
        })
    }
}

fn parse_positive_i64(
    vars: &HashMap<String, String>,
    var: &str,
    default: i64,
) -> Result<i64, ConfigError> {
    let Some(raw) = vars.get(var) else {
        return Ok(default);
    };

    let value = raw.parse::<i64>().map_err(|_| ConfigError::InvalidValue {
        var: var.to_string(),
        reason: format!("'{raw}' is not a valid number of seconds"),
    })?;

    if value <= 0 {
        return Err(ConfigError::InvalidValue {
            var: var.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(value)
}

fn parse_path_list(raw: &str) -> Result<Vec<String>, ConfigError> {
    let mut paths = Vec::new();

    for entry in raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        if !entry.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                var: "AG_PUBLIC_PATHS".to_string(),
                reason: format!("path '{entry}' must start with '/'"),
            });
        }

        paths.push(entry.to_string());
    }

    Ok(paths)
}
