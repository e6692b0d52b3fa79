use std::env;

use actix_web::cookie::Key;

use crate::errors::AppError;

/// Minimum length `actix_web::cookie::Key::from` accepts.
const MIN_SESSION_KEY_LEN: usize = 64;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub session_key: String,
    pub cookie_secure: bool,
}

impl Config {
    pub fn from_env() -> Result<Config, AppError> {
        Config::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://rentall.db".to_owned());
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| AppError::ConfigError(format!("PORT is not a valid port: {}", raw)))?,
            None => 8080,
        };

        let session_key = lookup("SESSION_KEY").ok_or_else(|| {
            AppError::ConfigError("SESSION_KEY environment variable not set".into())
        })?;
        if session_key.len() < MIN_SESSION_KEY_LEN {
            return Err(AppError::ConfigError(format!(
                "SESSION_KEY must be at least {} bytes long",
                MIN_SESSION_KEY_LEN
            )));
        }

        let cookie_secure = match lookup("COOKIE_SECURE").as_deref() {
            None | Some("") | Some("0") | Some("false") => false,
            Some("1") | Some("true") => true,
            Some(other) => {
                return Err(AppError::ConfigError(format!(
                    "COOKIE_SECURE must be true or false, got {}",
                    other
                )))
            }
        };

        Ok(Config {
            database_url,
            host,
            port,
            session_key,
            cookie_secure,
        })
    }

    pub fn session_key(&self) -> Key {
        Key::from(self.session_key.as_bytes())
    }
}
