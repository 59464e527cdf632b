//! Server configuration read from the environment at startup.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use cluecard_ladder::config::EngineConfig;
use cluecard_textgen::client::{DEFAULT_MODEL, DEFAULT_URL};
use cluecard_textgen::{Credentials, TextGenSettings};
use tracing::warn;

use crate::error::AppError;

/// Everything `main` needs to start the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` connection string.
    pub database_url: String,
    /// Listen address.
    pub addr: SocketAddr,
    /// Generation-service connection.
    pub textgen: TextGenSettings,
    /// Engine rules, loaded from `CLUECARD_ENGINE_CONFIG` when set.
    pub engine: EngineConfig,
}

impl ServerConfig {
    /// Reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for a missing `DATABASE_URL`, an invalid
    /// `HOST`/`PORT`, or an unreadable engine config file.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`ServerConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let database_url = lookup("DATABASE_URL").ok_or_else(|| {
            AppError::Config("DATABASE_URL environment variable must be set".to_owned())
        })?;
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned());
        let port: u16 = lookup("PORT")
            .unwrap_or_else(|| "3000".to_owned())
            .parse()
            .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;
        let addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;

        let engine = match lookup("CLUECARD_ENGINE_CONFIG") {
            Some(path) => EngineConfig::load(Path::new(&path))
                .map_err(|e| AppError::Config(e.to_string()))?,
            None => EngineConfig::default(),
        };

        // Must outlive the orchestrator's per-attempt deadline.
        let request_timeout = engine.generation.request_timeout() + Duration::from_secs(5);

        let textgen = TextGenSettings {
            url: lookup("CLUECARD_TEXTGEN_URL").unwrap_or_else(|| DEFAULT_URL.to_owned()),
            model: lookup("CLUECARD_TEXTGEN_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            credentials: credentials(&lookup),
            request_timeout,
            ..TextGenSettings::default()
        };

        Ok(Self {
            database_url,
            addr,
            textgen,
            engine,
        })
    }
}

fn credentials(lookup: &impl Fn(&str) -> Option<String>) -> Option<Credentials> {
    if let Some(key) = lookup("CLUECARD_TEXTGEN_API_KEY").filter(|k| !k.is_empty()) {
        return Some(Credentials::ApiKey(key));
    }

    let token_url = lookup("CLUECARD_TEXTGEN_TOKEN_URL");
    let client_id = lookup("CLUECARD_TEXTGEN_CLIENT_ID");
    let client_secret = lookup("CLUECARD_TEXTGEN_CLIENT_SECRET");
    match (token_url, client_id, client_secret) {
        (Some(token_url), Some(client_id), Some(client_secret)) => {
            Some(Credentials::ClientCredentials {
                token_url,
                client_id,
                client_secret,
            })
        }
        (None, None, None) => None,
        _ => {
            warn!("incomplete client-credentials configuration ignored");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_only_database_url() {
        let config =
            ServerConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://db")])).unwrap();

        assert_eq!(config.database_url, "postgres://db");
        assert_eq!(config.addr.to_string(), "0.0.0.0:3000");
        assert_eq!(config.textgen.url, DEFAULT_URL);
        assert!(config.textgen.credentials.is_none());
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn test_missing_database_url_is_an_error() {
        let result = ServerConfig::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let result = ServerConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db"),
            ("PORT", "eighty"),
        ]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_api_key_takes_precedence() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db"),
            ("CLUECARD_TEXTGEN_API_KEY", "sk-1"),
            ("CLUECARD_TEXTGEN_TOKEN_URL", "https://auth/token"),
            ("CLUECARD_TEXTGEN_CLIENT_ID", "id"),
            ("CLUECARD_TEXTGEN_CLIENT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(
            config.textgen.credentials,
            Some(Credentials::ApiKey("sk-1".to_owned()))
        );
    }

    #[test]
    fn test_client_credentials_need_all_three_values() {
        let partial = ServerConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db"),
            ("CLUECARD_TEXTGEN_TOKEN_URL", "https://auth/token"),
            ("CLUECARD_TEXTGEN_CLIENT_ID", "id"),
        ]))
        .unwrap();
        assert!(partial.textgen.credentials.is_none());

        let full = ServerConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db"),
            ("CLUECARD_TEXTGEN_TOKEN_URL", "https://auth/token"),
            ("CLUECARD_TEXTGEN_CLIENT_ID", "id"),
            ("CLUECARD_TEXTGEN_CLIENT_SECRET", "secret"),
        ]))
        .unwrap();
        assert!(matches!(
            full.textgen.credentials,
            Some(Credentials::ClientCredentials { .. })
        ));
    }

    #[test]
    fn test_unreadable_engine_config_is_an_error() {
        let result = ServerConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db"),
            ("CLUECARD_ENGINE_CONFIG", "/definitely/not/here.yaml"),
        ]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
