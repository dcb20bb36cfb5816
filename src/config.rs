use base64::{engine::general_purpose, Engine as _};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} missing")]
    Missing(&'static str),
    #[error("SESSION_KEY must be base64 of at least 32 bytes")]
    SessionKey,
    #[error("unknown STORE value: {0}")]
    Store(String),
}

#[derive(Clone)]
pub struct Config {
    pub store: StoreKind,
    pub database_url: Option<String>,
    pub session_key: Vec<u8>,
    pub bind_addr: String,
    /// Seeds demo users (with this password) and a demo fleet on startup.
    pub seed_password: Option<String>,
    pub secure_cookies: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = match lookup("STORE").as_deref().map(str::trim) {
            None | Some("") | Some("postgres") => StoreKind::Postgres,
            Some("memory") => StoreKind::Memory,
            Some(other) => return Err(ConfigError::Store(other.to_string())),
        };

        let database_url = lookup("DATABASE_URL");
        if store == StoreKind::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let key_b64 = lookup("SESSION_KEY").ok_or(ConfigError::Missing("SESSION_KEY"))?;
        let session_key = general_purpose::STANDARD
            .decode(key_b64.trim())
            .map_err(|_| ConfigError::SessionKey)?;
        if session_key.len() < 32 {
            return Err(ConfigError::SessionKey);
        }

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| {
            let port = lookup("PORT").unwrap_or_else(|| "3000".to_string());
            format!("0.0.0.0:{}", port)
        });

        Ok(Self {
            store,
            database_url,
            session_key,
            bind_addr,
            seed_password: lookup("SEED_DEMO_PASSWORD").filter(|p| !p.is_empty()),
            secure_cookies: lookup("PRODUCTION").is_some(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn key() -> String {
        general_purpose::STANDARD.encode([7u8; 32])
    }

    #[test]
    fn memory_store_needs_no_database() {
        let key = key();
        let cfg = Config::from_lookup(lookup(&[("STORE", "memory"), ("SESSION_KEY", &key)])).unwrap();
        assert_eq!(cfg.store, StoreKind::Memory);
        assert_eq!(cfg.bind_addr, "0.0.0.0:3000");
        assert!(!cfg.secure_cookies);
    }

    #[test]
    fn postgres_requires_database_url() {
        let key = key();
        let err = Config::from_lookup(lookup(&[("SESSION_KEY", &key)])).err();
        assert_eq!(err, Some(ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn short_session_key_rejected() {
        let short = general_purpose::STANDARD.encode([1u8; 8]);
        let err = Config::from_lookup(lookup(&[("STORE", "memory"), ("SESSION_KEY", &short)])).err();
        assert_eq!(err, Some(ConfigError::SessionKey));
    }

    #[test]
    fn port_and_production_flags() {
        let key = key();
        let cfg = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/prs"),
            ("SESSION_KEY", &key),
            ("PORT", "8080"),
            ("PRODUCTION", "1"),
        ]))
        .unwrap();
        assert_eq!(cfg.store, StoreKind::Postgres);
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080");
        assert!(cfg.secure_cookies);
    }
}
