//! Process configuration read from the environment.

use std::net::SocketAddr;

use thiserror::Error;

pub use projtrack_observability::LogFormat;

const DEFAULT_BIND: &str = "0.0.0.0:8080";
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("{0} must be set when USE_PERSISTENT_STORES is enabled")]
    Missing(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub database_url: Option<String>,
    pub use_persistent_stores: bool,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = get("PROJTRACK_BIND")
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                var: "PROJTRACK_BIND",
                reason: e.to_string(),
            })?;

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_string());

        let use_persistent_stores = match get("USE_PERSISTENT_STORES") {
            None => false,
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::Invalid {
                var: "USE_PERSISTENT_STORES",
                reason: format!("'{raw}' is not a boolean"),
            })?,
        };

        let database_url = get("DATABASE_URL");
        if use_persistent_stores && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let log_format = match get("LOG_FORMAT") {
            None => LogFormat::default(),
            Some(raw) => raw.parse().map_err(|reason| ConfigError::Invalid {
                var: "LOG_FORMAT",
                reason,
            })?,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            database_url,
            use_persistent_stores,
            log_format,
        })
    }

    /// True when no `JWT_SECRET` was configured and the insecure default is in use.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:8080");
        assert!(cfg.uses_dev_secret());
        assert!(!cfg.use_persistent_stores);
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn persistent_mode_requires_database_url() {
        assert_eq!(
            config(&[("USE_PERSISTENT_STORES", "true")]).unwrap_err(),
            ConfigError::Missing("DATABASE_URL")
        );
        let cfg = config(&[
            ("USE_PERSISTENT_STORES", "1"),
            ("DATABASE_URL", "postgres://localhost/projtrack"),
        ])
        .unwrap();
        assert!(cfg.use_persistent_stores);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            config(&[("PROJTRACK_BIND", "nope")]),
            Err(ConfigError::Invalid { var: "PROJTRACK_BIND", .. })
        ));
        assert!(matches!(
            config(&[("USE_PERSISTENT_STORES", "maybe")]),
            Err(ConfigError::Invalid { var: "USE_PERSISTENT_STORES", .. })
        ));
        assert!(matches!(
            config(&[("LOG_FORMAT", "xml")]),
            Err(ConfigError::Invalid { var: "LOG_FORMAT", .. })
        ));
    }

    #[test]
    fn blank_values_are_unset() {
        let cfg = config(&[("JWT_SECRET", "  "), ("LOG_FORMAT", "pretty")]).unwrap();
        assert_eq!(cfg.jwt_secret, "dev-secret");
        assert_eq!(cfg.log_format, LogFormat::Pretty);
    }
}
