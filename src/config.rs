use std::net::SocketAddr;

use crate::error::ConfigError;
use crate::solver::{DEFAULT_MAX_PASSES_PER_COURSE, EngineOptions};

pub const ADDR_VAR: &str = "TIMETABLE_SOLVER_ADDR";
pub const MAX_PASSES_VAR: &str = "TIMETABLE_SOLVER_MAX_PASSES";
const DEFAULT_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub engine: EngineOptions,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr = lookup(ADDR_VAR).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let bind_addr = addr.parse().map_err(|_| ConfigError::InvalidValue {
            key: ADDR_VAR,
            value: addr.clone(),
        })?;

        let max_passes_per_course = match lookup(MAX_PASSES_VAR) {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|&n| n > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: MAX_PASSES_VAR,
                    value: raw,
                })?,
            None => DEFAULT_MAX_PASSES_PER_COURSE,
        };

        Ok(Self {
            bind_addr,
            engine: EngineOptions {
                max_passes_per_course,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.engine, EngineOptions::default());
    }

    #[test]
    fn reads_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            (ADDR_VAR, "0.0.0.0:9000"),
            (MAX_PASSES_VAR, "4"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.engine.max_passes_per_course, 4);
    }

    #[test]
    fn rejects_bad_values() {
        let err = ServerConfig::from_lookup(lookup_from(&[(ADDR_VAR, "not-an-addr")])).unwrap_err();
        assert!(err.to_string().contains(ADDR_VAR));

        for raw in ["0", "many"] {
            let err = ServerConfig::from_lookup(lookup_from(&[(MAX_PASSES_VAR, raw)])).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("invalid value for {MAX_PASSES_VAR}: {raw}")
            );
        }
    }
}
