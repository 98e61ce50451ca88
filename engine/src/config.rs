//! Configuration for conflict resolution.

use crate::{error::Result, ResolutionStrategy};
use serde::{Deserialize, Serialize};
use std::env;

/// Environment variable selecting the resolution strategy.
pub const STRATEGY_ENV: &str = "KVSYNC_CONFLICT_STRATEGY";

/// Environment variable naming this device.
pub const DEVICE_ID_ENV: &str = "KVSYNC_DEVICE_ID";

/// Resolver configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverConfig {
    /// Strategy applied to every conflict
    #[serde(default)]
    pub strategy: ResolutionStrategy,
    /// Identity of this device, attached to log events
    #[serde(default)]
    pub device_id: Option<String>,
}

impl ResolverConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let strategy = match lookup(STRATEGY_ENV) {
            Some(value) if !value.trim().is_empty() => value.parse()?,
            _ => ResolutionStrategy::default(),
        };

        let device_id = lookup(DEVICE_ID_ENV).filter(|id| !id.is_empty());

        Ok(Self {
            strategy,
            device_id,
        })
    }

    /// Parse configuration from JSON.
    ///
    /// The strategy name goes through the same parser as [`Self::from_env`],
    /// so an unknown name is an [`InvalidConfig`](crate::Error::InvalidConfig)
    /// error here too.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(json)?;

        let strategy = match raw.strategy {
            Some(value) => value.parse()?,
            None => ResolutionStrategy::default(),
        };

        Ok(Self {
            strategy,
            device_id: raw.device_id,
        })
    }
}

/// JSON shape of [`ResolverConfig`] before the strategy name is checked.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    #[serde(default)]
    strategy: Option<String>,
    #[serde(default)]
    device_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ResolverConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ResolverConfig::default());
        assert_eq!(config.strategy, ResolutionStrategy::LastWriterWins);
    }

    #[test]
    fn reads_strategy_and_device() {
        let config = ResolverConfig::from_lookup(lookup(&[
            (STRATEGY_ENV, "remote-wins"),
            (DEVICE_ID_ENV, "laptop-7"),
        ]))
        .unwrap();

        assert_eq!(config.strategy, ResolutionStrategy::RemoteWins);
        assert_eq!(config.device_id.as_deref(), Some("laptop-7"));
    }

    #[test]
    fn blank_values_fall_back() {
        let config =
            ResolverConfig::from_lookup(lookup(&[(STRATEGY_ENV, "  "), (DEVICE_ID_ENV, "")]))
                .unwrap();
        assert_eq!(config, ResolverConfig::default());
    }

    #[test]
    fn invalid_strategy() {
        let err = ResolverConfig::from_lookup(lookup(&[(STRATEGY_ENV, "coin-flip")])).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidConfig("unknown resolution strategy 'coin-flip'".into())
        );
    }

    #[test]
    fn from_json() {
        let config =
            ResolverConfig::from_json(r#"{"strategy": "local-wins", "deviceId": "tv"}"#).unwrap();
        assert_eq!(config.strategy, ResolutionStrategy::LocalWins);
        assert_eq!(config.device_id.as_deref(), Some("tv"));

        let config = ResolverConfig::from_json("{}").unwrap();
        assert_eq!(config, ResolverConfig::default());

        let err = ResolverConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn json_and_env_agree_on_strategy_names() {
        for name in ["newest", "Remote-Wins", " local-wins ", "LAST-WRITER-WINS"] {
            let from_env = ResolverConfig::from_lookup(lookup(&[(STRATEGY_ENV, name)]));
            let json = serde_json::json!({ "strategy": name }).to_string();
            let from_json = ResolverConfig::from_json(&json);

            assert_eq!(
                from_env.map(|c| c.strategy),
                from_json.map(|c| c.strategy),
                "strategy name {:?}",
                name
            );
        }
    }

    #[test]
    fn json_unknown_strategy_is_invalid_config() {
        let err = ResolverConfig::from_json(r#"{"strategy": "newest"}"#).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidConfig("unknown resolution strategy 'newest'".into())
        );
    }

    #[test]
    fn json_strategy_case_folded() {
        let config = ResolverConfig::from_json(r#"{"strategy": "Remote-Wins"}"#).unwrap();
        assert_eq!(config.strategy, ResolutionStrategy::RemoteWins);

        let strategy: ResolutionStrategy = serde_json::from_str(r#"" LOCAL-WINS ""#).unwrap();
        assert_eq!(strategy, ResolutionStrategy::LocalWins);
    }
}
