//! Configuration loading and validation.
//!
//! All values are read from `CREDVAULT_`-prefixed environment variables at
//! startup; nested keys use `__`. Master secrets are registered one per
//! version:
//!
//! ```text
//! CREDVAULT_MASTER_KEYS__1=<secret for version 1>
//! CREDVAULT_MASTER_KEYS__2=<secret for version 2>
//! CREDVAULT_CURRENT_KEY_VERSION=2
//! ```

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::keys::{KeyRing, MasterSecret};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "CREDVAULT";

/// Validated service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Master secrets keyed by version number (as a string, from the env key).
    #[serde(default)]
    pub master_keys: HashMap<String, MasterSecret>,

    /// Key version new envelopes are sealed under.
    #[serde(default = "default_current_key_version")]
    pub current_key_version: u32,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// OTLP endpoint for span export. Disabled when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_current_key_version() -> u32 {
    1
}
fn default_listen_port() -> u16 {
    8080
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        );
        Self::from_builder(builder)
    }

    /// Build, deserialise and validate from an arbitrary source builder.
    pub fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        let cfg = builder
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.current_key_version == 0 {
            anyhow::bail!("CURRENT_KEY_VERSION must be > 0");
        }
        for name in self.master_keys.keys() {
            parse_version(name)?;
        }
        if !self
            .master_keys
            .keys()
            .any(|k| parse_version(k).ok() == Some(self.current_key_version))
        {
            anyhow::bail!(
                "MASTER_KEYS__{} is required for the current key version",
                self.current_key_version
            );
        }
        if self.log_level.trim().is_empty() {
            anyhow::bail!("LOG_LEVEL must not be empty");
        }
        Ok(())
    }

    /// Build the immutable [`KeyRing`] handed to the cipher service.
    ///
    /// # Errors
    ///
    /// Returns an error if a master-key name is not a positive integer.
    pub fn key_ring(&self) -> Result<KeyRing> {
        let secrets = self
            .master_keys
            .iter()
            .map(|(name, secret)| -> Result<(u32, MasterSecret)> {
                Ok((parse_version(name)?, secret.clone()))
            })
            .collect::<Result<HashMap<u32, MasterSecret>>>()?;
        Ok(KeyRing::from_parts(self.current_key_version, secrets))
    }
}

fn parse_version(name: &str) -> Result<u32> {
    match name.parse::<u32>() {
        Ok(v) if v > 0 => Ok(v),
        _ => anyhow::bail!("MASTER_KEYS__{name}: key version must be a positive integer"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRONG_V1: &str = "kP9#vX2$mQ7!tR4&wZ8*yB3@nH6^jL5%";
    const STRONG_V2: &str = "Gf4)Ud8(Ks1_Ya0+Ce7=Xi2~Wo9-Tn3<";

    fn builder() -> config::ConfigBuilder<config::builder::DefaultState> {
        config::Config::builder()
    }

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_current_key_version(), 1);
        assert_eq!(default_listen_port(), 8080);
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn loads_versioned_master_keys() {
        let cfg = Config::from_builder(
            builder()
                .set_override("master_keys.1", STRONG_V1)
                .unwrap()
                .set_override("master_keys.2", STRONG_V2)
                .unwrap()
                .set_override("current_key_version", 2i64)
                .unwrap(),
        )
        .unwrap();
        assert_eq!(cfg.listen_port, 8080);
        assert!(cfg.otel_exporter_otlp_endpoint.is_none());

        let ring = cfg.key_ring().unwrap();
        assert_eq!(ring.current_version(), 2);
        assert_eq!(ring.versions(), vec![1, 2]);
        assert_eq!(ring.encryption_key(1).unwrap().expose(), STRONG_V1);
    }

    #[test]
    fn rejects_missing_current_secret() {
        let result = Config::from_builder(
            builder()
                .set_override("master_keys.1", STRONG_V1)
                .unwrap()
                .set_override("current_key_version", 3i64)
                .unwrap(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_non_numeric_version() {
        let result = Config::from_builder(
            builder()
                .set_override("master_keys.1", STRONG_V1)
                .unwrap()
                .set_override("master_keys.latest", STRONG_V2)
                .unwrap(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_zero_current_version() {
        let result = Config::from_builder(
            builder()
                .set_override("master_keys.1", STRONG_V1)
                .unwrap()
                .set_override("current_key_version", 0i64)
                .unwrap(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn debug_does_not_leak_secrets() {
        let cfg = Config::from_builder(builder().set_override("master_keys.1", STRONG_V1).unwrap())
            .unwrap();
        assert!(!format!("{cfg:?}").contains(STRONG_V1));
    }
}
