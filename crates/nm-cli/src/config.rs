//! TOML configuration for the role universe, display priority and entity
//! roles. Every key is optional and falls back to the built-in defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use nm_core::{
    DEFAULT_DISPLAY_ORDER, DEFAULT_EMBEDDABLE_ROLES, DEFAULT_ENTITY_ROLES, DEFAULT_USED_ROLES,
    UsedRoles,
};
use serde::Deserialize;

/// Environment variable naming a config file when `--config` is absent.
pub const CONFIG_ENV: &str = "NM_CONFIG";

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub roles: RolesConfig,
    pub entities: EntitiesConfig,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RolesConfig {
    pub used: Vec<String>,
    pub embeddable: Vec<String>,
    pub display_order: Vec<String>,
}

impl Default for RolesConfig {
    fn default() -> Self {
        Self {
            used: to_strings(&DEFAULT_USED_ROLES),
            embeddable: to_strings(&DEFAULT_EMBEDDABLE_ROLES),
            display_order: to_strings(&DEFAULT_DISPLAY_ORDER),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EntitiesConfig {
    pub roles: Vec<String>,
}

impl Default for EntitiesConfig {
    fn default() -> Self {
        Self {
            roles: to_strings(&DEFAULT_ENTITY_ROLES),
        }
    }
}

fn to_strings(roles: &[&str]) -> Vec<String> {
    roles.iter().map(|r| r.to_string()).collect()
}

impl Config {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    /// Load from `path`, else from `$NM_CONFIG`, else use the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from));
        let Some(path) = path else {
            tracing::debug!("no configuration file, using default roles");
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config =
            Self::parse(&text).with_context(|| format!("in config {}", path.display()))?;
        tracing::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn used_roles(&self) -> Result<UsedRoles> {
        UsedRoles::new(self.roles.used.clone(), self.roles.embeddable.clone())
            .context("invalid [roles] section")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_override() {
        let config = Config::parse(
            r#"
            [roles]
            used = ["ARG0", "B-V", "B-ARGM-NEG"]
            embeddable = ["ARG0", "B-V"]
            "#,
        )
        .unwrap();
        assert_eq!(config.roles.used, vec!["ARG0", "B-V", "B-ARGM-NEG"]);
        assert_eq!(config.roles.display_order, to_strings(&DEFAULT_DISPLAY_ORDER));
        assert_eq!(config.entities, EntitiesConfig::default());
        assert!(config.used_roles().is_ok());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Config::parse("[roles]\nusd = []\n").is_err());
    }

    #[test]
    fn test_invalid_universe_rejected() {
        let config = Config::parse(
            r#"
            [roles]
            used = ["ARG0", "ARG1"]
            embeddable = ["ARG0"]
            "#,
        )
        .unwrap();
        assert!(config.used_roles().is_err());
    }
}
