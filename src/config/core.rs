use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::Serialize;
use std::path::Path;

use super::overrides::filter_unset;
use super::smart_load;
use super::Settings;

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

/// Repository-local config file picked up when no custom file is given
const REPO_CONFIG_FILE: &str = "fanmerge.toml";

pub struct FanmergeConfig {
    figment: Figment,
}

impl FanmergeConfig {
    pub fn load() -> Result<Self> {
        Self::load_with(None, None::<&()>)
    }

    /// Defaults, then `custom_config` (or `fanmerge.toml`), then `FANMERGE_`
    /// env vars, then `overrides` (unset fields are skipped).
    pub fn load_with<T: Serialize>(custom_config: Option<&Path>, overrides: Option<&T>) -> Result<Self> {
        tracing::trace!("Loading configuration (custom file: {:?})", custom_config);

        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG));

        figment = match custom_config {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                figment.merge(smart_load::auto(path))
            }
            None => figment.merge(Toml::file(REPO_CONFIG_FILE)),
        };

        // Environment variables override files, e.g. FANMERGE_GROUP__MAX_IN_FLIGHT
        figment = figment.merge(Env::prefixed("FANMERGE_").split("__"));

        if let Some(overrides) = overrides {
            figment = figment.merge(Serialized::defaults(filter_unset(overrides)));
        }

        let config = FanmergeConfig { figment };
        config.validate()?;
        Ok(config)
    }

    pub fn settings(&self) -> Result<Settings> {
        self.figment
            .extract()
            .context("Failed to parse configuration")
    }

    /// Get a nested section as JSON
    pub fn get_section(&self, path: &str) -> Result<serde_json::Value> {
        Ok(self.figment.extract_inner(path)?)
    }

    /// Get the full merged configuration as a structured value
    pub fn get_full_config(&self) -> Result<serde_json::Value> {
        Ok(self.figment.extract()?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(&self.settings()?)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.settings()?)?)
    }

    fn validate(&self) -> Result<()> {
        let settings = self.settings()?;
        settings.group.validate()?;
        if settings.scanner.page_lines == 0 {
            anyhow::bail!("scanner.page_lines must be at least 1");
        }
        Ok(())
    }
}
