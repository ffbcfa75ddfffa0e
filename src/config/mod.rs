//! Configuration management for fanmerge
//!
//! Settings are layered with figment: embedded defaults, then a config file,
//! then `FANMERGE_` environment variables, then command-line overrides.

use serde::{Deserialize, Serialize};

use crate::parallel::GroupConfig;

pub mod core;
pub mod overrides;
pub mod smart_load;


pub use self::core::FanmergeConfig;

/// Fully merged settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Transform engine settings
    #[serde(default)]
    pub group: GroupConfig,

    /// Sentence scanner settings
    #[serde(default)]
    pub scanner: ScannerConfig,
}

/// Sentence scanner configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Lines per page
    #[serde(default = "default_page_lines")]
    pub page_lines: usize,

    /// Custom sentence patterns; empty uses the built-in one
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Default number of lines per page
fn default_page_lines() -> usize {
    40
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            page_lines: default_page_lines(),
            patterns: Vec::new(),
        }
    }
}
