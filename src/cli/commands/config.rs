use anyhow::Result;
use clap::Subcommand;
use std::path::Path;

use crate::config::FanmergeConfig;

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current merged configuration
    Show {
        /// Output format: toml or json
        #[arg(short, long, default_value = "toml")]
        format: String,
    },
    /// Print a single configuration value or section (e.g. `group.max_in_flight`)
    Get { key: String },
    /// Validate the configuration
    Validate,
}

pub async fn execute(cmd: ConfigCommands, custom_config: Option<&Path>) -> Result<()> {
    let config = FanmergeConfig::load_with(custom_config, None::<&()>)?;

    match cmd {
        ConfigCommands::Show { format } => {
            let rendered = match format.to_lowercase().as_str() {
                "toml" => config.to_toml()?,
                "json" => config.to_json()?,
                _ => anyhow::bail!("Unsupported format: {}. Use toml or json", format),
            };
            println!("{}", rendered);
        }
        ConfigCommands::Get { key } => {
            let value = config.get_section(&key)?;
            match value {
                serde_json::Value::String(s) => println!("{}", s),
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    println!("{}", serde_json::to_string_pretty(&value)?)
                }
                other => println!("{}", other),
            }
        }
        ConfigCommands::Validate => {
            // Loading already validated; reaching here means it is usable
            println!("Configuration is valid");
        }
    }
    Ok(())
}
