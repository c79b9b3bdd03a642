use crate::logger;
use crate::GlobalOpts;
use brix_config::{default_config_dir, Config, CONFIG_POINTER_FILE};
use clap::Subcommand;
use colored::Colorize;
use std::fs;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show the current configuration
    Show,
    /// Set a configuration value (installer-path, plugin-namespace)
    Set { key: String, value: String },
    /// Get or set the path to the config file.
    /// If `new_path` is provided, later runs read the config from that file.
    /// If omitted, the current configuration file path is printed.
    Path {
        /// Optional new config path to set
        new_path: Option<String>,
    },
}

pub fn handle_config(action: Option<ConfigAction>, opts: &GlobalOpts) -> Result<(), String> {
    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => show_config(opts),
        ConfigAction::Set { key, value } => set_config(&key, value),
        ConfigAction::Path { new_path } => config_path(new_path),
    }
}

fn show_config(opts: &GlobalOpts) -> Result<(), String> {
    let config = Config::load().map_err(|e| format!("Failed to load config: {}", e))?;

    println!("{}", "Configuration:".bold().green());
    if config.is_empty() {
        if opts.verbosity_level() > 0 {
            println!("  {}", "(empty)".yellow());
        }
    } else {
        for (key, value) in config.values_iter() {
            println!("  {}: {}", key.cyan(), value);
        }
    }
    Ok(())
}

fn set_config(key: &str, value: String) -> Result<(), String> {
    let mut config = Config::load().map_err(|e| format!("Failed to load config: {}", e))?;
    config.set(key, value.clone()).map_err(|e| e.to_string())?;
    config
        .save()
        .map_err(|e| format!("Failed to save config: {}", e))?;
    logger::success(&format!("Set {} = {}", key, value));
    Ok(())
}

fn config_path(new_path: Option<String>) -> Result<(), String> {
    let config_path = Config::path();
    logger::debug(&format!("Reading config from: {}", config_path.display()));
    let pointer_path = default_config_dir().join(CONFIG_POINTER_FILE);

    match new_path {
        Some(p) => {
            if let Some(parent) = pointer_path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to set config path: {}", e))?;
            }
            fs::write(&pointer_path, p.as_bytes())
                .map_err(|e| format!("Failed to set config path: {}", e))?;
            logger::success(&format!("Config path set to {}", p));
        }
        None => {
            println!("{}", config_path.display());

            if let Ok(contents) = fs::read_to_string(&pointer_path) {
                let trimmed = contents.trim();
                if !trimmed.is_empty() {
                    println!("{} {}", "overridden-by".cyan(), trimmed);
                }
            }
        }
    }
    Ok(())
}
