mod init;
mod schema;

pub use init::{render_config, run_init_wizard, write_config};
pub use schema::{ClassifierConfig, ClassifierKind, Config};

use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::PathBuf;

use crate::continent::{BuiltinClassifier, Classifier, HttpClassifier};

/// Get the config directory path (~/.config/wealth-atlas/)
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".config").join("wealth-atlas"))
        .unwrap_or_else(|| PathBuf::from(".wealth-atlas"))
}

/// Get the default config file path (~/.config/wealth-atlas/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses default path (~/.config/wealth-atlas/config.yaml)
///
/// A missing file at the default path yields the built-in defaults. A path given
/// explicitly must exist.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let explicit = path.is_some();
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        debug!(
            "No config at {}, using defaults",
            config_path.display()
        );
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!(
            "Failed to parse config: invalid YAML in {}",
            config_path.display()
        )
    })?;

    debug!("Loaded config from {}", config_path.display());
    Ok(config)
}

/// Build the fallback classifier described by the config
pub fn build_classifier(config: &ClassifierConfig) -> Result<Classifier> {
    match config.kind {
        ClassifierKind::Builtin => Ok(Classifier::Builtin(BuiltinClassifier::new())),
        ClassifierKind::Http => {
            let client = HttpClassifier::new(&config.endpoint, config.timeout()?, config.retries)?;
            Ok(Classifier::Http(client))
        }
    }
}
