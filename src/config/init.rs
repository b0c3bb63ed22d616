use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::config::{get_config_path, ClassifierConfig, ClassifierKind, Config};
use crate::continent::http::DEFAULT_ENDPOINT;
use crate::dataset::Indicator;
use crate::scoring::{validate_scoring, ScoringConfig, Weights};

const HEADER: &str = "\
# wealth-atlas configuration
#
# overrides:   manual country -> continent assignments, checked before the classifier
# classifier:  fallback lookup (builtin = offline UN regions, http = REST Countries)
# scoring:     progress score weights, must be non-negative and sum to 1
";

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout().flush().context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Serialize a config with a short explanatory header.
pub fn render_config(config: &Config) -> Result<String> {
    let yaml = serde_saphyr::to_string(config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
    Ok(format!("{}\n{}", HEADER, yaml))
}

/// Write a config file atomically, creating parent directories as needed.
pub fn write_config(path: &Path, config: &Config) -> Result<()> {
    let rendered = render_config(config)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(rendered.as_bytes())
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    file.commit()
        .with_context(|| format!("Failed to save config to {}", path.display()))?;

    Ok(())
}

fn prompt_classifier() -> Result<ClassifierConfig> {
    let mut classifier = ClassifierConfig::default();
    println!("Countries missing from the override table are looked up by a classifier.");
    println!("  builtin: offline UN region table (no network)");
    println!("  http:    REST Countries web service");

    classifier.kind = loop {
        match prompt_with_default("Classifier", "builtin")?.as_str() {
            "builtin" => break ClassifierKind::Builtin,
            "http" => break ClassifierKind::Http,
            other => println!("  Invalid: '{}'. Enter builtin or http.", other),
        }
    };

    if classifier.kind == ClassifierKind::Http {
        classifier.endpoint = prompt_with_default("Endpoint", DEFAULT_ENDPOINT)?;
        classifier.timeout = loop {
            let input = prompt_with_default("Per-lookup timeout", &classifier.timeout)?;
            match humantime::parse_duration(&input) {
                Ok(_) => break input,
                Err(e) => println!("  Invalid: {}. Try again.", e),
            }
        };
    }

    Ok(classifier)
}

fn prompt_weights() -> Result<Weights> {
    let defaults = Weights::default();
    loop {
        let mut weights = defaults;
        for indicator in Indicator::ALL {
            let value: f64 = loop {
                let input = prompt_with_default(
                    &format!("Weight for {}", indicator.label()),
                    &defaults.get(indicator).to_string(),
                )?;
                match input.parse::<f64>() {
                    Ok(v) if v >= 0.0 => break v,
                    _ => println!("  Invalid: must be a non-negative number. Try again."),
                }
            };
            match indicator {
                Indicator::GdpPerCapita => weights.gdp_per_capita = value,
                Indicator::LifeExpectancy => weights.life_expectancy = value,
                Indicator::HealthExpPerCapita => weights.health_exp_per_capita = value,
                Indicator::ChildMortality => weights.child_mortality = value,
            }
        }

        match validate_scoring(&ScoringConfig { weights }) {
            Ok(()) => return Ok(weights),
            Err(errors) => {
                for error in errors {
                    println!("  {}", error);
                }
                println!("  Let's try the weights again.");
            }
        }
    }
}

/// Create a config file.
///
/// With `accept_defaults` nothing is asked and the default config is written to
/// `default_path` (or the standard location), refusing to overwrite an existing
/// file. Otherwise runs an interactive wizard.
pub fn run_init_wizard(default_path: Option<PathBuf>, accept_defaults: bool) -> Result<()> {
    let default_config_path = default_path.unwrap_or_else(get_config_path);

    if accept_defaults {
        if default_config_path.exists() {
            anyhow::bail!(
                "Config already exists at {}",
                default_config_path.display()
            );
        }
        write_config(&default_config_path, &Config::default())?;
        println!("Config written to {}", default_config_path.display());
        return Ok(());
    }

    println!();
    println!("wealth-atlas configuration");
    println!("==========================");
    println!();

    // 1. Dataset
    let dataset = prompt("Default dataset CSV (leave empty to always pass --dataset): ")?;
    let dataset = (!dataset.is_empty()).then_some(dataset);

    // 2. Classifier
    println!();
    let classifier = prompt_classifier()?;

    // 3. Scoring
    println!();
    let weights = if prompt_yes_no("Customize score weights? (n accepts 0.4/0.3/0.2/0.1)", false)? {
        prompt_weights()?
    } else {
        Weights::default()
    };

    // 4. Config path
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    // 5. Write config
    let config = Config {
        dataset,
        classifier,
        scoring: ScoringConfig { weights },
        ..Config::default()
    };
    write_config(&config_path, &config)?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Edit the overrides section to pin ambiguous countries to a continent.");

    Ok(())
}
