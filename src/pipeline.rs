use anyhow::{Context, Result};
use log::{info, warn};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{build_classifier, Config};
use crate::continent::{
    CacheConfig, Classifier, ContinentResolver, RegionalDataset, ResolutionCache, ResolutionReport,
};
use crate::dataset::load_dataset;

/// Every name that reached the classifier failed, so the tagged dataset is empty
/// for reasons unrelated to the data.
#[derive(Error, Debug)]
#[error("continent lookups failed for all {failures} names that needed the classifier; check the network or switch to the builtin classifier")]
pub struct ClassifierUnreachable {
    pub failures: usize,
}

/// Pick the input CSV: `--dataset` wins over the config's `dataset`.
pub fn dataset_path(cli: Option<&Path>, config: &Config) -> Result<PathBuf> {
    match (cli, config.dataset.as_deref()) {
        (Some(path), _) => Ok(path.to_path_buf()),
        (None, Some(path)) => Ok(PathBuf::from(path)),
        (None, None) => anyhow::bail!(
            "No dataset given. Pass --dataset <CSV> or set `dataset` in the config file"
        ),
    }
}

/// Resolver wired from config: override table, classifier, timeout and cache.
pub fn build_resolver(
    config: &Config,
    cache_config: &CacheConfig,
) -> Result<ContinentResolver<Classifier>> {
    let classifier = build_classifier(&config.classifier)?;
    let timeout = config.classifier.timeout()?;

    info!(
        "Classifier: {} (timeout {}, cache {})",
        config.classifier.endpoint_label(),
        humantime::format_duration(timeout),
        if cache_config.enabled {
            "enabled"
        } else {
            "disabled (--no-cache)"
        }
    );

    Ok(ContinentResolver::new(&config.overrides, classifier)
        .with_cache(ResolutionCache::from_config(cache_config))
        .with_timeout(timeout)
        .with_concurrency(config.classifier.concurrency))
}

/// Load a CSV snapshot and tag every row with its continent.
///
/// Unresolved names are logged and their rows dropped. Fails only when the file
/// cannot be read or when no name resolved because every classifier lookup failed.
pub async fn load_and_tag(
    path: &Path,
    resolver: &ContinentResolver<Classifier>,
) -> Result<(RegionalDataset, ResolutionReport)> {
    let dataset = load_dataset(path)?;
    info!(
        "Loaded {} rows ({} countries) from {}",
        dataset.len(),
        dataset.countries().len(),
        path.display()
    );

    let (tagged, report) = resolver.tag(&dataset).await;

    for unresolved in &report.unresolved {
        warn!("Dropping rows: {}", unresolved);
    }

    if report.countries_resolved == 0 && report.lookup_failures() > 0 {
        return Err(ClassifierUnreachable {
            failures: report.lookup_failures(),
        })
        .context(format!("Failed to tag {}", path.display()));
    }

    Ok((tagged, report))
}
