use futures::stream::{self, StreamExt};
use log::{debug, info};
use std::collections::HashMap;
use std::time::Duration;

use super::cache::{Resolution, ResolutionCache};
use super::classifier::{Classification, ContinentClassifier};
use super::label::ContinentLabel;
use super::overrides::{OverrideIndex, OverrideTable};
use super::tagging::{RegionalDataset, ResolutionReport, TaggedRow};
use crate::dataset::Dataset;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Maps country names to one of the seven continent labels.
///
/// Priority: override table (exact, case-sensitive), then the classifier, whose
/// answer is normalized by [`Classification::into_label`]. Each classifier call is
/// bounded by a timeout; running out of time counts as a lookup failure.
pub struct ContinentResolver<C> {
    overrides: OverrideIndex,
    classifier: C,
    cache: ResolutionCache,
    timeout: Duration,
    concurrency: usize,
}

impl<C: ContinentClassifier> ContinentResolver<C> {
    pub fn new(overrides: &OverrideTable, classifier: C) -> Self {
        Self {
            overrides: overrides.index(),
            classifier,
            cache: ResolutionCache::in_memory(),
            timeout: DEFAULT_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_cache(mut self, cache: ResolutionCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// Resolve one country name.
    pub async fn resolve(&self, country: &str) -> Resolution {
        if let Some(label) = self.overrides.lookup(country) {
            return Ok(label);
        }
        if let Some(cached) = self.cache.get(country) {
            return cached;
        }

        let resolution = self
            .classify(country)
            .await
            .into_label(country, &self.overrides);
        self.cache.insert(country, resolution.clone());
        resolution
    }

    async fn classify(&self, country: &str) -> Classification {
        let kind = self.classifier.kind();
        if let Some(persisted) = self.cache.load_classification(kind, country) {
            return persisted;
        }

        let classification =
            match tokio::time::timeout(self.timeout, self.classifier.classify(country)).await {
                Ok(classification) => classification,
                Err(_) => Classification::Failed(format!(
                    "timed out after {}",
                    humantime::format_duration(self.timeout)
                )),
            };

        self.cache.store_classification(kind, country, &classification);
        classification
    }

    /// Tag every row of a snapshot with its continent, dropping rows that do not
    /// resolve.
    ///
    /// Distinct names are resolved concurrently, each at most once per snapshot.
    pub async fn tag(&self, dataset: &Dataset) -> (RegionalDataset, ResolutionReport) {
        self.cache.begin_snapshot(dataset.fingerprint());

        let names = dataset.countries();
        debug!("Resolving {} distinct country names", names.len());

        let resolutions: HashMap<&str, Resolution> = stream::iter(names)
            .map(|name| async move { (name, self.resolve(name).await) })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut report = ResolutionReport {
            rows_in: dataset.len(),
            ..ResolutionReport::default()
        };
        let mut labels: HashMap<&str, ContinentLabel> = HashMap::new();
        for (name, resolution) in resolutions {
            match resolution {
                Ok(label) => {
                    labels.insert(name, label);
                }
                Err(unresolved) => report.unresolved.push(unresolved),
            }
        }
        report.countries_resolved = labels.len();
        report
            .unresolved
            .sort_by(|a, b| a.country().cmp(b.country()));

        let rows: Vec<TaggedRow> = dataset
            .rows()
            .iter()
            .filter_map(|row| {
                labels.get(row.country.as_str()).map(|&region| TaggedRow {
                    row: row.clone(),
                    region,
                })
            })
            .collect();
        report.rows_kept = rows.len();

        info!(
            "Tagged {} of {} rows ({} countries resolved, {} unresolved)",
            report.rows_kept,
            report.rows_in,
            report.countries_resolved,
            report.unresolved.len()
        );

        (RegionalDataset::from_tagged(rows), report)
    }
}
