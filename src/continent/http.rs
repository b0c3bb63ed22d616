use anyhow::{anyhow, Context, Result};
use log::debug;
use serde::Deserialize;
use std::time::Duration;
use tokio_retry::{strategy::ExponentialBackoff, Retry};

use super::classifier::{Classification, ContinentClassifier};

pub const DEFAULT_ENDPOINT: &str = "https://restcountries.com/v3.1";

/// Only the field we ask the service for.
#[derive(Debug, Deserialize)]
struct CountryRecord {
    region: String,
}

/// Classifier backed by a REST Countries compatible service
/// (`GET {endpoint}/name/{country}?fullText=true&fields=region`).
///
/// A 404 means the service does not know the name. Transport errors and other
/// non-success statuses are retried with exponential backoff and then reported as
/// a lookup failure.
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    client: reqwest::Client,
    endpoint: String,
    retries: usize,
}

impl HttpClassifier {
    pub fn new(endpoint: &str, timeout: Duration, retries: usize) -> Result<Self> {
        crate::install_crypto_provider();

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("wealth-atlas/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            retries,
        })
    }

    fn url_for(&self, country: &str) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.endpoint)
            .with_context(|| format!("Invalid classifier endpoint '{}'", self.endpoint))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Classifier endpoint '{}' cannot take a path", self.endpoint))?
            .pop_if_empty()
            .push("name")
            .push(country);
        url.query_pairs_mut()
            .append_pair("fullText", "true")
            .append_pair("fields", "region");
        Ok(url)
    }

    async fn fetch_once(&self, url: &reqwest::Url) -> Result<Vec<CountryRecord>> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .context("Classifier request failed")?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            anyhow::bail!("Classifier returned HTTP {}", response.status());
        }

        response
            .json::<Vec<CountryRecord>>()
            .await
            .context("Failed to parse classifier response")
    }

    async fn fetch_regions(&self, country: &str) -> Result<Vec<String>> {
        let url = self.url_for(country)?;

        let retry_strategy = ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(2))
            .take(self.retries);

        let records = Retry::spawn(retry_strategy, || self.fetch_once(&url)).await?;

        // Keep service order, drop repeats
        let mut regions: Vec<String> = Vec::new();
        for record in records {
            if !regions.contains(&record.region) {
                regions.push(record.region);
            }
        }
        Ok(regions)
    }
}

impl ContinentClassifier for HttpClassifier {
    fn kind(&self) -> &'static str {
        "http"
    }

    async fn classify(&self, country: &str) -> Classification {
        match self.fetch_regions(country).await {
            Ok(mut regions) if regions.len() == 1 => {
                Classification::Single(regions.remove(0))
            }
            Ok(regions) => Classification::Candidates(regions),
            Err(e) => {
                debug!("Classifier lookup for '{}' failed: {:#}", country, e);
                Classification::Failed(format!("{:#}", e))
            }
        }
    }
}
