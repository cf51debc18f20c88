//! External job-submission API clients.

/// HTTP client for a real job service.
pub mod http;
/// Local stand-in used when no endpoint is configured.
pub mod simulated;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::{config::Config, jobs::JobConfiguration, submission::SubmissionError};

/// Accepts a job configuration and yields a playable media URL.
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Submit one request and wait for its result.
    async fn submit(&self, request: &JobConfiguration) -> Result<String, SubmissionError>;

    /// Short description for logs and the status bar.
    fn describe(&self) -> String;
}

/// Build the API client selected by the config.
///
/// An empty endpoint selects the simulated API; a malformed one is an error.
pub fn from_config(http: &Client, cfg: &Config) -> Result<Box<dyn JobApi>> {
    match cfg.api.endpoint() {
        Some(endpoint) => {
            let url = Url::parse(endpoint)
                .with_context(|| format!("invalid job API endpoint: {endpoint}"))?;
            Ok(Box::new(http::HttpJobApi::new(
                http.clone(),
                url,
                cfg.api.api_key().map(str::to_string),
            )))
        }
        None => Ok(Box::new(simulated::SimulatedJobApi::new(&cfg.simulation))),
    }
}
