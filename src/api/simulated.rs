//! Stand-in job API: waits, then returns a fixed video URL.

use async_trait::async_trait;
use std::time::Duration;

use super::JobApi;
use crate::{config::SimulationCfg, jobs::JobConfiguration, submission::SubmissionError};

pub struct SimulatedJobApi {
    delay: Duration,
    video_url: String,
    fail: bool,
}

impl SimulatedJobApi {
    pub fn new(cfg: &SimulationCfg) -> Self {
        Self {
            delay: Duration::from_millis(cfg.delay_ms),
            video_url: cfg.video_url.clone(),
            fail: cfg.fail,
        }
    }
}

#[async_trait]
impl JobApi for SimulatedJobApi {
    async fn submit(&self, request: &JobConfiguration) -> Result<String, SubmissionError> {
        tracing::info!(
            "simulating generation ({} chars, {}s) for {:?}",
            request.script.chars().count(),
            request.duration,
            self.delay
        );
        tokio::time::sleep(self.delay).await;
        if self.fail {
            Err(SubmissionError::Simulated)
        } else {
            Ok(self.video_url.clone())
        }
    }

    fn describe(&self) -> String {
        format!("simulated ({} ms)", self.delay.as_millis())
    }
}
