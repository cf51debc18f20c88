//! Job API over HTTP.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use super::JobApi;
use crate::{jobs::JobConfiguration, submission::SubmissionError};

/// Longest error body kept in a `Rejected` message.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Posts the job configuration as JSON to a single endpoint.
pub struct HttpJobApi {
    http: Client,
    endpoint: Url,
    api_key: Option<String>,
}

/// Success body returned by the job service.
#[derive(Debug, Deserialize)]
struct JobResponse {
    #[serde(rename = "videoUrl", alias = "video_url", alias = "url")]
    video_url: String,
}

impl HttpJobApi {
    pub fn new(http: Client, endpoint: Url, api_key: Option<String>) -> Self {
        Self {
            http,
            endpoint,
            api_key,
        }
    }
}

#[async_trait]
impl JobApi for HttpJobApi {
    async fn submit(&self, request: &JobConfiguration) -> Result<String, SubmissionError> {
        let mut req = self.http.post(self.endpoint.clone()).json(request);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;
        tracing::debug!("job API answered {status} ({} bytes)", body.len());

        parse_response(status, &body)
    }

    fn describe(&self) -> String {
        self.endpoint.to_string()
    }
}

/// Map a status code and body to the video URL or a typed failure.
fn parse_response(status: u16, body: &str) -> Result<String, SubmissionError> {
    if !(200..300).contains(&status) {
        return Err(SubmissionError::Rejected {
            status,
            message: body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect(),
        });
    }

    let parsed: JobResponse = serde_json::from_str(body)
        .map_err(|e| SubmissionError::MalformedResponse(e.to_string()))?;
    let url = parsed.video_url.trim();
    if url.is_empty() {
        return Err(SubmissionError::EmptyUrl);
    }
    Ok(url.to_string())
}
