//! Submission controller: idle → submitting → succeeded / failed.

use chrono::{DateTime, Local};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    form::{FormState, ValidationError},
    jobs::JobConfiguration,
};

/// Message shown to the user for any failed generation.
pub const FAILURE_MESSAGE: &str = "There was an error generating your video. Please try again.";

/// Where the current submission stands.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    /// Generation finished; holds the playable media URL.
    Succeeded(String),
    /// Generation failed; holds a user-facing message.
    Failed(String),
}

impl SubmissionState {
    pub fn label(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "Idle",
            SubmissionState::Submitting => "Submitting",
            SubmissionState::Succeeded(_) => "Succeeded",
            SubmissionState::Failed(_) => "Failed",
        }
    }
}

/// Failure reported by the external job API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmissionError {
    #[error("job API request failed: {0}")]
    Transport(String),
    #[error("job API rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("job API returned an unexpected response: {0}")]
    MalformedResponse(String),
    #[error("job API returned an empty video URL")]
    EmptyUrl,
    #[error("simulated generation failure")]
    Simulated,
}

impl SubmissionError {
    /// Text for the failure notification. Details only go to the log.
    pub fn user_message(&self) -> String {
        FAILURE_MESSAGE.to_string()
    }
}

/// A request accepted by the controller and waiting for the API.
#[derive(Clone, Debug)]
pub struct PendingSubmission {
    /// Ties the eventual result back to this request.
    pub id: Uuid,
    pub submitted_at: DateTime<Local>,
    /// Normalized snapshot taken at submit time.
    pub request: JobConfiguration,
}

impl PendingSubmission {
    fn new(request: JobConfiguration) -> Self {
        Self {
            id: Uuid::new_v4(),
            submitted_at: Local::now(),
            request,
        }
    }
}

/// Sequences submissions so that at most one request is outstanding.
#[derive(Debug, Default)]
pub struct SubmissionController {
    state: SubmissionState,
    in_flight: Option<Uuid>,
}

impl SubmissionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// True while a request is outstanding; submitting is disabled.
    pub fn is_busy(&self) -> bool {
        self.state == SubmissionState::Submitting
    }

    pub fn result_url(&self) -> Option<&str> {
        match &self.state {
            SubmissionState::Succeeded(url) => Some(url),
            _ => None,
        }
    }

    /// Start a submission from the current draft.
    ///
    /// Returns `Ok(None)` when a request is already in flight (no-op) and
    /// `Err` when the draft has violations; in both cases the state is
    /// unchanged. Otherwise moves to `Submitting` and hands back the one
    /// request the caller must send.
    pub fn submit(
        &mut self,
        form: &FormState,
    ) -> Result<Option<PendingSubmission>, ValidationError> {
        if self.is_busy() {
            tracing::debug!("submit ignored: request already in flight");
            return Ok(None);
        }

        let violations = form.validate();
        if !violations.is_empty() {
            let err = ValidationError::new(violations);
            tracing::warn!("submit blocked: {err}");
            return Err(err);
        }

        let pending = PendingSubmission::new(form.to_request());
        tracing::info!("submission {} started", pending.id);
        self.in_flight = Some(pending.id);
        self.state = SubmissionState::Submitting;
        Ok(Some(pending))
    }

    /// Apply the API outcome for submission `id`.
    ///
    /// Results for anything but the in-flight request are ignored and
    /// `false` is returned.
    pub fn resolve(&mut self, id: Uuid, result: Result<String, SubmissionError>) -> bool {
        if self.in_flight != Some(id) {
            tracing::warn!("ignoring result for stale submission {id}");
            return false;
        }
        self.in_flight = None;

        let result = result.and_then(|url| {
            let url = url.trim();
            if url.is_empty() {
                Err(SubmissionError::EmptyUrl)
            } else {
                Ok(url.to_string())
            }
        });

        self.state = match result {
            Ok(url) => {
                tracing::info!("submission {id} succeeded: {url}");
                SubmissionState::Succeeded(url)
            }
            Err(e) => {
                tracing::error!("submission {id} failed: {e}");
                SubmissionState::Failed(e.user_message())
            }
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FieldId, FieldValue, Violation};

    fn form_with_script(script: &str) -> FormState {
        let mut form = FormState::new();
        form.update(FieldId::Script, FieldValue::Text(script.into()))
            .unwrap();
        form
    }

    #[test]
    fn test_valid_submit_moves_to_submitting() {
        let form = form_with_script("Team builds from the back");
        let mut ctl = SubmissionController::new();
        assert_eq!(ctl.state(), &SubmissionState::Idle);

        let pending = ctl.submit(&form).unwrap().expect("request issued");
        assert_eq!(ctl.state(), &SubmissionState::Submitting);
        assert!(ctl.is_busy());
        assert_eq!(pending.request, form.to_request());
    }

    #[test]
    fn test_empty_script_stays_idle() {
        let form = FormState::new();
        let mut ctl = SubmissionController::new();
        let err = ctl.submit(&form).unwrap_err();
        assert!(err.violations.contains(&Violation::ScriptRequired));
        assert_eq!(ctl.state(), &SubmissionState::Idle);
    }

    #[test]
    fn test_duplicate_submit_is_a_noop() {
        let form = form_with_script("High press triggers");
        let mut ctl = SubmissionController::new();
        let first = ctl.submit(&form).unwrap().unwrap();
        assert!(ctl.submit(&form).unwrap().is_none());
        assert_eq!(ctl.state(), &SubmissionState::Submitting);

        // The original request still resolves normally.
        assert!(ctl.resolve(first.id, Ok("https://cdn.example/v.mp4".into())));
    }

    #[test]
    fn test_success_stores_url() {
        let form = form_with_script("Counter after turnover");
        let mut ctl = SubmissionController::new();
        let p = ctl.submit(&form).unwrap().unwrap();
        assert!(ctl.resolve(p.id, Ok(" https://cdn.example/v.mp4 ".into())));
        assert_eq!(
            ctl.state(),
            &SubmissionState::Succeeded("https://cdn.example/v.mp4".into())
        );
        assert_eq!(ctl.result_url(), Some("https://cdn.example/v.mp4"));
        assert!(!ctl.is_busy());
    }

    #[test]
    fn test_failure_stores_message() {
        let form = form_with_script("Low block");
        let mut ctl = SubmissionController::new();
        let p = ctl.submit(&form).unwrap().unwrap();
        let err = SubmissionError::Rejected {
            status: 503,
            message: "renderer offline".into(),
        };
        assert!(ctl.resolve(p.id, Err(err)));
        match ctl.state() {
            SubmissionState::Failed(msg) => assert_eq!(msg, FAILURE_MESSAGE),
            other => panic!("unexpected state {other:?}"),
        }
        assert_eq!(ctl.result_url(), None);
    }

    #[test]
    fn test_empty_url_is_a_failure() {
        let form = form_with_script("Build-up");
        let mut ctl = SubmissionController::new();
        let p = ctl.submit(&form).unwrap().unwrap();
        ctl.resolve(p.id, Ok("   ".into()));
        assert!(matches!(ctl.state(), SubmissionState::Failed(_)));
    }

    #[test]
    fn test_stale_result_is_ignored() {
        let form = form_with_script("Build-up");
        let mut ctl = SubmissionController::new();
        assert!(!ctl.resolve(Uuid::new_v4(), Ok("https://x.example/a.mp4".into())));
        assert_eq!(ctl.state(), &SubmissionState::Idle);

        let p = ctl.submit(&form).unwrap().unwrap();
        assert!(!ctl.resolve(Uuid::new_v4(), Ok("https://x.example/a.mp4".into())));
        assert_eq!(ctl.state(), &SubmissionState::Submitting);

        assert!(ctl.resolve(p.id, Ok("https://x.example/b.mp4".into())));
        // A second result for the same id is dropped.
        assert!(!ctl.resolve(p.id, Err(SubmissionError::Simulated)));
        assert_eq!(ctl.result_url(), Some("https://x.example/b.mp4"));
    }

    #[test]
    fn test_resubmit_after_failure_and_success() {
        let form = form_with_script("Wide overloads");
        let mut ctl = SubmissionController::new();

        let p = ctl.submit(&form).unwrap().unwrap();
        ctl.resolve(p.id, Err(SubmissionError::Transport("connection reset".into())));
        let p2 = ctl.submit(&form).unwrap().expect("retry allowed after failure");
        assert_ne!(p.id, p2.id);
        assert_eq!(ctl.state(), &SubmissionState::Submitting);

        ctl.resolve(p2.id, Ok("https://x.example/c.mp4".into()));
        assert!(ctl.submit(&form).unwrap().is_some());
        assert_eq!(ctl.state(), &SubmissionState::Submitting);
    }

    #[test]
    fn test_invalid_resubmit_keeps_previous_result() {
        let mut form = form_with_script("Third-man runs");
        let mut ctl = SubmissionController::new();
        let p = ctl.submit(&form).unwrap().unwrap();
        ctl.resolve(p.id, Ok("https://x.example/d.mp4".into()));

        form.update(FieldId::Script, FieldValue::Text(String::new()))
            .unwrap();
        assert!(ctl.submit(&form).is_err());
        assert_eq!(ctl.result_url(), Some("https://x.example/d.mp4"));
    }
}
