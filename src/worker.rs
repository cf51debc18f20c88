//! Background worker that owns the job API and runs submissions.

use crate::{
    api::{self, JobApi},
    config::Config,
    submission::{PendingSubmission, SubmissionError},
};
use reqwest::Client;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Commands sent from the UI to the worker.
#[derive(Debug)]
pub enum WorkerCmd {
    /// Send one accepted job request to the API.
    Submit(PendingSubmission),
    /// Apply updated settings (rebuilds the API client).
    SaveSettings(Config),
}

/// Events emitted by the worker for UI updates.
#[derive(Clone, Debug)]
pub enum WorkerEvent {
    /// Outcome of a submission, keyed by its id.
    SubmissionFinished {
        id: Uuid,
        result: Result<String, SubmissionError>,
    },
    /// Informational log message.
    Log(String),
    /// User-visible error message.
    Error(String),
}

/// Main worker loop: handle commands one at a time until the UI hangs up.
pub async fn run(mut rx: mpsc::Receiver<WorkerCmd>, tx: mpsc::Sender<WorkerEvent>, cfg: Config) {
    // Shared HTTP client for every API client built from settings.
    let http = Client::new();
    let mut client = build_api(&http, &cfg, &tx).await;
    tracing::info!("worker started ({})", client.describe());

    while let Some(cmd) = rx.recv().await {
        match cmd {
            WorkerCmd::SaveSettings(new_cfg) => match api::from_config(&http, &new_cfg) {
                Ok(new_api) => {
                    client = new_api;
                    tracing::info!("settings updated ({})", client.describe());
                    let _ = tx
                        .send(WorkerEvent::Log(format!("job API: {}", client.describe())))
                        .await;
                }
                Err(e) => {
                    // Keep the previous client so the form stays usable.
                    tracing::error!("settings rejected: {e:#}");
                    let _ = tx.send(WorkerEvent::Error(format!("{e:#}"))).await;
                }
            },

            WorkerCmd::Submit(pending) => {
                let id = pending.id;
                tracing::info!("submit job start: {id}");
                let _ = tx
                    .send(WorkerEvent::Log(format!(
                        "[{}] submitted {}",
                        pending.submitted_at.format("%H:%M:%S"),
                        short_id(id)
                    )))
                    .await;

                let result = client.submit(&pending.request).await;
                match &result {
                    Ok(url) => tracing::info!("submit job done: {id}: {url}"),
                    Err(e) => tracing::error!("submit job failed: {id}: {e}"),
                }
                let _ = tx
                    .send(WorkerEvent::SubmissionFinished { id, result })
                    .await;
            }
        }
    }
    tracing::info!("worker stopped");
}

/// Build the initial client, falling back to the simulated API on bad settings.
async fn build_api(
    http: &Client,
    cfg: &Config,
    tx: &mpsc::Sender<WorkerEvent>,
) -> Box<dyn JobApi> {
    match api::from_config(http, cfg) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("job API init failed: {e:#}");
            let _ = tx
                .send(WorkerEvent::Error(format!("{e:#}; using simulated API")))
                .await;
            Box::new(api::simulated::SimulatedJobApi::new(&cfg.simulation))
        }
    }
}

/// First block of a UUID, enough to tell submissions apart in the log.
pub fn short_id(id: Uuid) -> String {
    id.simple().to_string().chars().take(8).collect()
}
