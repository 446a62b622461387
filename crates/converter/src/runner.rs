//! Drives one conversion run from upload to terminal outcome.
//!
//! The loop is strictly sequential: each iteration fully awaits its
//! poll round trip and the fixed-interval wait before the next one is
//! issued, so at most one request per job is ever in flight. All
//! classification decisions are delegated to [`revox_core::run::advance`];
//! this module owns only the I/O, the waits, and the event emission.

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use revox_core::progress;
use revox_core::run::{advance, PollPolicy, PollReply, PollStep, RunPhase};

use crate::api::ConverterApiError;
use crate::events::RunEvent;
use crate::service::ConversionService;

/// Input for one run: the payload plus the target selector.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// Original filename of the uploaded audio.
    pub file_name: String,
    /// The audio bytes to convert.
    pub bytes: Vec<u8>,
    /// Artist model to convert with.
    pub artist: String,
}

/// A run that polled its way to a terminal phase.
#[derive(Debug)]
pub struct FinishedRun {
    /// The job this run belonged to.
    pub job_id: String,
    /// The terminal phase. `Ready` carries the artifact.
    pub phase: RunPhase,
}

/// Every way a run can end.
#[derive(Debug)]
pub enum RunOutcome {
    /// The polling loop reached a terminal phase.
    Finished(FinishedRun),
    /// The upload was rejected; polling never began.
    SubmissionFailed(ConverterApiError),
    /// The cancellation token fired mid-run.
    Cancelled,
}

/// Submit a conversion job and poll it to completion.
///
/// Emits [`RunEvent`]s on `event_tx` as the run progresses. The
/// cancellation token is honored at both suspension points: the
/// in-flight poll request and the inter-attempt wait.
pub async fn run_conversion<S>(
    service: &S,
    request: ConversionRequest,
    policy: &PollPolicy,
    event_tx: &broadcast::Sender<RunEvent>,
    cancel: &CancellationToken,
) -> RunOutcome
where
    S: ConversionService + Sync,
{
    let job_id = match service
        .submit_conversion(&request.file_name, request.bytes, &request.artist)
        .await
    {
        Ok(response) => response.job_id,
        Err(e) => {
            tracing::warn!(error = %e, "Conversion submission failed");
            let _ = event_tx.send(RunEvent::SubmissionFailed {
                error: e.to_string(),
            });
            return RunOutcome::SubmissionFailed(e);
        }
    };

    tracing::info!(
        job_id = %job_id,
        artist = %request.artist,
        file = %request.file_name,
        "Conversion job submitted",
    );
    let _ = event_tx.send(RunEvent::RunStarted {
        job_id: job_id.clone(),
    });

    let mut attempt = 1u32;
    loop {
        let reply = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(job_id = %job_id, attempt, "Run cancelled");
                return RunOutcome::Cancelled;
            }
            result = service.fetch_result(&job_id) => match result {
                Ok(reply) => reply,
                Err(e) => {
                    // Transport trouble is not a terminal outcome; the
                    // attempt budget bounds how long we keep waiting.
                    tracing::warn!(job_id = %job_id, attempt, error = %e, "Poll request failed");
                    PollReply::Unavailable { http_status: None }
                }
            }
        };

        match advance(attempt, policy, reply) {
            PollStep::Done { phase } => {
                emit_terminal(event_tx, &job_id, attempt, &phase);
                return RunOutcome::Finished(FinishedRun { job_id, phase });
            }
            PollStep::Continue { phase, note } => {
                let percent = progress::percent(&RunPhase::Polling { attempt }, policy);
                tracing::debug!(job_id = %job_id, attempt, percent, ?note, "Result not ready");
                let _ = event_tx.send(RunEvent::Waiting {
                    job_id: job_id.clone(),
                    attempt,
                    percent,
                    note,
                });

                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::info!(job_id = %job_id, attempt, "Run cancelled");
                        return RunOutcome::Cancelled;
                    }
                    _ = tokio::time::sleep(policy.interval) => {}
                }

                if let RunPhase::Polling { attempt: next } = phase {
                    attempt = next;
                }
            }
        }
    }
}

/// Log the terminal transition and broadcast the matching event.
fn emit_terminal(
    event_tx: &broadcast::Sender<RunEvent>,
    job_id: &str,
    attempt: u32,
    phase: &RunPhase,
) {
    match phase {
        RunPhase::Ready { artifact } => {
            tracing::info!(
                job_id = %job_id,
                attempt,
                content_type = %artifact.content_type,
                bytes = artifact.bytes.len(),
                "Conversion finished",
            );
            let _ = event_tx.send(RunEvent::Completed {
                job_id: job_id.to_string(),
            });
        }
        RunPhase::Failed { error } => {
            tracing::warn!(
                job_id = %job_id,
                attempt,
                error = error.as_deref().unwrap_or("unknown"),
                "Conversion failed",
            );
            let _ = event_tx.send(RunEvent::Failed {
                job_id: job_id.to_string(),
                error: error.clone(),
            });
        }
        RunPhase::TimedOut => {
            tracing::warn!(job_id = %job_id, attempt, "Conversion timed out");
            let _ = event_tx.send(RunEvent::TimedOut {
                job_id: job_id.to_string(),
            });
        }
        RunPhase::Inconsistent => {
            tracing::warn!(
                job_id = %job_id,
                attempt,
                "Job reported complete but delivered no audio",
            );
            let _ = event_tx.send(RunEvent::Inconsistent {
                job_id: job_id.to_string(),
            });
        }
        // advance() only ever finishes on a terminal phase.
        RunPhase::Submitted | RunPhase::Polling { .. } => {}
    }
}
