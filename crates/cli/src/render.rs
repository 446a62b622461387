//! Pure projection of run events and terminal phases onto status
//! lines. Keeping this side-effect free means the orchestration logic
//! never knows how (or whether) anything is displayed.

use revox_converter::events::RunEvent;
use revox_core::run::{RunPhase, WaitNote};

/// One status line for a lifecycle event.
pub fn describe_event(event: &RunEvent) -> String {
    match event {
        RunEvent::RunStarted { job_id } => {
            format!("Processing job: {job_id}. Please wait...")
        }
        RunEvent::Waiting {
            attempt,
            percent,
            note,
            ..
        } => {
            let line = match note {
                WaitNote::StillProcessing => format!("Still processing (attempt {attempt})..."),
                WaitNote::UnknownStatus(status) => {
                    format!("Unknown job status: {status}. Retrying...")
                }
                WaitNote::ResultUnavailable { .. } => {
                    format!("Waiting for result (attempt {attempt})...")
                }
            };
            format!("[{percent:>3}%] {line}")
        }
        RunEvent::Completed { .. } => "Conversion successful!".to_string(),
        RunEvent::Failed { error, .. } => failure_line(error.as_deref()),
        RunEvent::TimedOut { .. } => timeout_line(),
        RunEvent::Inconsistent { .. } => inconsistency_line(),
        RunEvent::SubmissionFailed { error } => format!("Error: {error}"),
    }
}

/// The single terminal message for a finished run.
pub fn summary(phase: &RunPhase) -> String {
    match phase {
        RunPhase::Ready { .. } => "Conversion successful!".to_string(),
        RunPhase::Failed { error } => failure_line(error.as_deref()),
        RunPhase::TimedOut => timeout_line(),
        RunPhase::Inconsistent => inconsistency_line(),
        RunPhase::Submitted | RunPhase::Polling { .. } => String::new(),
    }
}

fn failure_line(error: Option<&str>) -> String {
    format!("Conversion failed: {}", error.unwrap_or("Unknown error"))
}

fn timeout_line() -> String {
    "Conversion timed out. Please try again later.".to_string()
}

fn inconsistency_line() -> String {
    "Conversion reported complete but no audio was received.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use revox_core::run::ResultArtifact;

    #[test]
    fn waiting_line_shows_percent_and_attempt() {
        let line = describe_event(&RunEvent::Waiting {
            job_id: "j1".into(),
            attempt: 3,
            percent: 27,
            note: WaitNote::StillProcessing,
        });
        assert_eq!(line, "[ 27%] Still processing (attempt 3)...");
    }

    #[test]
    fn unknown_status_is_named() {
        let line = describe_event(&RunEvent::Waiting {
            job_id: "j1".into(),
            attempt: 1,
            percent: 25,
            note: WaitNote::UnknownStatus("queued".into()),
        });
        assert!(line.contains("Unknown job status: queued"));
    }

    #[test]
    fn failure_summary_carries_the_detail() {
        let phase = RunPhase::Failed {
            error: Some("model mismatch".into()),
        };
        assert_eq!(summary(&phase), "Conversion failed: model mismatch");
    }

    #[test]
    fn failure_summary_without_detail() {
        let phase = RunPhase::Failed { error: None };
        assert_eq!(summary(&phase), "Conversion failed: Unknown error");
    }

    #[test]
    fn terminal_messages_are_distinct() {
        let ready = RunPhase::Ready {
            artifact: ResultArtifact {
                content_type: "audio/wav".into(),
                bytes: vec![],
            },
        };
        let failed = RunPhase::Failed { error: None };
        let messages = [
            summary(&ready),
            summary(&failed),
            summary(&RunPhase::TimedOut),
            summary(&RunPhase::Inconsistent),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
