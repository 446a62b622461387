//! Conversion-run state machine.
//!
//! A run moves from `Submitted` through `Polling` to exactly one
//! terminal phase. [`advance`] is the pure transition function: it
//! classifies one poll reply and decides whether the run continues or
//! ends, without performing any I/O itself. The driver owns the loop,
//! the waits, and the event emission.

use std::time::Duration;

use serde::Serialize;

use crate::status::{STATUS_COMPLETED, STATUS_FAILED, STATUS_PROCESSING};

/// Fixed-cadence polling parameters for a conversion run.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Upper bound on poll attempts before the run times out.
    pub max_attempts: u32,
    /// Fixed delay between consecutive poll attempts.
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 60,
            interval: Duration::from_millis(2500),
        }
    }
}

/// The finished binary payload of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultArtifact {
    /// Content type reported by the server (starts with `audio`).
    pub content_type: String,
    /// The converted audio bytes.
    pub bytes: Vec<u8>,
}

/// Lifecycle phase of a single conversion run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunPhase {
    /// Job accepted by the server; no poll issued yet.
    Submitted,
    /// Poll `attempt` (1-based) is in flight or about to be issued.
    Polling { attempt: u32 },
    /// Terminal: the artifact arrived.
    Ready { artifact: ResultArtifact },
    /// Terminal: the server reported failure.
    Failed { error: Option<String> },
    /// Terminal: the attempt budget ran out while still processing.
    TimedOut,
    /// Terminal: the job claims completion but delivered no audio.
    Inconsistent,
}

impl RunPhase {
    /// Whether this phase ends the run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunPhase::Ready { .. }
                | RunPhase::Failed { .. }
                | RunPhase::TimedOut
                | RunPhase::Inconsistent
        )
    }
}

/// One poll response, reduced to the data the state machine cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum PollReply {
    /// Binary audio payload: the finished artifact.
    Audio {
        content_type: String,
        bytes: Vec<u8>,
    },
    /// Structured status body.
    Status {
        status: String,
        error: Option<String>,
    },
    /// Non-2xx response, an unreadable body, or a request that never
    /// completed (`http_status: None`). Treated as "not ready yet".
    Unavailable { http_status: Option<u16> },
}

/// Why the machine keeps waiting after a non-terminal reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum WaitNote {
    /// The server reported `processing`.
    StillProcessing,
    /// The server reported a status value we do not recognize.
    UnknownStatus(String),
    /// The result endpoint was unavailable this attempt.
    ResultUnavailable { http_status: Option<u16> },
}

/// Result of advancing the state machine by one classified reply.
#[derive(Debug, Clone, PartialEq)]
pub enum PollStep {
    /// Wait the fixed interval, then poll again as `phase`'s attempt.
    Continue { phase: RunPhase, note: WaitNote },
    /// A terminal phase was reached; the run is over.
    Done { phase: RunPhase },
}

/// Advance the run by one poll reply.
///
/// `attempt` is the 1-based ordinal of the poll that produced `reply`.
/// Classification depends only on the reply; the attempt number matters
/// solely for the cap check. Binary audio content is definitive and
/// wins over any status interpretation. A non-terminal reply on the
/// final permitted attempt yields [`RunPhase::TimedOut`].
pub fn advance(attempt: u32, policy: &PollPolicy, reply: PollReply) -> PollStep {
    let keep_waiting = |note: WaitNote| {
        if attempt >= policy.max_attempts {
            PollStep::Done {
                phase: RunPhase::TimedOut,
            }
        } else {
            PollStep::Continue {
                phase: RunPhase::Polling {
                    attempt: attempt + 1,
                },
                note,
            }
        }
    };

    match reply {
        PollReply::Audio {
            content_type,
            bytes,
        } => PollStep::Done {
            phase: RunPhase::Ready {
                artifact: ResultArtifact {
                    content_type,
                    bytes,
                },
            },
        },
        PollReply::Status { status, error } => match status.as_str() {
            // Completed without binary content is a defect signal, not
            // a retry condition.
            STATUS_COMPLETED => PollStep::Done {
                phase: RunPhase::Inconsistent,
            },
            STATUS_FAILED => PollStep::Done {
                phase: RunPhase::Failed { error },
            },
            STATUS_PROCESSING => keep_waiting(WaitNote::StillProcessing),
            _ => keep_waiting(WaitNote::UnknownStatus(status)),
        },
        PollReply::Unavailable { http_status } => {
            keep_waiting(WaitNote::ResultUnavailable { http_status })
        }
    }
}

/// Holder for the artifact of the most recent run.
///
/// The artifact is owned solely by the run that produced it: beginning
/// a new run releases whatever the previous run left behind, and the
/// new artifact is stored at most once.
#[derive(Debug, Default)]
pub struct ArtifactSlot {
    held: Option<ResultArtifact>,
}

impl ArtifactSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Release the previous run's artifact. Call before submitting.
    pub fn begin_run(&mut self) {
        self.held = None;
    }

    /// Store the finished artifact and borrow it back.
    pub fn store(&mut self, artifact: ResultArtifact) -> &ResultArtifact {
        self.held.insert(artifact)
    }

    /// The currently held artifact, if any.
    pub fn held(&self) -> Option<&ResultArtifact> {
        self.held.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> PollPolicy {
        PollPolicy::default()
    }

    fn audio_reply() -> PollReply {
        PollReply::Audio {
            content_type: "audio/wav".into(),
            bytes: vec![1, 2, 3],
        }
    }

    fn status_reply(status: &str, error: Option<&str>) -> PollReply {
        PollReply::Status {
            status: status.into(),
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn audio_reply_reaches_ready() {
        let step = advance(1, &policy(), audio_reply());
        match step {
            PollStep::Done {
                phase: RunPhase::Ready { artifact },
            } => {
                assert_eq!(artifact.content_type, "audio/wav");
                assert_eq!(artifact.bytes, vec![1, 2, 3]);
            }
            other => panic!("Expected Ready, got {other:?}"),
        }
    }

    #[test]
    fn audio_wins_even_on_final_attempt() {
        // Binary content is definitive; the cap check never applies.
        let step = advance(60, &policy(), audio_reply());
        assert!(matches!(
            step,
            PollStep::Done {
                phase: RunPhase::Ready { .. }
            }
        ));
    }

    #[test]
    fn completed_without_audio_is_inconsistent() {
        let step = advance(3, &policy(), status_reply("completed", None));
        assert_eq!(
            step,
            PollStep::Done {
                phase: RunPhase::Inconsistent
            }
        );
    }

    #[test]
    fn failed_status_carries_error_detail() {
        let step = advance(2, &policy(), status_reply("failed", Some("model mismatch")));
        match step {
            PollStep::Done {
                phase: RunPhase::Failed { error },
            } => assert_eq!(error.as_deref(), Some("model mismatch")),
            other => panic!("Expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn processing_continues_with_next_attempt() {
        let step = advance(5, &policy(), status_reply("processing", None));
        assert_eq!(
            step,
            PollStep::Continue {
                phase: RunPhase::Polling { attempt: 6 },
                note: WaitNote::StillProcessing,
            }
        );
    }

    #[test]
    fn unknown_status_keeps_waiting() {
        let step = advance(5, &policy(), status_reply("queued", None));
        assert_eq!(
            step,
            PollStep::Continue {
                phase: RunPhase::Polling { attempt: 6 },
                note: WaitNote::UnknownStatus("queued".into()),
            }
        );
    }

    #[test]
    fn unavailable_result_keeps_waiting() {
        let step = advance(
            1,
            &policy(),
            PollReply::Unavailable {
                http_status: Some(404),
            },
        );
        assert_eq!(
            step,
            PollStep::Continue {
                phase: RunPhase::Polling { attempt: 2 },
                note: WaitNote::ResultUnavailable {
                    http_status: Some(404)
                },
            }
        );
    }

    #[test]
    fn times_out_at_exactly_the_attempt_cap() {
        let step = advance(59, &policy(), status_reply("processing", None));
        assert!(matches!(step, PollStep::Continue { .. }));

        let step = advance(60, &policy(), status_reply("processing", None));
        assert_eq!(
            step,
            PollStep::Done {
                phase: RunPhase::TimedOut
            }
        );
    }

    #[test]
    fn terminal_status_still_wins_on_final_attempt() {
        let step = advance(60, &policy(), status_reply("failed", Some("boom")));
        assert!(matches!(
            step,
            PollStep::Done {
                phase: RunPhase::Failed { .. }
            }
        ));
    }

    #[test]
    fn classification_ignores_attempt_count() {
        // Same reply, different attempts, same transition (cap aside).
        for attempt in [1, 10, 42] {
            let step = advance(attempt, &policy(), status_reply("completed", None));
            assert_eq!(
                step,
                PollStep::Done {
                    phase: RunPhase::Inconsistent
                }
            );
        }
    }

    #[test]
    fn terminal_phases_are_terminal() {
        assert!(!RunPhase::Submitted.is_terminal());
        assert!(!RunPhase::Polling { attempt: 1 }.is_terminal());
        assert!(RunPhase::TimedOut.is_terminal());
        assert!(RunPhase::Inconsistent.is_terminal());
        assert!(RunPhase::Failed { error: None }.is_terminal());
        assert!(RunPhase::Ready {
            artifact: ResultArtifact {
                content_type: "audio/wav".into(),
                bytes: vec![],
            }
        }
        .is_terminal());
    }

    #[test]
    fn slot_releases_previous_artifact_on_new_run() {
        let mut slot = ArtifactSlot::new();
        slot.begin_run();
        slot.store(ResultArtifact {
            content_type: "audio/wav".into(),
            bytes: vec![1],
        });
        assert!(slot.held().is_some());

        slot.begin_run();
        assert!(slot.held().is_none(), "new run must release the old artifact");

        let stored = slot.store(ResultArtifact {
            content_type: "audio/flac".into(),
            bytes: vec![2],
        });
        assert_eq!(stored.bytes, vec![2]);
    }
}
