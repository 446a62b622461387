//! Run lifecycle events broadcast by the driver.
//!
//! A front end subscribes to these to render progress and to know when
//! resubmission may be re-enabled (any terminal variant).

use revox_core::run::WaitNote;
use serde::Serialize;

/// A lifecycle event for one conversion run.
#[derive(Debug, Clone, Serialize)]
pub enum RunEvent {
    /// The upload was accepted; polling is about to begin.
    RunStarted { job_id: String },

    /// The result was not ready this attempt; the driver is waiting
    /// out the fixed interval before the next poll.
    Waiting {
        job_id: String,
        /// 1-based ordinal of the poll that just came back.
        attempt: u32,
        /// Display percentage for the progress bar (25–75 band).
        percent: u8,
        note: WaitNote,
    },

    /// Terminal: the artifact arrived.
    Completed { job_id: String },

    /// Terminal: the server reported failure.
    Failed {
        job_id: String,
        error: Option<String>,
    },

    /// Terminal: the attempt budget ran out while still processing.
    TimedOut { job_id: String },

    /// Terminal: the job claimed completion without delivering audio.
    Inconsistent { job_id: String },

    /// Terminal: the upload itself was rejected; polling never began.
    SubmissionFailed { error: String },
}
