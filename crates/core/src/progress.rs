//! Progress mapping for the front end.
//!
//! One display band per lifecycle stage: 0–25% means submitted but not
//! yet polled, 25–75% is reserved for the polling phase, and 100% is
//! reserved exclusively for a run that ended in `Ready`. Terminal
//! phases other than `Ready` never reach 100%.

use crate::run::{PollPolicy, RunPhase};

/// Shown once the job is accepted, before the first poll.
pub const PERCENT_SUBMITTED: u8 = 25;

/// Width of the polling band (25% through 75%).
const POLL_BAND_SPAN: u32 = 50;

/// Map a run phase to a display percentage.
///
/// Monotonically non-decreasing over any legal phase sequence: polling
/// attempts only increment, and every terminal phase maps at or above
/// the top of the polling band.
pub fn percent(phase: &RunPhase, policy: &PollPolicy) -> u8 {
    match phase {
        RunPhase::Submitted => PERCENT_SUBMITTED,
        RunPhase::Polling { attempt } => {
            let attempt = (*attempt).min(policy.max_attempts);
            let band = attempt * POLL_BAND_SPAN / policy.max_attempts.max(1);
            PERCENT_SUBMITTED + band as u8
        }
        RunPhase::Ready { .. } => 100,
        // Failure terminals pin at the top of the polling band; the
        // front end replaces the bar with the terminal message.
        RunPhase::Failed { .. } | RunPhase::TimedOut | RunPhase::Inconsistent => 75,
    }
}
