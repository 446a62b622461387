//! Wire status values reported by the conversion service.
//!
//! Used by the state machine when classifying structured poll bodies.

/// Job is still being converted.
pub const STATUS_PROCESSING: &str = "processing";

/// Job finished; the artifact should have been delivered as binary.
pub const STATUS_COMPLETED: &str = "completed";

/// Job failed server-side.
pub const STATUS_FAILED: &str = "failed";
