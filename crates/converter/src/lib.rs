//! Client for the remote voice-conversion service.
//!
//! Provides the REST wrapper around the service's three endpoints,
//! the classification of poll responses, the run driver that turns a
//! submitted job into a terminal outcome, and the lifecycle events the
//! driver broadcasts along the way.

pub mod api;
pub mod events;
pub mod runner;
pub mod service;
