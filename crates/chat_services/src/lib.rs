//! # Chat Services
//!
//! This crate provides the single real-time chat channel used during rescue
//! operations. Messages are fanned out to every connected participant and
//! never stored.

/// Chat messages, wire frames and errors.
mod types;
pub use types::*;

/// Participant registry and fan-out.
mod hub;
pub use hub::*;
