//! Spatial canvas layout.
//!
//! # Responsibility
//! - Resolve drop points into stacked, edge-attached or grid-snapped targets.
//! - Translate pan gestures into settled card positions.
//!
//! # Invariants
//! - Snap resolution stays pure; all mutable gesture state lives in the
//!   controller.

pub mod controller;
pub mod gesture;
pub mod snap;
