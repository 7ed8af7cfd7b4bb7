//! Note link graph layout.
//!
//! # Responsibility
//! - Run the force simulation that places linked notes.
//! - Drive pan/zoom, fit-to-view and node pinning for the graph view.
//!
//! # Invariants
//! - The simulation is pure; pins and persistence live in the view controller.

pub mod camera;
pub mod force;
pub mod view;
