//! Layout domain model for canvas cards and graph nodes.
//!
//! # Responsibility
//! - Define geometry value types shared by every layout module.
//! - Define the positioned projection of note/folder entities.
//!
//! # Invariants
//! - Every card is identified by a stable `ItemId`.
//! - Maps over cards are keyed by `ItemId`, never by reference identity.

pub mod geometry;
pub mod item;
