//! Persistence implementations of the entity store contract.
//!
//! # Responsibility
//! - Keep SQL details out of the layout controllers.
//!
//! # Invariants
//! - Writes are staged and only become durable on `persist`.
//! - Unknown items surface as `StoreError::NotFound`.

pub mod layout_repo;
