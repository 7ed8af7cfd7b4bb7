//! Flutter-facing bindings for the NoteCanvas layout core.

pub mod api;
