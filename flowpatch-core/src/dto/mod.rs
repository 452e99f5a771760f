//! Request/response shapes for mutation-engine callers
//!
//! Transport-independent DTOs: whichever harness exposes the engine's
//! operations serializes these. Thin serde structs, one module per
//! concern.

pub mod batch;
pub mod node;
