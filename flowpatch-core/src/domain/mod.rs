//! Core domain types
//!
//! This module contains the structures shared across Flowpatch crates:
//! the workflow document exchanged with the remote store, the node-type
//! descriptors consumed from the static catalog, and validation results.

pub mod descriptor;
pub mod validation;
pub mod workflow;
