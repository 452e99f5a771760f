//! Flowpatch Engine
//!
//! The workflow mutation engine: applies structured edits to a remote
//! workflow document safely despite the store being mutable by other
//! concurrent actors.
//!
//! Two complementary apply strategies:
//! - the batch processor (`flowpatch-core::batch`) computes a complete
//!   new graph state on a private copy and persists it in one write, or
//!   rejects the whole batch;
//! - point mutations (add/update/delete a node, connect two nodes,
//!   reposition a node) run inside a versioned read-mutate-write cycle
//!   that retries on version-precondition conflicts with exponential
//!   backoff.
//!
//! All coordination with other writers goes through the store's
//! version-tag precondition; nothing is locked.

pub mod config;
pub mod engine;
pub mod store;

pub use config::EngineConfig;
pub use engine::{Engine, EngineError};
pub use store::{StoreError, VersionTag, VersionedWorkflow, WorkflowStore};
