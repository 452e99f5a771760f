//! Flowpatch Core
//!
//! Core types and graph-mutation logic for the Flowpatch workflow editor.
//!
//! This crate contains:
//! - Domain types: the workflow document (nodes + connections), node-type
//!   descriptors, and validation results
//! - The configuration validator: schema-driven checks of node parameter
//!   and credential sets against a type descriptor
//! - The batch operation processor: atomic, all-or-nothing application of
//!   an ordered list of graph edits
//! - DTOs: request/response shapes for callers of the mutation engine
//!
//! Note: persistence and the optimistic-concurrency retry cycle live in
//! `flowpatch-engine`; the HTTP store client lives in `flowpatch-client`.

pub mod batch;
pub mod domain;
pub mod dto;
pub mod error;
pub mod params;
pub mod validate;

pub use error::OperationError;
