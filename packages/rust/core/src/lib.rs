//! Core pipeline orchestration and domain logic for SearchBridge.
//!
//! This crate ties extraction, item transformation, and publishing into the
//! end-to-end `sync` workflow.

pub mod acl;
pub mod pipeline;
pub mod transform;

pub use acl::{AclPolicy, AclRule};
pub use pipeline::{
    ProgressReporter, SilentProgress, SyncConfig, SyncResult, assemble_items, sync,
};
pub use transform::{doc_id, transform};
