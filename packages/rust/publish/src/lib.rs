//! Remote index client and batch loader for SearchBridge.
//!
//! [`IndexClient`] is the seam between the pipeline and the remote service:
//! one replace-by-id operation with full-replace semantics. [`load`] drives
//! a sequential, fail-fast batch over it.

pub mod client;
pub mod loader;

pub use client::{HttpIndexClient, IndexClient};
pub use loader::{FailedItem, LoadProgress, LoadReport, SilentLoad, load};
