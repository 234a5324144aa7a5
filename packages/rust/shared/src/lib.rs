//! Shared types, error model, and configuration for SearchBridge.
//!
//! This crate is the foundation depended on by all other SearchBridge crates.
//! It provides:
//! - [`SearchBridgeError`] — the unified error type
//! - Wire types ([`ExternalItem`], [`ItemProperties`], [`AclEntry`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AclRuleConfig, AppConfig, ContentConfig, DocsConfig, GrantConfig, IndexConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, validate_api_token,
};
pub use error::{Result, SearchBridgeError};
pub use types::{
    AccessType, AclEntry, ContentType, ExternalItem, ItemContent, ItemProperties, PrincipalType,
};
