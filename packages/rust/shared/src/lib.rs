//! Shared types, error model, and configuration for instructgen.
//!
//! This crate is the foundation depended on by all other instructgen crates.
//! It provides:
//! - [`InstructGenError`]: the unified error type
//! - Domain types ([`Selection`], [`SelectionInput`], [`Language`], [`Feature`], ...)
//! - Configuration ([`AppConfig`] and config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DeploymentConfig, FragmentPaths, OutputConfig, SectionNames, SourceConfig,
    config_dir, config_file_path, init_config, load_config, load_config_from,
    write_default_config,
};
pub use error::{InstructGenError, Result};
pub use types::{
    Feature, Language, OperatingSystem, ProjectType, Selection, SelectionInput, ValidationAlert,
    load_selection_from,
};
