//! Core types and configuration for dockergen.
//!
//! This crate defines the `config.json` schema ([`GeneratorConfig`]),
//! per-version settings ([`VersionSettings`]), and shared error types.

pub mod config;
pub mod error;

pub use config::{
    CONFIG_FILE, DEFAULT_BUCKET, GeneratorConfig, MAPPING_PREFIX, VersionSettings,
};
pub use error::{Error, Result};
