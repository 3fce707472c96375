//! # ocingest common library
//!
//! Shared code for the recording ingest tool:
//! - Configuration loading (TOML) and config file resolution
//! - Recorder post-processing payload
//! - Common error types

pub mod config;
pub mod error;
pub mod post_process;

pub use error::{Error, Result};
pub use post_process::PostProcessData;
