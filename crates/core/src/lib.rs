//! SmokeyNet Core Library
//!
//! Shared utilities for the SmokeyNet weather services:
//! - Configuration loading (XDG-compliant)
//! - File system checks
//! - Common constants

mod config;
pub mod fs;

pub use config::{find_config_file, load_config, ConfigSource};
pub use fs::is_file;

/// Application name used for XDG paths
pub const APP_NAME: &str = "smokeynet";

/// Default API port
pub const DEFAULT_API_PORT: u16 = 8000;

/// Default request timeout for upstream weather APIs, in seconds
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 20;
