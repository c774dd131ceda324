//! All models for the bot

/// Per-server settings
pub mod server_config;

/// Filling in missing servers and settings
pub mod reconcile;

mod lenient;

pub use reconcile::{reconcile, Reconciliation};
pub use server_config::{ServerConfig, SettingError, SettingKey};
