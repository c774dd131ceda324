/**
 Residentclock_common
 */

pub mod cli;
pub mod config;

/// Residentclock common prelude
pub mod prelude {
    pub use clap::Parser;

    pub use crate::config::{BotConfig, ClocktowerConfig, ProviderUrls};
    pub use crate::cli::Args;
    pub use crate::cli::Commands;
}
