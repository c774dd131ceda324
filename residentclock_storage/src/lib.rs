//! All things storage for the bot.

extern crate tracing;

/// All the storage models
pub mod model;

/// The per-server settings store
pub mod store;

/// Flat file implementation of the store
pub mod json_file;

/// The quotes the bot can say
pub mod quotes;

/// residentclock_storage prelude
pub mod prelude {
    pub use crate::json_file::JsonFileStore;
    pub use crate::model::{self, *};
    pub use crate::quotes::{JsonQuoteFile, MemoryQuotes, QuoteStore};
    pub use crate::store::{ConfigStore, MemoryStore};
}
