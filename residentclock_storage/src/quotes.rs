use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::*;

use crate::json_file::{read_if_present, write_replacing};

/// The quotes the bot can say, in the order they were added.
#[async_trait]
pub trait QuoteStore: Send + Sync {
    async fn load_quotes(&self) -> Result<Vec<String>>;

    /// Replace all stored quotes.
    async fn save_quotes(&self, quotes: &[String]) -> Result<()>;

    /// Append a quote and return how many quotes there are now.
    async fn add_quote(&self, quote: String) -> Result<usize> {
        let mut quotes = self.load_quotes().await?;
        quotes.push(quote);
        self.save_quotes(&quotes).await?;

        Ok(quotes.len())
    }
}

/// Layout of the quotes file: `{"quotes": [{"1": "..."}, {"2": "..."}]}`.
#[derive(Debug, Default, Deserialize, Serialize)]
struct QuotesDocument {
    #[serde(default)]
    quotes: Vec<BTreeMap<String, String>>,
}

impl QuotesDocument {
    fn numbered(quotes: &[String]) -> Self {
        let quotes = quotes
            .iter()
            .enumerate()
            .map(|(index, quote)| BTreeMap::from([((index + 1).to_string(), quote.clone())]))
            .collect();

        Self { quotes }
    }

    fn into_quotes(self) -> Vec<String> {
        self.quotes.into_iter().flat_map(BTreeMap::into_values).collect()
    }
}

/// Stores the quotes in a single json file.
#[derive(Debug, Clone)]
pub struct JsonQuoteFile {
    path: PathBuf,
}

impl JsonQuoteFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl QuoteStore for JsonQuoteFile {
    #[instrument(level = "trace", name = "storage.quotes.load", skip_all)]
    async fn load_quotes(&self) -> Result<Vec<String>> {
        let Some(raw) = read_if_present(&self.path).await? else {
            event!(Level::DEBUG, path = %self.path.display(), "No quotes file, starting empty");
            return Ok(Vec::new());
        };

        let document: QuotesDocument = serde_json::from_str(&raw)
            .with_context(|| format!("Error parsing quotes file {}", self.path.display()))?;

        Ok(document.into_quotes())
    }

    #[instrument(level = "trace", name = "storage.quotes.save", skip_all, fields(quotes = quotes.len()))]
    async fn save_quotes(&self, quotes: &[String]) -> Result<()> {
        let json = serde_json::to_string(&QuotesDocument::numbered(quotes))
            .with_context(|| "Error serializing quotes")?;

        write_replacing(&self.path, json).await
    }
}

/// Keeps the quotes in memory.
#[derive(Debug, Default)]
pub struct MemoryQuotes {
    quotes: Mutex<Vec<String>>,
}

#[async_trait]
impl QuoteStore for MemoryQuotes {
    async fn load_quotes(&self) -> Result<Vec<String>> {
        let quotes = self.quotes.lock().map_err(|_| anyhow!("Quote lock is poisoned"))?;

        Ok(quotes.clone())
    }

    async fn save_quotes(&self, quotes: &[String]) -> Result<()> {
        let mut stored = self.quotes.lock().map_err(|_| anyhow!("Quote lock is poisoned"))?;
        *stored = quotes.to_vec();

        Ok(())
    }
}
