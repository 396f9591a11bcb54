//! JSON input and output for the CLI.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use caixa_core::LedgerEntry;
use caixa_core::reports::NameLookup;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A ledger snapshot: entries plus the names reports resolve ids against.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerFile {
    /// Stored entries.
    pub entries: Vec<LedgerEntry>,
    /// Category names by id.
    #[serde(default)]
    pub categories: NameLookup,
    /// Counterparty names by id.
    #[serde(default)]
    pub counterparties: NameLookup,
}

/// Reads and parses JSON from a file, or from stdin when the path is `-`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Writes a value to stdout as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
