//! Persistence layer.
//!
//! Saves and loads the wallet state (balance, transaction log, counters)
//! to and from a JSON file.
//!
//! Amounts are written as JSON numbers and read back through `f64`, so a
//! value needs at most 15 significant digits to survive a save exactly.
//! Anything longer (e.g. `12345678.123456789`) comes back rounded.
//!
//! Saves go to a sibling `.tmp` file first and are renamed into place, so an
//! interrupted save leaves the previous wallet intact.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::types::WalletState;

/// Default wallet file path.
pub const DEFAULT_WALLET_FILE: &str = "plinko_wallet.json";

/// Save wallet state to a JSON file.
pub fn save_wallet(state: &WalletState, path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_WALLET_FILE);
    let json = serde_json::to_string_pretty(state).context("Failed to serialise wallet state")?;

    let staging = staging_path(path);
    std::fs::write(&staging, &json)
        .with_context(|| format!("Failed to write wallet to {}", staging.display()))?;
    std::fs::rename(&staging, path)
        .with_context(|| format!("Failed to move saved wallet into {path}"))?;

    debug!(path, balance = %state.balance, "Wallet saved");
    Ok(())
}

fn staging_path(path: &str) -> PathBuf {
    let mut staging = PathBuf::from(path).into_os_string();
    staging.push(".tmp");
    PathBuf::from(staging)
}

/// Load wallet state from a JSON file.
/// Returns None if the file doesn't exist (fresh wallet).
pub fn load_wallet(path: Option<&str>) -> Result<Option<WalletState>> {
    let path = path.unwrap_or(DEFAULT_WALLET_FILE);

    if !Path::new(path).exists() {
        info!(path, "No saved wallet found, starting fresh");
        return Ok(None);
    }

    let json =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read wallet from {path}"))?;
    let state: WalletState = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse wallet from {path}"))?;

    info!(
        path,
        balance = %state.balance,
        games = state.game_count,
        transactions = state.transactions.len(),
        "Wallet loaded from disk"
    );

    Ok(Some(state))
}

/// Delete the wallet file (reset).
pub fn delete_wallet(path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_WALLET_FILE);
    if Path::new(path).exists() {
        std::fs::remove_file(path).with_context(|| format!("Failed to delete wallet file {path}"))?;
        info!(path, "Wallet file deleted");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
