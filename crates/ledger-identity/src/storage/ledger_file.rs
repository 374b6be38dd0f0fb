//! Ledger snapshot file.
//!
//! ```json
//! {
//!     "version": 1,
//!     "format": "ledger-v1",
//!     "state": { ... WorldState ... },
//!     "events": [ ... EventRecord ... ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IdentityError, Result};
use crate::ledger::{EventRecord, Ledger, WorldState};

use super::write_atomic;

const LEDGER_VERSION: u32 = 1;
const LEDGER_FORMAT: &str = "ledger-v1";

#[derive(Serialize)]
struct LedgerFileRef<'a> {
    version: u32,
    format: &'a str,
    state: &'a WorldState,
    events: &'a [EventRecord],
}

#[derive(Deserialize)]
struct LedgerFile {
    version: u32,
    format: String,
    state: WorldState,
    events: Vec<EventRecord>,
}

/// Write the ledger to `path` atomically.
pub fn save_ledger(ledger: &Ledger, path: &Path) -> Result<()> {
    let file = LedgerFileRef {
        version: LEDGER_VERSION,
        format: LEDGER_FORMAT,
        state: ledger.state(),
        events: ledger.events(),
    };
    let json = serde_json::to_string_pretty(&file)
        .map_err(|e| IdentityError::SerializationError(e.to_string()))?;
    write_atomic(path, json.as_bytes())
}

/// Load a ledger snapshot. A missing file is an empty ledger.
pub fn load_ledger(path: &Path) -> Result<Ledger> {
    if !path.exists() {
        log::debug!("no ledger at {}, starting empty", path.display());
        return Ok(Ledger::new());
    }
    let bytes = std::fs::read(path)?;
    let file: LedgerFile = serde_json::from_slice(&bytes)
        .map_err(|e| IdentityError::InvalidFileFormat(format!("failed to parse ledger file: {e}")))?;
    if file.version != LEDGER_VERSION || file.format != LEDGER_FORMAT {
        return Err(IdentityError::InvalidFileFormat(format!(
            "unsupported ledger file version={} format={}",
            file.version, file.format
        )));
    }
    Ok(Ledger::from_parts(file.state, file.events))
}
