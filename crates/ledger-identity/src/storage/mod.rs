//! Storage for the ledger snapshot and signer keys.
//!
//! # Directory layout
//!
//! The default home is `~/.ledger-identity/`:
//!
//! ```text
//! ~/.ledger-identity/
//! ├── ledger.json          versioned ledger snapshot
//! └── signers/
//!     ├── default.key
//!     └── {name}.key       encrypted secp256k1 signer keys
//! ```
//!
//! # Modules
//!
//! - [`ledger_file`]: ledger snapshot save/load.
//! - [`signer_file`]: signer key save/load with passphrase encryption.

pub mod ledger_file;
pub mod signer_file;

use std::path::{Path, PathBuf};

pub use ledger_file::{load_ledger, save_ledger};
pub use signer_file::{load_signer, read_signer_address, save_signer, EncryptionMetadata, SignerFile};

use crate::error::Result;

const LEDGER_FILE: &str = "ledger.json";
const SIGNERS_DIR: &str = "signers";
const SIGNER_EXT: &str = "key";

/// Paths under one ledger-identity home directory.
#[derive(Debug, Clone)]
pub struct Home {
    root: PathBuf,
}

impl Home {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.root.join(LEDGER_FILE)
    }

    pub fn signers_dir(&self) -> PathBuf {
        self.root.join(SIGNERS_DIR)
    }

    pub fn signer_path(&self, name: &str) -> PathBuf {
        self.signers_dir().join(format!("{name}.{SIGNER_EXT}"))
    }

    /// Names of stored signers, sorted.
    pub fn signer_names(&self) -> Result<Vec<String>> {
        let dir = self.signers_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SIGNER_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Write `data` to `path` atomically using a sibling temporary file.
///
/// Creates the parent directory if it does not exist.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);
    std::fs::write(&tmp_path, data)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}
