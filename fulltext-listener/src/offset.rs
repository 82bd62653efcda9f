//! Persisted apply offset.
//!
//! The listener's only durable state: a 24-byte record of three
//! little-endian `i64`s.
//!
//! ```text
//! offset 0  : last_log_id
//! offset 8  : last_term
//! offset 16 : last_apply_log_id
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Encoded length of an `ApplyOffset`.
pub const OFFSET_RECORD_LEN: usize = 24;

/// Log position the listener has mirrored up to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOffset {
    pub last_log_id: i64,
    pub last_term: i64,
    pub last_apply_log_id: i64,
}

impl ApplyOffset {
    pub fn new(last_log_id: i64, last_term: i64, last_apply_log_id: i64) -> Self {
        Self {
            last_log_id,
            last_term,
            last_apply_log_id,
        }
    }

    /// `(last_log_id, last_term)`.
    pub fn last_committed(&self) -> (i64, i64) {
        (self.last_log_id, self.last_term)
    }

    pub fn encode(&self) -> [u8; OFFSET_RECORD_LEN] {
        let mut buf = [0u8; OFFSET_RECORD_LEN];
        buf[0..8].copy_from_slice(&self.last_log_id.to_le_bytes());
        buf[8..16].copy_from_slice(&self.last_term.to_le_bytes());
        buf[16..24].copy_from_slice(&self.last_apply_log_id.to_le_bytes());
        buf
    }

    /// Decode the first 24 bytes of `bytes`. `None` if there are fewer.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let read = |at: usize| -> Option<i64> {
            Some(i64::from_le_bytes(bytes.get(at..at + 8)?.try_into().ok()?))
        };
        Some(Self {
            last_log_id: read(0)?,
            last_term: read(8)?,
            last_apply_log_id: read(16)?,
        })
    }
}

/// File holding one `ApplyOffset`.
#[derive(Debug, Clone)]
pub struct OffsetStore {
    path: PathBuf,
}

impl OffsetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored offset.
    ///
    /// A missing, short or unreadable file reads as the zero offset.
    pub fn load(&self) -> ApplyOffset {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No apply offset file, starting from zero");
                return ApplyOffset::default();
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Unreadable apply offset file, starting from zero"
                );
                return ApplyOffset::default();
            }
        };

        ApplyOffset::decode(&bytes).unwrap_or_else(|| {
            warn!(
                path = %self.path.display(),
                len = bytes.len(),
                "Truncated apply offset file, starting from zero"
            );
            ApplyOffset::default()
        })
    }

    /// Replace the stored offset.
    ///
    /// Writes a temp file next to the target, syncs it, then renames it over
    /// the target so readers see either the old or the new record.
    pub fn store(&self, offset: &ApplyOffset) -> io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(&offset.encode())?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}
