// File-backed collaborators: question bank (read-only), history (rewritten per
// record), manifest (written once per batch).

pub mod history;
pub mod manifest;
pub mod question_bank;

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::errors::CardgenError;

pub use history::{HistorySet, HistoryStore};
pub use manifest::write_manifest;
pub use question_bank::load_question_bank;

/// Serializes `value` to a temp file next to `path`, then renames it into place.
///
/// Readers never observe a half-written file.
pub(crate) fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T, pretty: bool) -> Result<(), CardgenError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    if pretty {
        serde_json::to_writer_pretty(&mut tmp, value)?;
    } else {
        serde_json::to_writer(&mut tmp, value)?;
    }
    tmp.flush()?;
    tmp.persist(path).map_err(|e| CardgenError::Io(e.error))?;
    Ok(())
}
