use std::path::Path;

use tracing::info;

use crate::errors::CardgenError;
use crate::models::Record;

/// Loads the question bank: a JSON array of records.
///
/// A missing file is `MissingDataSource`; unparseable content is `InvalidDataSource`.
pub fn load_question_bank(path: &Path) -> Result<Vec<Record>, CardgenError> {
    if !path.is_file() {
        return Err(CardgenError::MissingDataSource(path.to_path_buf()));
    }
    let raw = std::fs::read(path)?;
    let records: Vec<Record> =
        serde_json::from_slice(&raw).map_err(|source| CardgenError::InvalidDataSource {
            path: path.to_path_buf(),
            source,
        })?;
    info!(count = records.len(), path = %path.display(), "Question bank loaded");
    Ok(records)
}
