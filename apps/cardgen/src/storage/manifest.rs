use std::path::Path;

use chrono::NaiveDate;
use tracing::info;

use crate::errors::CardgenError;
use crate::models::{Manifest, RenderedCard};
use crate::storage::write_json_atomic;

/// Writes the batch manifest, replacing any previous one.
pub fn write_manifest(
    path: &Path,
    date: NaiveDate,
    cards: Vec<RenderedCard>,
) -> Result<Manifest, CardgenError> {
    let manifest = Manifest { date, cards };
    write_json_atomic(path, &manifest, true)?;
    info!(path = %path.display(), cards = manifest.cards.len(), "Manifest written");
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn card(id: &str) -> RenderedCard {
        RenderedCard {
            id: id.to_string(),
            front_image_path: PathBuf::from(format!("{id}_front.png")),
            back_image_path: PathBuf::from(format!("{id}_back.png")),
            question: "Q".to_string(),
            answer: "A".to_string(),
            explanation: "E".to_string(),
            subject: "S".to_string(),
        }
    }

    #[test]
    fn test_manifest_overwrites_previous() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("daily_flashcards.json");
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).expect("date");
        write_manifest(&path, date, vec![card("a"), card("b")]).expect("first");
        write_manifest(&path, date, vec![card("c")]).expect("second");

        let manifest: Manifest =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("parse");
        assert_eq!(manifest.cards.len(), 1);
        assert_eq!(manifest.cards[0].id, "c");
        assert_eq!(manifest.date, date);
    }

    #[test]
    fn test_empty_manifest_is_written() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("daily_flashcards.json");
        let date = NaiveDate::from_ymd_opt(2026, 1, 2).expect("date");
        write_manifest(&path, date, vec![]).expect("write");
        let raw = std::fs::read_to_string(&path).expect("read");
        assert!(raw.contains("\"2026-01-02\""));
        assert!(raw.contains("\"cards\": []"));
    }
}
