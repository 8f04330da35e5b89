//! Batch pipeline: select, render, persist.
//!
//! # Flow
//! 1. Load the question bank (missing bank aborts, nothing written).
//! 2. Read history and select the batch (exhausted pool writes an empty
//!    manifest and aborts).
//! 3. For each record, render both faces and encode them inside
//!    `tokio::task::spawn_blocking`, then record its id in history.
//! 4. Write the manifest.
//!
//! Records are rendered one at a time, so history has a single writer. A
//! record that fails to render or save is logged and skipped. A history write
//! failure keeps the rendered images and is reported as a warning.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::batch::selector::{select_batch, Relaxation};
use crate::config::Config;
use crate::errors::CardgenError;
use crate::models::{Record, RenderedCard};
use crate::render::CardComposer;
use crate::storage::{load_question_bank, write_manifest, HistoryStore};

/// Summary of one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub cards: Vec<RenderedCard>,
    pub failed: Vec<String>,
    pub history_warnings: usize,
    pub relaxation: Relaxation,
    pub manifest_path: PathBuf,
}

/// Runs one batch with today's date and the configured RNG seed.
pub async fn run_batch(config: &Config) -> Result<BatchReport, CardgenError> {
    let composer = Arc::new(CardComposer::new(config));
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    run_batch_with(config, composer, &mut rng, Local::now().date_naive()).await
}

/// Runs one batch with an explicit composer, RNG and manifest date.
pub async fn run_batch_with(
    config: &Config,
    composer: Arc<CardComposer>,
    rng: &mut StdRng,
    date: NaiveDate,
) -> Result<BatchReport, CardgenError> {
    let paths = &config.paths;
    let records = load_question_bank(&paths.question_bank)?;

    std::fs::create_dir_all(&paths.output_dir)?;
    let mut history = HistoryStore::open(&paths.history_file);
    if !history.set().is_empty() {
        info!(seen = history.set().len(), "Loaded consumption history");
    }

    let selection = match select_batch(
        &records,
        history.set(),
        config.batch_size,
        config.explanation_ceiling,
        rng,
    ) {
        Ok(selection) => selection,
        Err(e @ CardgenError::ExhaustedPool { .. }) => {
            error!(error = %e, "No cards to render; writing an empty manifest");
            write_manifest(&paths.manifest_file, date, Vec::new())?;
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    if selection.relaxation == Relaxation::ResetHistory {
        if let Err(e) = history.reset() {
            warn!(error = %e, "Failed to reset history file; previous ids remain on disk");
        }
    }

    info!(
        count = selection.records.len(),
        relaxation = ?selection.relaxation,
        "Rendering batch"
    );

    let mut cards = Vec::with_capacity(selection.records.len());
    let mut failed = Vec::new();
    let mut history_warnings = 0usize;

    for (i, record) in selection.records.into_iter().enumerate() {
        let position = i + 1;
        let front_path = paths.output_dir.join(format!("card_{position}_front.png"));
        let back_path = paths.output_dir.join(format!("card_{position}_back.png"));
        info!(position, id = %record.id, "Rendering card");

        let id = record.id.clone();
        let composer = Arc::clone(&composer);
        let (front, back) = (front_path.clone(), back_path.clone());
        let rendered = tokio::task::spawn_blocking(move || {
            render_record(&composer, &record, &front, &back).map(|_| record)
        })
        .await
        .map_err(|e| CardgenError::Internal(anyhow::anyhow!("render task failed: {e}")))
        .and_then(|r| r);

        let record = match rendered {
            Ok(record) => record,
            Err(e) => {
                error!(id = %id, error = %e, "Card failed to render; skipping");
                failed.push(id);
                continue;
            }
        };

        cards.push(RenderedCard::from_record(&record, front_path, back_path));

        if let Err(e) = history.record(&record.id) {
            history_warnings += 1;
            warn!(
                id = %record.id,
                error = %e,
                "Failed to persist history entry; this record may be selected again"
            );
        }
    }

    write_manifest(&paths.manifest_file, date, cards.clone())?;
    info!(
        rendered = cards.len(),
        failed = failed.len(),
        output = %paths.output_dir.display(),
        "Batch complete"
    );

    Ok(BatchReport {
        cards,
        failed,
        history_warnings,
        relaxation: selection.relaxation,
        manifest_path: paths.manifest_file.clone(),
    })
}

/// Renders and saves both faces of one record. Runs on a blocking thread.
fn render_record(
    composer: &CardComposer,
    record: &Record,
    front_path: &Path,
    back_path: &Path,
) -> Result<(), CardgenError> {
    composer.compose_front(record).save(front_path)?;
    composer.compose_back(record).save(back_path)?;
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde_json::json;

    use super::*;
    use crate::config::Paths;
    use crate::layout::FontResolver;
    use crate::models::Manifest;

    struct Fixture {
        _dir: tempfile::TempDir,
        config: Config,
    }

    fn fixture(records: serde_json::Value) -> Fixture {
        let dir = tempfile::tempdir().expect("tempdir");
        let bank = dir.path().join("flashcards.json");
        std::fs::write(&bank, records.to_string()).expect("write bank");
        let mut paths = Paths::new(bank, dir.path().join("out"), dir.path().join("assets"));
        paths.font_dirs = Vec::new();
        let config = Config::with_paths(paths);
        Fixture { _dir: dir, config }
    }

    fn bank(n: usize) -> serde_json::Value {
        json!((0..n)
            .map(|i| json!({
                "id": format!("q{i}"),
                "subject": "Physiology",
                "question": format!("Which nerve supplies muscle number {i}?"),
                "answer": "The one you expect",
                "explanation": "Short explanation under the ceiling.",
            }))
            .collect::<Vec<_>>())
    }

    async fn run(config: &Config, seed: u64) -> Result<BatchReport, CardgenError> {
        let composer = Arc::new(CardComposer::with_parts(config, FontResolver::builtin_only(), None));
        let mut rng = StdRng::seed_from_u64(seed);
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).expect("date");
        run_batch_with(config, composer, &mut rng, date).await
    }

    fn read_history(config: &Config) -> Vec<String> {
        let raw = std::fs::read_to_string(&config.paths.history_file).expect("history exists");
        serde_json::from_str(&raw).expect("history parses")
    }

    fn read_manifest(config: &Config) -> Manifest {
        let raw = std::fs::read_to_string(&config.paths.manifest_file).expect("manifest exists");
        serde_json::from_str(&raw).expect("manifest parses")
    }

    #[tokio::test]
    async fn test_fresh_bank_renders_full_batch() {
        let fx = fixture(bank(10));
        let report = run(&fx.config, 42).await.expect("batch runs");

        assert_eq!(report.cards.len(), 5);
        assert!(report.failed.is_empty());
        assert_eq!(report.relaxation, Relaxation::None);

        let out = &fx.config.paths.output_dir;
        for n in 1..=5 {
            assert!(out.join(format!("card_{n}_front.png")).is_file(), "front {n} missing");
            assert!(out.join(format!("card_{n}_back.png")).is_file(), "back {n} missing");
        }
        assert!(!out.join("card_6_front.png").exists());

        let manifest = read_manifest(&fx.config);
        let manifest_ids: HashSet<String> = manifest.cards.iter().map(|c| c.id.clone()).collect();
        let report_ids: HashSet<String> = report.cards.iter().map(|c| c.id.clone()).collect();
        assert_eq!(manifest.cards.len(), 5);
        assert_eq!(manifest_ids, report_ids);

        let history: HashSet<String> = read_history(&fx.config).into_iter().collect();
        assert_eq!(history, manifest_ids, "history holds exactly the rendered ids");
    }

    #[tokio::test]
    async fn test_rendered_images_have_canvas_size() {
        let fx = fixture(bank(1));
        run(&fx.config, 1).await.expect("batch runs");
        let dims = image::image_dimensions(fx.config.paths.output_dir.join("card_1_front.png"))
            .expect("front image readable");
        assert_eq!(dims, (1080, 1350));
    }

    #[tokio::test]
    async fn test_second_run_avoids_history() {
        let fx = fixture(bank(10));
        let first = run(&fx.config, 1).await.expect("first run");
        let second = run(&fx.config, 2).await.expect("second run");

        let first_ids: HashSet<String> = first.cards.iter().map(|c| c.id.clone()).collect();
        assert_eq!(second.relaxation, Relaxation::None);
        assert!(
            second.cards.iter().all(|c| !first_ids.contains(&c.id)),
            "no id may repeat while unseen records remain"
        );
        assert_eq!(read_history(&fx.config).len(), 10);
    }

    #[tokio::test]
    async fn test_nearly_exhausted_history_relaxes_and_fills_batch() {
        let fx = fixture(bank(10));
        let seen: Vec<String> = (0..9).map(|i| format!("q{i}")).collect();
        std::fs::create_dir_all(&fx.config.paths.output_dir).expect("mkdir");
        std::fs::write(&fx.config.paths.history_file, serde_json::to_string(&seen).expect("json"))
            .expect("write history");

        let report = run(&fx.config, 3).await.expect("batch runs");
        assert_eq!(report.cards.len(), 5);
        assert_eq!(report.relaxation, Relaxation::ResetHistory);
        assert!(report.cards.iter().any(|c| seen.contains(&c.id)), "a seen id is reused");
        assert!(report.cards.iter().any(|c| c.id == "q9"), "the unseen id is included");

        let history: HashSet<String> = read_history(&fx.config).into_iter().collect();
        let rendered: HashSet<String> = report.cards.iter().map(|c| c.id.clone()).collect();
        assert_eq!(history, rendered, "a new cycle starts with this batch");
    }

    #[tokio::test]
    async fn test_small_bank_keeps_history_cycle() {
        let fx = fixture(bank(3));
        let first = run(&fx.config, 6).await.expect("first run");
        assert_eq!(first.cards.len(), 3);
        assert_eq!(first.relaxation, Relaxation::None, "a small bank is not a history reset");
        assert_eq!(read_history(&fx.config).len(), 3);

        let second = run(&fx.config, 7).await.expect("second run");
        assert_eq!(second.relaxation, Relaxation::ResetHistory);
        assert_eq!(second.cards.len(), 3);
    }

    #[tokio::test]
    async fn test_missing_bank_aborts_without_writing() {
        let fx = fixture(bank(1));
        let mut config = fx.config.clone();
        config.paths.question_bank = config.paths.output_dir.join("nope.json");

        let err = run(&config, 0).await.unwrap_err();
        assert!(matches!(err, CardgenError::MissingDataSource(_)));
        assert!(!config.paths.manifest_file.exists());
        assert!(!config.paths.history_file.exists());
    }

    #[tokio::test]
    async fn test_exhausted_pool_writes_empty_manifest() {
        let fx = fixture(json!([{ "id": "img", "image": "picture.png" }]));
        let err = run(&fx.config, 0).await.unwrap_err();
        assert!(matches!(err, CardgenError::ExhaustedPool { .. }));

        let manifest = read_manifest(&fx.config);
        assert!(manifest.cards.is_empty());
        assert!(!fx.config.paths.output_dir.join("card_1_front.png").exists());
    }

    #[tokio::test]
    async fn test_history_write_failure_keeps_images() {
        let fx = fixture(bank(2));
        let mut config = fx.config.clone();
        config.batch_size = 2;
        // A directory where the history file should be makes every rewrite fail.
        std::fs::create_dir_all(&config.paths.history_file).expect("mkdir");

        let report = run(&config, 5).await.expect("batch still completes");
        assert_eq!(report.cards.len(), 2);
        assert_eq!(report.history_warnings, 2);
        assert_eq!(read_manifest(&config).cards.len(), 2);
    }
}
