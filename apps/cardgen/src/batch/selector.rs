//! Batch selector: picks unseen records for rendering.
//!
//! Eligibility tiers, loosest last:
//! 1. Fresh: not in history, no image, explanation shorter than the ceiling.
//! 2. Any length: not in history, no image.
//! 3. Reset: every record without an image. Unseen records are taken first and
//!    the batch is topped up from previously seen ones.
//!
//! A tier is used only if it can satisfy the whole batch; otherwise the next
//! one is tried. A bank smaller than the batch with nothing seen yet returns
//! every unseen record and does not reset history. Records with an image are never selected. Sampling within a
//! tier is uniform without replacement.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::CardgenError;
use crate::models::Record;
use crate::storage::HistorySet;

/// Which filters had to be dropped to fill the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relaxation {
    None,
    DroppedLengthCeiling,
    ResetHistory,
}

#[derive(Debug, Clone)]
pub struct Selection {
    pub records: Vec<Record>,
    pub relaxation: Relaxation,
}

/// Selects up to `count` records.
///
/// Returns `ExhaustedPool` when no record without an image exists.
pub fn select_batch<R: Rng + ?Sized>(
    records: &[Record],
    history: &HistorySet,
    count: usize,
    explanation_ceiling: usize,
    rng: &mut R,
) -> Result<Selection, CardgenError> {
    let candidates: Vec<&Record> = records.iter().filter(|r| !r.has_image()).collect();
    if candidates.is_empty() || count == 0 {
        return Err(CardgenError::ExhaustedPool { requested: count });
    }

    let unseen: Vec<&Record> = candidates
        .iter()
        .copied()
        .filter(|r| !history.contains(&r.id))
        .collect();

    let fresh: Vec<&Record> = unseen
        .iter()
        .copied()
        .filter(|r| r.explanation_len() < explanation_ceiling)
        .collect();

    if fresh.len() >= count {
        return Ok(Selection {
            records: sample(&fresh, count, rng),
            relaxation: Relaxation::None,
        });
    }

    if unseen.len() >= count {
        warn!(
            fresh = fresh.len(),
            requested = count,
            "Low on fresh records; dropping the explanation length ceiling"
        );
        return Ok(Selection {
            records: sample(&unseen, count, rng),
            relaxation: Relaxation::DroppedLengthCeiling,
        });
    }

    let seen: Vec<&Record> = candidates
        .iter()
        .copied()
        .filter(|r| history.contains(&r.id))
        .collect();

    // Nothing seen to fall back on: the bank is simply smaller than the batch.
    if seen.is_empty() {
        let relaxation = if fresh.len() == unseen.len() {
            Relaxation::None
        } else {
            Relaxation::DroppedLengthCeiling
        };
        warn!(
            available = unseen.len(),
            requested = count,
            "Bank holds fewer eligible records than the batch size"
        );
        return Ok(Selection {
            records: sample(&unseen, unseen.len(), rng),
            relaxation,
        });
    }

    info!(
        unseen = unseen.len(),
        requested = count,
        "History exhausted; starting a new cycle"
    );
    let top_up = (count - unseen.len()).min(seen.len());

    let mut picked: Vec<Record> = unseen.iter().map(|r| (*r).clone()).collect();
    picked.extend(sample(&seen, top_up, rng));
    picked.shuffle(rng);

    Ok(Selection {
        records: picked,
        relaxation: Relaxation::ResetHistory,
    })
}

fn sample<R: Rng + ?Sized>(pool: &[&Record], count: usize, rng: &mut R) -> Vec<Record> {
    pool.choose_multiple(rng, count)
        .map(|r| (*r).clone())
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
