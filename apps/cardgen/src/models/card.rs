use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::record::Record;

/// Metadata for one rendered front/back pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedCard {
    pub id: String,
    pub front_image_path: PathBuf,
    pub back_image_path: PathBuf,
    pub question: String,
    pub answer: String,
    pub explanation: String,
    pub subject: String,
}

impl RenderedCard {
    pub fn from_record(record: &Record, front_image_path: PathBuf, back_image_path: PathBuf) -> Self {
        RenderedCard {
            id: record.id.clone(),
            front_image_path,
            back_image_path,
            question: record.question.clone(),
            answer: record.answer.clone(),
            explanation: record.explanation.clone(),
            subject: record.subject.clone(),
        }
    }
}

/// Batch manifest. `date` serializes as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub date: NaiveDate,
    pub cards: Vec<RenderedCard>,
}
