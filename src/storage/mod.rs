//! Storage Layer
//!
//! Persists completed inspections behind the `ResultSink` boundary.
//! Records are append-only: each analysis produces one independent record
//! and nothing is ever updated or deleted.

pub mod database;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::vision::RecognitionHit;

pub use database::SqliteSink;

/// Sink-level persistence failure
#[derive(Debug, Error)]
#[error("persistence failed: {0}")]
pub struct PersistenceError(pub String);

/// One completed analysis, persisted exactly once
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionRecord {
    /// When the analysis completed
    pub timestamp: DateTime<Utc>,
    /// Hit texts joined with newline separators
    pub full_text: String,
    /// Ordered hits as returned by the recognizer
    pub hits: Vec<RecognitionHit>,
    /// Annotated image written for this record, if any
    pub artifact_path: Option<PathBuf>,
}

impl RecognitionRecord {
    /// Build a record from an ordered, non-empty hit list
    pub fn from_hits(hits: Vec<RecognitionHit>) -> Self {
        let full_text = hits
            .iter()
            .map(|hit| hit.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            timestamp: Utc::now(),
            full_text,
            hits,
            artifact_path: None,
        }
    }
}

/// Persistence boundary: append one record per completed analysis.
/// Safe for concurrent appends; records are independent.
pub trait ResultSink: Send + Sync {
    fn persist(&self, record: &RecognitionRecord) -> Result<(), PersistenceError>;
}

/// Get the application data directory
pub fn get_data_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "lotscan", "lotscan")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;

    let data_dir = proj_dirs.data_dir().to_path_buf();
    std::fs::create_dir_all(&data_dir)?;

    Ok(data_dir)
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "lotscan", "lotscan")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    let config_dir = proj_dirs.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(text: &str) -> RecognitionHit {
        RecognitionHit {
            region: [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)],
            text: text.to_string(),
            confidence: 0.9,
        }
    }

    #[test]
    fn test_full_text_joins_with_newlines() {
        let record = RecognitionRecord::from_hits(vec![hit("LOT-4821"), hit("EXP 2027-01")]);
        assert_eq!(record.full_text, "LOT-4821\nEXP 2027-01");
        assert_eq!(record.hits.len(), 2);
        assert!(record.artifact_path.is_none());
    }

    #[test]
    fn test_single_hit_has_no_separator() {
        let record = RecognitionRecord::from_hits(vec![hit("LOT-4821")]);
        assert_eq!(record.full_text, "LOT-4821");
    }
}
