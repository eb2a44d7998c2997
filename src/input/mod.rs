//! Loader for platform metric documents.
//!
//! A document describes one creator and is either a bare JSON array of
//! platform records or an object with `creator` and `platforms` keys.
//! Records are decoded one at a time so that a malformed record never
//! blocks its siblings.

use crate::models::PlatformMetric;
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Extension of files picked up when walking a directory.
pub const DOCUMENT_EXTENSION: &str = "json";

/// A record that could not be decoded into a platform metric.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRecord {
    /// Position of the record in the document (0-indexed).
    pub index: usize,
    /// Decoder error message.
    pub reason: String,
}

/// Platform metrics loaded for one creator.
#[derive(Debug, Clone)]
pub struct MetricsDocument {
    /// File the document was read from.
    pub source: PathBuf,
    /// Creator name, from the document or the file stem.
    pub creator: String,
    /// Records that decoded into the expected shape, in document order.
    pub records: Vec<PlatformMetric>,
    /// Records that did not decode.
    pub rejected: Vec<RejectedRecord>,
}

impl MetricsDocument {
    /// Number of records present in the document, decoded or not.
    pub fn supplied(&self) -> usize {
        self.records.len() + self.rejected.len()
    }

    /// Document position of each decoded record, aligned with `records`.
    pub fn record_positions(&self) -> Vec<usize> {
        let rejected: Vec<usize> = self.rejected.iter().map(|r| r.index).collect();

        (0..self.supplied())
            .filter(|i| !rejected.contains(i))
            .collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDocument {
    Bare(Vec<Value>),
    Wrapped {
        #[serde(default)]
        creator: Option<String>,
        platforms: Vec<Value>,
    },
}

/// Parse a document from a string. `source` is used for naming and messages.
pub fn parse_document(content: &str, source: &Path) -> Result<MetricsDocument> {
    let raw: RawDocument = serde_json::from_str(content).with_context(|| {
        format!(
            "Expected a platform array or {{\"creator\", \"platforms\"}} object in {}",
            source.display()
        )
    })?;

    let (creator, values) = match raw {
        RawDocument::Bare(values) => (None, values),
        RawDocument::Wrapped { creator, platforms } => (creator, platforms),
    };

    let creator = creator.unwrap_or_else(|| {
        source
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    });

    let mut records = Vec::new();
    let mut rejected = Vec::new();

    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<PlatformMetric>(value) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(
                    "Skipping record {} in {}: {}",
                    index,
                    source.display(),
                    e
                );
                rejected.push(RejectedRecord {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }

    debug!(
        "Loaded {} records for {} ({} rejected)",
        records.len(),
        creator,
        rejected.len()
    );

    Ok(MetricsDocument {
        source: source.to_path_buf(),
        creator,
        records,
        rejected,
    })
}

/// Load a single document from disk.
pub fn load_file(path: &Path) -> Result<MetricsDocument> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;

    parse_document(&content, path)
}

/// Find every document under `dir`, sorted by path. Hidden entries are skipped.
pub fn find_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    let walker = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name().to_str()));

    for entry in walker {
        let entry =
            entry.with_context(|| format!("Failed to walk directory: {}", dir.display()))?;

        let is_document = entry.file_type().is_file()
            && entry.path().extension().and_then(|e| e.to_str()) == Some(DOCUMENT_EXTENSION);

        if is_document {
            paths.push(entry.into_path());
        }
    }

    paths.sort();
    Ok(paths)
}

/// Load a file, or every document in a directory tree.
pub fn load_path(path: &Path) -> Result<Vec<MetricsDocument>> {
    if path.is_dir() {
        let paths = find_documents(path)?;
        if paths.is_empty() {
            warn!("No .{} documents found in {}", DOCUMENT_EXTENSION, path.display());
        }
        paths.iter().map(|p| load_file(p)).collect()
    } else {
        Ok(vec![load_file(path)?])
    }
}

fn is_hidden(name: Option<&str>) -> bool {
    name.is_some_and(|n| n.starts_with('.'))
}
