//! Input discovery and text extraction
//!
//! This module handles:
//! - Finding proposal PDFs in the proposals directory
//! - Page-by-page PDF text extraction

mod pdf;

pub use pdf::*;

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Check whether a path has a `.pdf` extension (case-insensitive)
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Basename used as the join key between ingestion and qualification
pub fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidPath(path.display().to_string()))
}

/// List the PDFs directly inside `dir`, sorted by path.
///
/// A missing directory yields an empty list.
pub fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::InvalidPath(e.to_string()))?;
        if entry.file_type().is_file() && is_pdf(entry.path()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}
