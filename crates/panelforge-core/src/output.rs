//! Output-path planning
//!
//! Pure helpers deciding where generated files land; directory creation is
//! left to the writer.

use chrono::Utc;
use std::path::{Path, PathBuf};

use panelforge_session::TIMESTAMP_FORMAT;

/// Build a file name of the form `prefix[_timestamp][_suffix].extension`
pub fn generate_filename(prefix: &str, suffix: &str, extension: &str, add_timestamp: bool) -> String {
    let mut parts = vec![prefix.to_string()];

    if add_timestamp {
        parts.push(Utc::now().format(TIMESTAMP_FORMAT).to_string());
    }

    if !suffix.is_empty() {
        parts.push(suffix.to_string());
    }

    format!("{}.{}", parts.join("_"), extension)
}

/// Plan the output path for a file, optionally under a per-day folder
pub fn organize_output_path(base_dir: &Path, filename: &str, organize_by_date: bool) -> PathBuf {
    if organize_by_date {
        let date_folder = Utc::now().format("%Y%m%d").to_string();
        base_dir.join(date_folder).join(filename)
    } else {
        base_dir.join(filename)
    }
}

/// Derive a sibling path with an index suffix before the extension
///
/// `plan/page.png` with index 2 becomes `plan/page_2.png`. Used when one
/// request produces several outputs against a single requested path.
pub fn indexed_path(path: &Path, index: u32) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}_{}.{}", stem, index, ext),
        None => format!("{}_{}", stem, index),
    };
    path.with_file_name(name)
}
