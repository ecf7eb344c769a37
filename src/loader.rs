use crate::error::{AuditError, Result};
use crate::types::{ArticleRecord, RawArticle};
use crate::util::{coerce_str, coerce_tags, safe_num, snapshot_date};
use chrono::NaiveDate;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// What came out of one pass over the snapshot directory.
#[derive(Debug, Default)]
pub struct LoadResult {
    pub records: Vec<ArticleRecord>,
    /// Every regular file seen, including ones whose content was skipped.
    pub file_count: usize,
    /// Filename-derived dates; files with unparseable names contribute none.
    pub snapshot_dates: Vec<NaiveDate>,
    pub skipped_files: usize,
    pub skipped_entries: usize,
}

/// Load and normalize every snapshot in `dir`.
///
/// A missing directory is the one fatal condition. Everything else degrades:
/// unreadable files, non-JSON content, and non-array payloads skip the file;
/// non-object entries skip the entry. Files are visited in sorted filename
/// order so a rerun over the same directory yields the same record order.
pub fn load_snapshots(dir: &Path) -> Result<LoadResult> {
    if !dir.is_dir() {
        return Err(AuditError::MissingDataDir(dir.to_path_buf()));
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.is_file())
        .collect();
    paths.sort();

    let mut out = LoadResult::default();
    for path in paths {
        out.file_count += 1;
        let run_date = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(snapshot_date);
        if let Some(d) = run_date {
            out.snapshot_dates.push(d);
        }

        let text = match fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) => {
                warn!("skipping unreadable snapshot {}: {}", path.display(), e);
                out.skipped_files += 1;
                continue;
            }
        };
        let payload: Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(e) => {
                warn!("skipping malformed snapshot {}: {}", path.display(), e);
                out.skipped_files += 1;
                continue;
            }
        };
        let Value::Array(entries) = payload else {
            warn!("skipping snapshot {}: payload is not an array", path.display());
            out.skipped_files += 1;
            continue;
        };

        for entry in entries {
            if !entry.is_object() {
                out.skipped_entries += 1;
                continue;
            }
            let raw: RawArticle = match serde_json::from_value(entry) {
                Ok(r) => r,
                Err(_) => {
                    out.skipped_entries += 1;
                    continue;
                }
            };
            out.records.push(normalize(run_date, &raw));
        }
    }

    Ok(out)
}

/// Per-field coercion from a raw entry to a typed record. Pure; never fails.
fn normalize(run_date: Option<NaiveDate>, raw: &RawArticle) -> ArticleRecord {
    ArticleRecord {
        run_date,
        title: coerce_str(&raw.title),
        journal: coerce_str(&raw.journal),
        doi: coerce_str(&raw.doi),
        research_score: safe_num(&raw.research_score),
        impact_score: safe_num(&raw.impact_score),
        topic_tags: coerce_tags(&raw.topic_tags),
        method_tags: coerce_tags(&raw.method_tags),
    }
}
