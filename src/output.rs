//! Output formatting and persistence for charts, pages and aggregate tables.
//!
//! Supports JSON logging, pretty JSON files and CSV tables.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::pages::Page;

/// Logs any serializable value as pretty-printed JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes `value` as pretty JSON to `path`, creating parent directories.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create '{}'", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("failed to create '{}'", path.display()))?;
    serde_json::to_writer_pretty(file, value)
        .with_context(|| format!("failed to write '{}'", path.display()))?;
    debug!(path = %path.display(), "JSON written");
    Ok(())
}

/// Writes `rows` as a CSV table with a header row, replacing any existing file.
pub fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    debug!(path = %path.display(), rows = rows.len(), "Writing CSV table");

    let file =
        File::create(path).with_context(|| format!("failed to create '{}'", path.display()))?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportIndexEntry {
    pub route: String,
    pub title: String,
    pub file: String,
}

/// `index.json` of a generated report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportIndex {
    pub generated_at: DateTime<Utc>,
    pub pages: Vec<ReportIndexEntry>,
}

/// Writes one JSON file per page plus `index.json` into `out_dir`.
#[tracing::instrument(skip(pages), fields(out_dir = %out_dir.display()))]
pub fn write_report(out_dir: &Path, pages: &[Page]) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create '{}'", out_dir.display()))?;

    let mut entries = Vec::with_capacity(pages.len());
    for page in pages {
        let file = format!("{}.json", page.slug());
        write_json(&out_dir.join(&file), page)?;
        entries.push(ReportIndexEntry {
            route: page.route.clone(),
            title: page.title.clone(),
            file,
        });
    }

    let index = ReportIndex {
        generated_at: Utc::now(),
        pages: entries,
    };
    let index_path = out_dir.join("index.json");
    write_json(&index_path, &index)?;

    info!(pages = pages.len(), "Report written");
    Ok(index_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::GridFinishCell;
    use crate::charts::ChartSpec;
    use std::env;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&ChartSpec::placeholder("nothing")).unwrap();
    }

    #[test]
    fn test_write_table_header_and_rows() {
        let path = temp_path("f1_insights_test_table.csv");
        let _ = fs::remove_file(&path); // clean up any prior run

        let cells = vec![
            GridFinishCell {
                grid_position: 1,
                finish_position: 1,
                count: 3,
            },
            GridFinishCell {
                grid_position: 1,
                finish_position: 2,
                count: 1,
            },
        ];
        write_table(&path, &cells).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "grid_position,finish_position,count");
        assert_eq!(lines.len(), 3);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_table_replaces_existing_file() {
        let path = temp_path("f1_insights_test_replace.csv");
        let cells = vec![GridFinishCell {
            grid_position: 2,
            finish_position: 5,
            count: 1,
        }];

        write_table(&path, &cells).unwrap();
        write_table(&path, &cells).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_report_index() {
        let dir = temp_path("f1_insights_test_report");
        let _ = fs::remove_dir_all(&dir);

        let pages = vec![Page {
            route: "/".to_string(),
            title: "Home".to_string(),
            sections: vec![],
        }];
        let index_path = write_report(&dir, &pages).unwrap();

        let index: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&index_path).unwrap()).unwrap();
        assert_eq!(index["pages"][0]["file"], "home.json");
        assert!(index["generated_at"].is_string());
        assert!(dir.join("home.json").exists());

        fs::remove_dir_all(&dir).unwrap();
    }
}
