//! The names file written next to the source PDF.
//!
//! A comma-separated table with the header `Page Number,Name,Filename` and
//! one row per page. Rows are matched back to pages by position, not by the
//! page number column.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::naming::export_filename;

pub const SIDECAR_EXTENSION: &str = "csv";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidecarRecord {
    /// 1-indexed
    #[serde(rename = "Page Number")]
    pub page_number: u32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Filename")]
    pub filename: String,
}

/// `<source_dir>/<source_stem>.csv`
pub fn sidecar_path_for<P: AsRef<Path>>(source: P) -> PathBuf {
    source.as_ref().with_extension(SIDECAR_EXTENSION)
}

/// Build the rows for a set of page names.
pub fn records(names: &[String], year_prefix: Option<&str>) -> Vec<SidecarRecord> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| SidecarRecord {
            page_number: i as u32 + 1,
            name: name.clone(),
            filename: export_filename(year_prefix, name),
        })
        .collect()
}

/// Write the names file for `source`. Returns `None` without touching the
/// filesystem when there are no pages.
pub fn save<P: AsRef<Path>>(
    source: P,
    names: &[String],
    year_prefix: Option<&str>,
) -> Result<Option<PathBuf>> {
    if names.is_empty() {
        return Ok(None);
    }

    let path = sidecar_path_for(source);
    write_records(&path, &records(names, year_prefix))?;
    info!(path = %path.display(), rows = names.len(), "saved page names");
    Ok(Some(path))
}

/// Write `rows` to `path`. The file is written under a hidden temporary
/// name first, so a failed write leaves any previous file intact.
pub fn write_records<P: AsRef<Path>>(path: P, rows: &[SidecarRecord]) -> Result<()> {
    let path = path.as_ref();
    let write_err = |source| Error::SidecarWrite {
        path: path.to_path_buf(),
        source,
    };

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let partial = path.with_file_name(format!(".{}.partial", name));

    let written = (|| {
        let mut writer = csv::Writer::from_path(&partial)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        drop(writer);
        std::fs::rename(&partial, path)?;
        Ok::<_, csv::Error>(())
    })();

    if let Err(e) = written {
        let _ = std::fs::remove_file(&partial);
        return Err(write_err(e));
    }
    Ok(())
}

/// Read every row of a names file after its header line.
///
/// The whole file is validated before anything is returned: each row must
/// have exactly three columns and an integer page number.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<SidecarRecord>> {
    let path = path.as_ref();
    let format_err = |reason: String| Error::SidecarFormat {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| format_err(e.to_string()))?;

    let header_len = reader
        .headers()
        .map_err(|e| format_err(e.to_string()))?
        .len();
    if header_len != 0 && header_len != 3 {
        return Err(format_err(format!(
            "header has {} column(s), expected 3",
            header_len
        )));
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| format_err(e.to_string()))?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        if record.len() != 3 {
            return Err(format_err(format!(
                "line {}: expected 3 columns, found {}",
                line,
                record.len()
            )));
        }

        let page_number = record[0].trim().parse::<u32>().map_err(|_| {
            format_err(format!("line {}: invalid page number {:?}", line, &record[0]))
        })?;

        rows.push(SidecarRecord {
            page_number,
            name: record[1].to_string(),
            filename: record[2].to_string(),
        });
    }

    debug!(path = %path.display(), rows = rows.len(), "read names file");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sidecar_path() {
        assert_eq!(
            sidecar_path_for("/docs/report.pdf"),
            PathBuf::from("/docs/report.csv")
        );
    }

    #[test]
    fn test_save_writes_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("report.pdf");

        let path = save(&source, &names(&["Cover", "Body"]), Some("2023"))
            .unwrap()
            .unwrap();
        assert_eq!(path, dir.path().join("report.csv"));

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Page Number,Name,Filename",
                "1,Cover,ATCH_2023_Cover.pdf",
                "2,Body,ATCH_2023_Body.pdf",
            ]
        );
    }

    #[test]
    fn test_failed_save_leaves_nothing_behind() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("report.pdf");
        std::fs::create_dir(dir.path().join("report.csv")).unwrap();

        assert!(matches!(
            save(&source, &names(&["Cover"]), None),
            Err(Error::SidecarWrite { .. })
        ));
        assert!(!dir.path().join(".report.csv.partial").exists());
    }

    #[test]
    fn test_save_without_pages_is_noop() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("report.pdf");
        assert_eq!(save(&source, &[], None).unwrap(), None);
        assert!(!dir.path().join("report.csv").exists());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("report.pdf");
        let original = names(&["Cover, front", "Body \"main\"", "Appendix"]);

        let path = save(&source, &original, None).unwrap().unwrap();
        let rows = load(&path).unwrap();
        let loaded: Vec<String> = rows.iter().map(|r| r.name.clone()).collect();
        assert_eq!(loaded, original);
        assert_eq!(rows[2].filename, "ATCH_Appendix.pdf");
    }

    #[test]
    fn test_load_rejects_wrong_column_count() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("names.csv");
        std::fs::write(&path, "Page Number,Name,Filename\n1,Cover\n").unwrap();

        match load(&path) {
            Err(Error::SidecarFormat { reason, .. }) => assert!(reason.contains("line 2")),
            other => panic!("expected SidecarFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_load_rejects_bad_page_number() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("names.csv");
        std::fs::write(&path, "Page Number,Name,Filename\none,Cover,ATCH_Cover.pdf\n").unwrap();
        assert!(matches!(load(&path), Err(Error::SidecarFormat { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load(dir.path().join("nope.csv")),
            Err(Error::SidecarFormat { .. })
        ));
    }

    #[test]
    fn test_load_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("names.csv");
        std::fs::write(&path, "").unwrap();
        assert!(load(&path).unwrap().is_empty());
    }
}
