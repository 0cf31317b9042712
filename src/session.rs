//! State behind one naming session: the loaded document, its page names and
//! the year prefix. Front ends call these operations and render the state
//! they return; they never touch the fields directly.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::export::{export_pages, ExportReport};
use crate::naming::YearPrefix;
use crate::pdf::preview::{default_renderer, PagePreview, PageRenderer};
use crate::pdf::PdfDocument;
use crate::registry::NameRegistry;
use crate::sidecar;

/// Summary shown after a document loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentInfo {
    pub path: PathBuf,
    pub file_name: String,
    pub page_count: u32,
    pub size_bytes: u64,
}

impl DocumentInfo {
    pub fn size_kb(&self) -> String {
        format!("{:.2} KB", self.size_bytes as f64 / 1024.0)
    }
}

struct Loaded {
    path: PathBuf,
    /// Source file contents, parsed again for each export
    bytes: Vec<u8>,
    file_name: String,
    page_count: u32,
    previews: Vec<PagePreview>,
    names: NameRegistry,
}

pub struct Session {
    renderer: Box<dyn PageRenderer>,
    loaded: Option<Loaded>,
    year_prefix: YearPrefix,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(default_renderer())
    }
}

impl Session {
    pub fn new(renderer: Box<dyn PageRenderer>) -> Self {
        Session {
            renderer,
            loaded: None,
            year_prefix: YearPrefix::None,
        }
    }

    pub fn with_year_prefix(mut self, year_prefix: YearPrefix) -> Self {
        self.year_prefix = year_prefix;
        self
    }

    /// Open a PDF and render its previews.
    ///
    /// On success the document, all names and the committed list are
    /// replaced; the year prefix is kept. On failure nothing changes.
    pub fn load_document<P: AsRef<Path>>(&mut self, path: P) -> Result<DocumentInfo> {
        let path = path.as_ref();
        let bytes = PdfDocument::read_source(path)?;
        let (file_name, page_count, previews) = {
            let doc = PdfDocument::from_bytes(path, &bytes)?;
            let previews = self.renderer.render(&doc, &bytes)?;
            (doc.file_name(), doc.page_count(), previews)
        };

        self.loaded = Some(Loaded {
            path: path.to_path_buf(),
            bytes,
            file_name,
            page_count,
            previews,
            names: NameRegistry::new(page_count as usize),
        });
        let info = self.info()?;
        info!(
            path = %path.display(),
            pages = info.page_count,
            size = %info.size_kb(),
            "loaded document"
        );
        Ok(info)
    }

    pub fn info(&self) -> Result<DocumentInfo> {
        let loaded = self.loaded()?;
        Ok(DocumentInfo {
            path: loaded.path.clone(),
            file_name: loaded.file_name.clone(),
            page_count: loaded.page_count,
            size_bytes: loaded.bytes.len() as u64,
        })
    }

    pub fn previews(&self) -> &[PagePreview] {
        self.loaded
            .as_ref()
            .map(|l| l.previews.as_slice())
            .unwrap_or_default()
    }

    pub fn names(&self) -> &[String] {
        self.loaded
            .as_ref()
            .map(|l| l.names.names())
            .unwrap_or_default()
    }

    pub fn committed_pages(&self) -> Vec<u32> {
        self.loaded
            .as_ref()
            .map(|l| {
                l.names
                    .committed()
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| **c)
                    .map(|(i, _)| i as u32 + 1)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Prefixed names as last published by submit, update or load.
    pub fn display_names(&self) -> &[String] {
        self.loaded
            .as_ref()
            .map(|l| l.names.display_names())
            .unwrap_or_default()
    }

    pub fn year_prefix(&self) -> &YearPrefix {
        &self.year_prefix
    }

    pub fn set_name(&mut self, index: usize, value: impl Into<String>) -> Result<()> {
        self.loaded_mut()?.names.set(index, value)
    }

    pub fn submit_name(&mut self, index: usize) -> Result<Vec<String>> {
        let year = self.year_prefix.clone();
        let loaded = self.loaded_mut()?;
        Ok(loaded.names.submit(index, year.as_token())?.to_vec())
    }

    pub fn update_name(&mut self, displayed_index: usize, new_value: &str) -> Result<String> {
        let year = self.year_prefix.clone();
        self.loaded_mut()?
            .names
            .update(displayed_index, new_value, year.as_token())
    }

    /// Change the prefix used for computed names. Raw names and the
    /// committed list are left as they are.
    pub fn set_year_prefix(&mut self, year_prefix: YearPrefix) {
        info!(prefix = ?year_prefix.as_token(), "set year prefix");
        self.year_prefix = year_prefix;
    }

    /// Validate the names, write one PDF per page and then the names file.
    /// Nothing is written if validation fails, and the output folder is
    /// restored if any write fails.
    pub fn process(&mut self) -> Result<ExportReport> {
        let loaded = self.loaded()?;
        loaded.names.validate_for_export()?;

        let year = self.year_prefix.as_token();
        let pending = {
            let doc = PdfDocument::from_bytes(&loaded.path, &loaded.bytes)?;
            export_pages(&doc, loaded.names.names(), year)?
        };
        if let Err(e) = sidecar::save(&loaded.path, loaded.names.names(), year) {
            pending.rollback();
            return Err(e);
        }
        Ok(pending.commit())
    }

    /// Write the names file next to the source. `None` when no document is
    /// loaded.
    pub fn save_sidecar(&self) -> Result<Option<PathBuf>> {
        match &self.loaded {
            Some(loaded) => sidecar::save(
                &loaded.path,
                loaded.names.names(),
                self.year_prefix.as_token(),
            ),
            None => Ok(None),
        }
    }

    /// Apply names from a names file by row position. Returns how many pages
    /// were renamed. The file is fully validated before any name changes.
    pub fn load_sidecar<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let path = path.as_ref();
        self.loaded()?;
        let rows = sidecar::load(path)?;

        let year = self.year_prefix.clone();
        let loaded = self.loaded_mut()?;
        let page_count = loaded.names.len();
        if rows.len() != page_count {
            warn!(
                rows = rows.len(),
                pages = page_count,
                "names file row count differs from page count"
            );
        }

        let applied = loaded
            .names
            .apply_loaded(rows.iter().map(|r| r.name.as_str()), year.as_token());
        info!(path = %path.display(), applied, "loaded page names");
        Ok(applied)
    }

    /// Forget the document, names and prefix.
    pub fn clear(&mut self) {
        self.loaded = None;
        self.year_prefix = YearPrefix::None;
    }

    fn loaded(&self) -> Result<&Loaded> {
        self.loaded.as_ref().ok_or(Error::NoDocument)
    }

    fn loaded_mut(&mut self) -> Result<&mut Loaded> {
        self.loaded.as_mut().ok_or(Error::NoDocument)
    }
}
