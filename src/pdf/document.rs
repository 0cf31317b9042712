use lopdf::{Document, Object, ObjectId};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// A loaded source PDF.
pub struct PdfDocument {
    pub doc: Document,
    pub path: PathBuf,
}

impl PdfDocument {
    #[allow(dead_code)]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = Self::read_source(&path)?;
        Self::from_bytes(path, &bytes)
    }

    /// Read a source file, reporting failures as load errors
    pub fn read_source<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        let path = path.as_ref();
        std::fs::read(path).map_err(|e| Error::DocumentLoad {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Parse a PDF already read into memory from `path`
    pub fn from_bytes<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<Self> {
        let path = path.as_ref();
        let doc = Document::load_mem(bytes).map_err(|source| Error::DocumentLoad {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(PdfDocument {
            doc,
            path: path.to_path_buf(),
        })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Get 1-indexed page object IDs
    pub fn page_ids(&self) -> Vec<(u32, ObjectId)> {
        let mut pages: Vec<_> = self.doc.get_pages().into_iter().collect();
        pages.sort_by_key(|(num, _)| *num);
        pages
    }

    /// File name of the source, for display.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Extract a single 1-indexed page into a new document
    pub fn extract_page(&self, page: u32) -> Result<Document> {
        let total = self.page_count();
        if page == 0 || page > total {
            return Err(Error::PageOutOfRange {
                index: page.saturating_sub(1) as usize,
                page_count: total as usize,
            });
        }

        let mut new_doc = self.doc.clone();
        let pages_to_delete: Vec<u32> = self
            .page_ids()
            .iter()
            .map(|(num, _)| *num)
            .filter(|num| *num != page)
            .collect();

        if !pages_to_delete.is_empty() {
            new_doc.delete_pages(&pages_to_delete);
        }
        new_doc.prune_objects();

        Ok(new_doc)
    }

    /// Serialize a document into memory
    pub fn to_bytes(doc: &mut Document) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        doc.save_to(&mut buf).map_err(lopdf::Error::from)?;
        Ok(buf)
    }

    /// Effective MediaBox of a page in points, following `Parent` links for
    /// inherited values. Falls back to US Letter.
    pub fn media_box(&self, page_id: ObjectId) -> [f32; 4] {
        let mut current = Some(page_id);
        // Guards against cyclic Parent chains
        let mut depth = 0;

        while let Some(id) = current {
            let Ok(dict) = self.doc.get_dictionary(id) else {
                break;
            };

            if let Ok(Object::Array(rect)) = dict.get(b"MediaBox").and_then(|o| self.deref(o)) {
                let values: Vec<f32> = rect.iter().filter_map(|o| o.as_float().ok()).collect();
                if values.len() == 4 {
                    return [values[0], values[1], values[2], values[3]];
                }
            }

            current = match dict.get(b"Parent") {
                Ok(Object::Reference(parent)) => Some(*parent),
                _ => None,
            };
            depth += 1;
            if depth > 64 {
                break;
            }
        }

        [0.0, 0.0, 612.0, 792.0]
    }

    fn deref<'a>(&'a self, obj: &'a Object) -> lopdf::Result<&'a Object> {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id),
            other => Ok(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{page_text, write_test_pdf};
    use tempfile::TempDir;

    #[test]
    fn test_open_reports_pages() {
        let dir = TempDir::new().unwrap();
        let path = write_test_pdf(dir.path(), "report.pdf", 3);

        let doc = PdfDocument::open(&path).unwrap();
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.file_name(), "report.pdf");
    }

    #[test]
    fn test_open_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = PdfDocument::open(dir.path().join("missing.pdf"));
        assert!(matches!(result, Err(Error::DocumentLoad { .. })));
    }

    #[test]
    fn test_open_garbage_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();
        assert!(matches!(
            PdfDocument::open(&path),
            Err(Error::DocumentLoad { .. })
        ));
    }

    #[test]
    fn test_extract_single_page() {
        let dir = TempDir::new().unwrap();
        let path = write_test_pdf(dir.path(), "report.pdf", 3);
        let doc = PdfDocument::open(&path).unwrap();

        let page = doc.extract_page(2).unwrap();
        let pages = page.get_pages();
        assert_eq!(pages.len(), 1);
        let (_, page_id) = pages.into_iter().next().unwrap();
        assert!(page_text(&page, page_id).contains("Page 2"));
    }

    #[test]
    fn test_extract_out_of_range() {
        let dir = TempDir::new().unwrap();
        let path = write_test_pdf(dir.path(), "report.pdf", 2);
        let doc = PdfDocument::open(&path).unwrap();
        assert!(doc.extract_page(0).is_err());
        assert!(doc.extract_page(3).is_err());
    }

    #[test]
    fn test_extracted_page_serializes() {
        let dir = TempDir::new().unwrap();
        let path = write_test_pdf(dir.path(), "report.pdf", 2);
        let doc = PdfDocument::open(&path).unwrap();

        let mut page = doc.extract_page(2).unwrap();
        let bytes = PdfDocument::to_bytes(&mut page).unwrap();
        let reparsed = PdfDocument::from_bytes("page.pdf", &bytes).unwrap();
        assert_eq!(reparsed.page_count(), 1);
    }

    #[test]
    fn test_media_box_is_inherited() {
        let dir = TempDir::new().unwrap();
        let path = write_test_pdf(dir.path(), "report.pdf", 1);
        let doc = PdfDocument::open(&path).unwrap();
        let (_, page_id) = doc.page_ids()[0];
        assert_eq!(doc.media_box(page_id), [0.0, 0.0, 595.0, 842.0]);
    }
}
