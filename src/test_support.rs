//! Fixture PDFs for unit tests.

use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::path::{Path, PathBuf};

/// Write a PDF with `pages` pages, each drawing the text "Page N".
/// The MediaBox (A4) lives on the page tree root and is inherited.
pub fn write_test_pdf(dir: &Path, file_name: &str, pages: u32) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for n in 1..=pages {
        let content = format!("BT /F1 24 Tf 72 720 Td (Page {}) Tj ET", n);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let path = dir.join(file_name);
    doc.save(&path).unwrap();
    path
}

/// Raw content stream of a page as text.
pub fn page_text(doc: &Document, page_id: ObjectId) -> String {
    let content = doc.get_page_content(page_id).unwrap();
    String::from_utf8_lossy(&content).into_owned()
}

/// Text of the only page of a single-page PDF on disk.
pub fn single_page_text(path: &Path) -> String {
    let doc = Document::load(path).unwrap();
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 1, "{} should have one page", path.display());
    let (_, page_id) = pages.into_iter().next().unwrap();
    page_text(&doc, page_id)
}
