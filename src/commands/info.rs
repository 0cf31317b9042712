use super::headless_session;
use crate::naming::YearPrefix;
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>>(path: P) -> Result<()> {
    let mut session = headless_session(YearPrefix::None);
    let info = session.load_document(&path)?;

    println!("Document: {}", info.file_name);
    println!("Pages: {}", info.page_count);
    println!("Size: {}", info.size_kb());

    for preview in session.previews() {
        println!(
            "  Page {}: {} x {} px",
            preview.page,
            preview.width(),
            preview.height()
        );
    }

    Ok(())
}
