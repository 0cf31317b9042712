use crate::page_range::expand_page_ranges;
use crate::pdf::preview::{content_renderer, write_previews};
use crate::session::Session;
use anyhow::{Context, Result};
use std::path::Path;

pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(input: P, pages: &str, output_dir: Q) -> Result<()> {
    let output_dir = output_dir.as_ref();

    let mut session = Session::new(content_renderer()?);
    let info = session.load_document(&input)?;
    let page_list = expand_page_ranges(pages, info.page_count)?;

    if page_list.is_empty() {
        anyhow::bail!("No pages specified");
    }

    let written = write_previews(session.previews(), &page_list, output_dir)
        .with_context(|| format!("Failed to write previews to {}", output_dir.display()))?;

    println!(
        "Wrote {} preview(s) to {}",
        written.len(),
        output_dir.display()
    );

    Ok(())
}
