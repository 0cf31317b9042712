use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};
use crate::pdf::PdfDocument;

/// Rasterized preview of one page. Never persisted by the session.
#[derive(Debug, Clone)]
pub struct PagePreview {
    /// 1-indexed page number
    pub page: u32,
    pub image: RgbImage,
}

impl PagePreview {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Write the preview as a PNG file
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.image
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| Error::Render(format!("{}: {}", path.display(), e)))
    }
}

/// Produces one preview per page, in page order.
///
/// `source` holds the bytes `doc` was parsed from. Implementations must
/// release any document handle they open before returning, on success and
/// on error.
pub trait PageRenderer: Send {
    fn render(&self, doc: &PdfDocument, source: &[u8]) -> Result<Vec<PagePreview>>;
}

/// Sizes each preview from the page's MediaBox at 72 dpi, the size of the
/// page's native pixel map, and leaves the canvas blank.
#[derive(Debug, Default, Clone, Copy)]
pub struct MediaBoxRenderer;

impl PageRenderer for MediaBoxRenderer {
    fn render(&self, doc: &PdfDocument, _source: &[u8]) -> Result<Vec<PagePreview>> {
        let previews = doc
            .page_ids()
            .into_iter()
            .map(|(page, page_id)| {
                let [x0, y0, x1, y1] = doc.media_box(page_id);
                let width = ((x1 - x0).abs().ceil() as u32).max(1);
                let height = ((y1 - y0).abs().ceil() as u32).max(1);
                debug!(page, width, height, "sized page preview");
                PagePreview {
                    page,
                    image: RgbImage::from_pixel(width, height, Rgb([255, 255, 255])),
                }
            })
            .collect();
        Ok(previews)
    }
}

/// Renders real page content through a system pdfium library.
#[cfg(feature = "pdfium")]
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfiumRenderer;

#[cfg(feature = "pdfium")]
impl PageRenderer for PdfiumRenderer {
    fn render(&self, doc: &PdfDocument, source: &[u8]) -> Result<Vec<PagePreview>> {
        use pdfium_render::prelude::*;

        let render_err = |e: PdfiumError| Error::Render(format!("{}: {}", doc.path.display(), e));

        let pdfium = Pdfium::new(Pdfium::bind_to_system_library().map_err(render_err)?);
        let document = pdfium
            .load_pdf_from_byte_slice(source, None)
            .map_err(render_err)?;
        let config = PdfRenderConfig::new().scale_page_by_factor(1.0);

        let mut previews = Vec::new();
        for (index, page) in document.pages().iter().enumerate() {
            let bitmap = page.render_with_config(&config).map_err(render_err)?;
            let width = bitmap.width() as u32;
            let height = bitmap.height() as u32;
            let rgba = bitmap.as_rgba_bytes();
            let rgb: Vec<u8> = rgba
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect();
            let image = RgbImage::from_raw(width, height, rgb).ok_or_else(|| {
                Error::Render(format!("page {} bitmap has unexpected size", index + 1))
            })?;
            previews.push(PagePreview {
                page: index as u32 + 1,
                image,
            });
        }

        Ok(previews)
    }
}

/// The renderer used when none is configured.
pub fn default_renderer() -> Box<dyn PageRenderer> {
    #[cfg(feature = "pdfium")]
    {
        Box::new(PdfiumRenderer)
    }
    #[cfg(not(feature = "pdfium"))]
    {
        Box::new(MediaBoxRenderer)
    }
}

/// A renderer that draws page content, for writing preview images.
///
/// Fails when built without the `pdfium` feature: the MediaBox renderer
/// only knows page sizes and would write blank images.
pub fn content_renderer() -> Result<Box<dyn PageRenderer>> {
    #[cfg(feature = "pdfium")]
    {
        Ok(Box::new(PdfiumRenderer))
    }
    #[cfg(not(feature = "pdfium"))]
    {
        Err(Error::Render(
            "built without a rasterizer; rebuild with `--features pdfium` to write previews"
                .to_string(),
        ))
    }
}

/// Write previews for the given 1-indexed pages as `page_NNNN.png`.
pub fn write_previews<P: AsRef<Path>>(
    previews: &[PagePreview],
    pages: &[u32],
    output_dir: P,
) -> Result<Vec<PathBuf>> {
    let output_dir = output_dir.as_ref();
    std::fs::create_dir_all(output_dir).map_err(|source| Error::ExportIo {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(pages.len());
    for &page in pages {
        let Some(preview) = previews.iter().find(|p| p.page == page) else {
            return Err(Error::PageOutOfRange {
                index: page.saturating_sub(1) as usize,
                page_count: previews.len(),
            });
        };
        let path = output_dir.join(format!("page_{:04}.png", page));
        preview.save_png(&path)?;
        written.push(path);
    }
    Ok(written)
}
