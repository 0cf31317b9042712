pub mod document;
pub mod preview;

pub use document::PdfDocument;
