use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by the naming and export pipeline.
///
/// Every variant is recoverable: the session is left in the state it was in
/// before the failing operation. Page numbers are 1-based.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to open PDF: {}", path.display())]
    DocumentLoad {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    #[error("No PDF document is loaded")]
    NoDocument,

    /// `index` is 0-based
    #[error("Page {} is out of range (document has {page_count} page(s))", .index + 1)]
    PageOutOfRange { index: usize, page_count: usize },

    #[error("{names} name(s) given for {page_count} page(s)")]
    NameCount { names: usize, page_count: usize },

    #[error("Please enter a name for page {page}")]
    EmptyName { page: usize },

    #[error("Page names must be unique: \"{name}\" is used by pages {first} and {second}")]
    DuplicateName {
        name: String,
        first: usize,
        second: usize,
    },

    #[error("Name \"{name}\" for page {page} cannot be used as a file name")]
    InvalidName { page: usize, name: String },

    #[error("Invalid names file {}: {reason}", path.display())]
    SidecarFormat { path: PathBuf, reason: String },

    #[error("Failed to write names file {}", path.display())]
    SidecarWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to write {}", path.display())]
    ExportIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Pdf(#[from] lopdf::Error),

    #[error("Failed to render page preview: {0}")]
    Render(String),
}
