/// Tag every exported file name starts with.
pub const FILENAME_TAG: &str = "ATCH";

/// Year token prepended to every computed file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum YearPrefix {
    #[default]
    None,
    /// One of the configured year tokens
    Preset(String),
    /// Free-form value typed by the user
    Custom(String),
}

impl YearPrefix {
    /// The token to insert, or `None` when no (or an empty) prefix is set.
    pub fn as_token(&self) -> Option<&str> {
        match self {
            YearPrefix::None => None,
            YearPrefix::Preset(s) | YearPrefix::Custom(s) => {
                if s.is_empty() {
                    None
                } else {
                    Some(s.as_str())
                }
            }
        }
    }
}

/// Combine an optional year token with a raw page name.
///
/// `ATCH_<year>_<name>` when a non-empty year is given, `ATCH_<name>`
/// otherwise. The result has no extension; see [`export_filename`].
pub fn compute_filename(year_prefix: Option<&str>, raw_name: &str) -> String {
    match year_prefix {
        Some(year) if !year.is_empty() => format!("{}_{}_{}", FILENAME_TAG, year, raw_name),
        _ => format!("{}_{}", FILENAME_TAG, raw_name),
    }
}

/// File name used on disk and in the names file's `Filename` column.
pub fn export_filename(year_prefix: Option<&str>, raw_name: &str) -> String {
    format!("{}.pdf", compute_filename(year_prefix, raw_name))
}

/// Whether a raw name can be used as a single path component.
pub fn is_valid_file_stem(raw_name: &str) -> bool {
    !(raw_name == "."
        || raw_name == ".."
        || raw_name.contains(['/', '\\', '\0']))
}
