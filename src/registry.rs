use std::collections::HashMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::naming::{compute_filename, is_valid_file_stem};

/// One mutable name per page, plus the list of committed display names.
///
/// Indexes are 0-based; errors report 1-based page numbers.
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    names: Vec<String>,
    committed: Vec<bool>,
    display: Vec<String>,
}

impl NameRegistry {
    /// A registry with one empty name per page.
    pub fn new(page_count: usize) -> Self {
        NameRegistry {
            names: vec![String::new(); page_count],
            committed: vec![false; page_count],
            display: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Which pages have been submitted or updated.
    pub fn committed(&self) -> &[bool] {
        &self.committed
    }

    /// Prefixed display names as last published.
    pub fn display_names(&self) -> &[String] {
        &self.display
    }

    /// Overwrite the name for a page. No validation happens here.
    pub fn set(&mut self, index: usize, value: impl Into<String>) -> Result<()> {
        self.check_index(index)?;
        self.names[index] = value.into();
        Ok(())
    }

    /// Check that every page has a non-empty name, that names are distinct,
    /// and that each name is usable as a file name.
    pub fn validate_for_export(&self) -> Result<()> {
        if let Some(index) = self.names.iter().position(|n| n.is_empty()) {
            return Err(Error::EmptyName { page: index + 1 });
        }

        let mut seen: HashMap<&str, usize> = HashMap::with_capacity(self.names.len());
        for (index, name) in self.names.iter().enumerate() {
            if let Some(&first) = seen.get(name.as_str()) {
                return Err(Error::DuplicateName {
                    name: name.clone(),
                    first: first + 1,
                    second: index + 1,
                });
            }
            seen.insert(name.as_str(), index);
        }

        if let Some((index, name)) = self
            .names
            .iter()
            .enumerate()
            .find(|(_, n)| !is_valid_file_stem(n))
        {
            return Err(Error::InvalidName {
                page: index + 1,
                name: name.clone(),
            });
        }

        Ok(())
    }

    /// Commit a page's current name and republish the display list for
    /// every page.
    pub fn submit(&mut self, index: usize, year_prefix: Option<&str>) -> Result<&[String]> {
        self.check_index(index)?;
        if self.names[index].is_empty() {
            return Err(Error::EmptyName { page: index + 1 });
        }

        self.committed[index] = true;
        self.republish(year_prefix);
        debug!(page = index + 1, name = %self.names[index], "submitted name");
        Ok(&self.display)
    }

    /// Rewrite one entry of the display list and the raw name behind it.
    /// Returns the new display string.
    pub fn update(
        &mut self,
        displayed_index: usize,
        new_raw_name: &str,
        year_prefix: Option<&str>,
    ) -> Result<String> {
        if new_raw_name.is_empty() {
            return Err(Error::EmptyName {
                page: displayed_index + 1,
            });
        }
        if displayed_index >= self.display.len() {
            return Err(Error::PageOutOfRange {
                index: displayed_index,
                page_count: self.display.len(),
            });
        }
        self.check_index(displayed_index)?;

        let display_name = compute_filename(year_prefix, new_raw_name);
        self.display[displayed_index] = display_name.clone();
        self.names[displayed_index] = new_raw_name.to_string();
        self.committed[displayed_index] = true;
        debug!(page = displayed_index + 1, %display_name, "updated name");
        Ok(display_name)
    }

    /// Apply names read back from a names file, matched by row position,
    /// and commit those pages. Rows past the last page are ignored; pages
    /// past the last row keep their names.
    pub fn apply_loaded<'a, I>(&mut self, rows: I, year_prefix: Option<&str>) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        if self.display.len() < self.names.len() {
            self.republish(year_prefix);
        }

        let mut applied = 0;
        for (index, name) in rows.into_iter().take(self.names.len()).enumerate() {
            self.names[index] = name.to_string();
            self.display[index] = compute_filename(year_prefix, name);
            self.committed[index] = true;
            applied += 1;
        }
        applied
    }

    fn republish(&mut self, year_prefix: Option<&str>) {
        self.display = self
            .names
            .iter()
            .map(|name| compute_filename(year_prefix, name))
            .collect();
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.names.len() {
            return Err(Error::PageOutOfRange {
                index,
                page_count: self.names.len(),
            });
        }
        Ok(())
    }
}
