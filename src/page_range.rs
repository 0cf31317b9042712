use anyhow::{anyhow, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRange {
    pub start: PageRef,
    pub end: Option<PageRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRef {
    Number(u32),
    End,
}

impl PageRange {
    /// Parse a page range specification like "1-5", "9-6", "1-end", "5"
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow!("Empty page range"));
        }

        if let Some(dash_pos) = s.find('-') {
            // "-5" is not a range
            if dash_pos == 0 {
                return Err(anyhow!("Invalid page range: {}", s));
            }

            let start = parse_page_ref(&s[..dash_pos])?;
            let end = parse_page_ref(&s[dash_pos + 1..])?;

            Ok(PageRange {
                start,
                end: Some(end),
            })
        } else {
            Ok(PageRange {
                start: parse_page_ref(s)?,
                end: None,
            })
        }
    }

    /// Expand this range into a list of 1-based page numbers
    pub fn expand(&self, total_pages: u32) -> Result<Vec<u32>> {
        let resolve = |r: &PageRef| match r {
            PageRef::Number(n) => *n,
            PageRef::End => total_pages,
        };

        let start = resolve(&self.start);
        let end = self.end.as_ref().map(resolve).unwrap_or(start);

        if start == 0 || end == 0 {
            return Err(anyhow!("Page numbers must be >= 1"));
        }

        for page in [start, end] {
            if page > total_pages {
                return Err(anyhow!(
                    "Page {} exceeds total pages {}",
                    page,
                    total_pages
                ));
            }
        }

        let pages: Vec<u32> = if start <= end {
            (start..=end).collect()
        } else {
            (end..=start).rev().collect()
        };

        Ok(pages)
    }
}

fn parse_page_ref(s: &str) -> Result<PageRef> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("end") {
        Ok(PageRef::End)
    } else {
        s.parse::<u32>()
            .map(PageRef::Number)
            .map_err(|_| anyhow!("Invalid page number: {}", s))
    }
}

/// Expand a comma-separated page range string like "1-3,7,9-end" into
/// 1-based page numbers
pub fn expand_page_ranges(s: &str, total_pages: u32) -> Result<Vec<u32>> {
    let mut pages = Vec::new();
    for part in s.split(',') {
        pages.extend(PageRange::parse(part)?.expand(total_pages)?);
    }
    Ok(pages)
}
