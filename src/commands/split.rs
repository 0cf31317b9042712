use super::headless_session;
use crate::cli::NameSource;
use crate::naming::YearPrefix;
use anyhow::{Context, Result};
use std::path::Path;

pub fn run<P: AsRef<Path>>(input: P, names: &NameSource, prefix: YearPrefix) -> Result<()> {
    let input = input.as_ref();
    let mut session = headless_session(prefix);
    let info = session.load_document(input)?;

    if let Some(list) = &names.names {
        if list.len() != info.page_count as usize {
            anyhow::bail!(
                "{} name(s) given for {} page(s)",
                list.len(),
                info.page_count
            );
        }
        for (index, name) in list.iter().enumerate() {
            session.set_name(index, name.as_str())?;
        }
    }
    if let Some(sidecar) = &names.sidecar {
        session
            .load_sidecar(sidecar)
            .with_context(|| format!("Failed to load names from {}", sidecar.display()))?;
    }

    let report = session.process()?;

    for file in &report.files {
        println!("{}", file.display());
    }
    println!(
        "Split {} pages into {}",
        report.files.len(),
        report.output_dir.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_test_pdf;
    use tempfile::TempDir;

    fn names(list: &[&str]) -> NameSource {
        NameSource {
            names: Some(list.iter().map(|s| s.to_string()).collect()),
            sidecar: None,
        }
    }

    #[test]
    fn test_split_uses_names_as_given() {
        let dir = TempDir::new().unwrap();
        let path = write_test_pdf(dir.path(), "report.pdf", 2);

        run(&path, &names(&["Cover", " Cover"]), YearPrefix::None).unwrap();

        let out = dir.path().join("report");
        assert!(out.join("ATCH_Cover.pdf").exists());
        assert!(out.join("ATCH_ Cover.pdf").exists());
    }

    #[test]
    fn test_split_name_count_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = write_test_pdf(dir.path(), "report.pdf", 2);

        assert!(run(&path, &names(&["Only"]), YearPrefix::None).is_err());
        assert!(!dir.path().join("report").exists());
    }
}
