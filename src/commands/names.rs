use super::headless_session;
use crate::naming::YearPrefix;
use crate::session::Session;
use crate::sidecar::sidecar_path_for;
use anyhow::Result;
use std::path::Path;

pub fn save<P: AsRef<Path>>(input: P, names: &[String], prefix: YearPrefix) -> Result<()> {
    let mut session = headless_session(prefix);
    let info = session.load_document(&input)?;

    for (index, name) in names.iter().enumerate().take(info.page_count as usize) {
        session.set_name(index, name.as_str())?;
    }
    if names.len() > info.page_count as usize {
        eprintln!(
            "Ignoring {} name(s) beyond page {}",
            names.len() - info.page_count as usize,
            info.page_count
        );
    }

    match session.save_sidecar()? {
        Some(path) => println!("Saved names to {}", path.display()),
        None => println!("No pages; nothing saved."),
    }

    Ok(())
}

pub fn show<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    sidecar: Option<Q>,
    prefix: YearPrefix,
) -> Result<()> {
    let input = input.as_ref();
    let sidecar = sidecar
        .map(|p| p.as_ref().to_path_buf())
        .unwrap_or_else(|| sidecar_path_for(input));

    let mut session = headless_session(prefix);
    session.load_document(input)?;
    let applied = session.load_sidecar(&sidecar)?;

    for line in committed_lines(&session) {
        println!("{}", line);
    }
    println!("Applied {} row(s) from {}", applied, sidecar.display());

    Ok(())
}

/// The committed list, one numbered line per entry, then its count.
fn committed_lines(session: &Session) -> Vec<String> {
    let display = session.display_names();
    display
        .iter()
        .enumerate()
        .map(|(index, name)| format!("{}. {}", index + 1, name))
        .chain([format!("Count: {}", display.len())])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sidecar;
    use crate::test_support::write_test_pdf;
    use tempfile::TempDir;

    #[test]
    fn test_save_keeps_names_as_given() {
        let dir = TempDir::new().unwrap();
        let path = write_test_pdf(dir.path(), "report.pdf", 2);

        save(&path, &[" Cover".to_string(), "Body ".to_string()], YearPrefix::None).unwrap();

        let rows = sidecar::load(dir.path().join("report.csv")).unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec![" Cover", "Body "]);
    }

    #[test]
    fn test_committed_lines_after_load() {
        let dir = TempDir::new().unwrap();
        let path = write_test_pdf(dir.path(), "report.pdf", 2);
        save(&path, &["Cover".to_string(), "Body".to_string()], YearPrefix::None).unwrap();

        let mut session = headless_session(YearPrefix::Preset("2024".into()));
        session.load_document(&path).unwrap();
        session.load_sidecar(dir.path().join("report.csv")).unwrap();

        assert_eq!(
            committed_lines(&session),
            vec!["1. ATCH_2024_Cover", "2. ATCH_2024_Body", "Count: 2"]
        );
    }
}
