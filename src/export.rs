use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::naming::export_filename;
use crate::pdf::PdfDocument;

/// Files produced by a successful export.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub output_dir: PathBuf,
    /// One file per source page, in page order
    pub files: Vec<PathBuf>,
}

/// `<source_dir>/<source_stem>/`
pub fn output_dir_for<P: AsRef<Path>>(source: P) -> PathBuf {
    let source = source.as_ref();
    let stem = source
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "output".into());
    match source.parent() {
        Some(parent) => parent.join(stem),
        None => PathBuf::from(stem),
    }
}

/// Pages placed in the output folder but not yet committed.
///
/// Files replaced by the export are kept aside until [`commit`] drops them,
/// so [`rollback`] can put the folder back the way it was.
///
/// [`commit`]: PendingExport::commit
/// [`rollback`]: PendingExport::rollback
#[must_use]
#[derive(Debug)]
pub struct PendingExport {
    output_dir: PathBuf,
    created_dir: bool,
    placed: Vec<Placed>,
}

#[derive(Debug)]
struct Placed {
    target: PathBuf,
    /// Where the file previously at `target` was moved
    backup: Option<PathBuf>,
}

impl PendingExport {
    /// Keep the new files and discard the replaced ones.
    pub fn commit(self) -> ExportReport {
        remove_staged(self.placed.iter().filter_map(|p| p.backup.as_ref()));
        let files: Vec<PathBuf> = self.placed.into_iter().map(|p| p.target).collect();
        info!(
            output_dir = %self.output_dir.display(),
            pages = files.len(),
            "split document"
        );
        ExportReport {
            output_dir: self.output_dir,
            files,
        }
    }

    /// Remove the new files and restore any files they replaced.
    pub fn rollback(self) {
        undo_placed(&self.placed);
        if self.created_dir {
            // Fails harmlessly if something else was put there meanwhile
            let _ = std::fs::remove_dir(&self.output_dir);
        }
        warn!(output_dir = %self.output_dir.display(), "rolled back export");
    }
}

/// Write one single-page PDF per page of `doc`, named from `names`.
///
/// The caller validates `names` first. Every page is extracted and
/// serialized before the filesystem is touched, then files are staged under
/// temporary names and renamed into place. If any step fails the folder is
/// restored to its prior state. Existing files with the same final name are
/// replaced once the returned export is committed.
pub fn export_pages(
    doc: &PdfDocument,
    names: &[String],
    year_prefix: Option<&str>,
) -> Result<PendingExport> {
    let page_ids = doc.page_ids();
    if names.len() != page_ids.len() {
        return Err(Error::NameCount {
            names: names.len(),
            page_count: page_ids.len(),
        });
    }

    let output_dir = output_dir_for(&doc.path);

    let mut rendered = Vec::with_capacity(names.len());
    for ((page, _), name) in page_ids.iter().zip(names) {
        let mut single = doc.extract_page(*page)?;
        let bytes = PdfDocument::to_bytes(&mut single)?;
        let target = output_dir.join(export_filename(year_prefix, name));
        debug!(page, target = %target.display(), bytes = bytes.len(), "extracted page");
        rendered.push((target, bytes));
    }

    let created_dir = !output_dir.is_dir();
    std::fs::create_dir_all(&output_dir).map_err(|source| Error::ExportIo {
        path: output_dir.clone(),
        source,
    })?;
    let mut pending = PendingExport {
        output_dir,
        created_dir,
        placed: Vec::with_capacity(rendered.len()),
    };

    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(rendered.len());
    for (target, bytes) in &rendered {
        let partial = staging_path(target, "partial");
        if let Err(source) = std::fs::write(&partial, bytes) {
            remove_staged(staged.iter().map(|(p, _)| p).chain([&partial]));
            pending.rollback();
            return Err(Error::ExportIo {
                path: target.clone(),
                source,
            });
        }
        staged.push((partial, target.clone()));
    }

    for (i, (partial, target)) in staged.iter().enumerate() {
        if let Err(e) = place(partial, target, &mut pending.placed) {
            remove_staged(staged[i..].iter().map(|(p, _)| p));
            pending.rollback();
            return Err(e);
        }
    }

    Ok(pending)
}

/// Move `partial` to `target`, first moving aside a file already there.
fn place(partial: &Path, target: &Path, placed: &mut Vec<Placed>) -> Result<()> {
    let io_err = |source| Error::ExportIo {
        path: target.to_path_buf(),
        source,
    };

    let backup = if target.is_file() {
        let backup = staging_path(target, "bak");
        std::fs::rename(target, &backup).map_err(io_err)?;
        Some(backup)
    } else {
        None
    };

    if let Err(source) = std::fs::rename(partial, target) {
        if let Some(backup) = &backup {
            restore(backup, target);
        }
        return Err(io_err(source));
    }

    placed.push(Placed {
        target: target.to_path_buf(),
        backup,
    });
    Ok(())
}

fn undo_placed(placed: &[Placed]) {
    for entry in placed.iter().rev() {
        remove_staged([&entry.target]);
        if let Some(backup) = &entry.backup {
            restore(backup, &entry.target);
        }
    }
}

fn restore(backup: &Path, target: &Path) {
    if let Err(e) = std::fs::rename(backup, target) {
        warn!(
            backup = %backup.display(),
            target = %target.display(),
            error = %e,
            "failed to restore replaced file"
        );
    }
}

/// Hidden sibling of `target`: `.<file_name>.<suffix>`
fn staging_path(target: &Path, suffix: &str) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{}.{}", name, suffix))
}

fn remove_staged<'a>(paths: impl IntoIterator<Item = &'a PathBuf>) {
    for path in paths {
        if let Err(e) = std::fs::remove_file(path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "failed to remove staged file");
            }
        }
    }
}
