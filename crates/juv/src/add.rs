//! `juv add`: add dependencies to a notebook's inline metadata.
//!
//! uv only edits scripts, so the notebook's metadata cell is written to a
//! scratch `.py` file, updated with `uv add --script`, and spliced back.

use std::path::Path;

use juv_env::PackageManager;
use juv_notebook::{read_ipynb, write_ipynb, NotebookError};
use log::debug;

use crate::{parent_dir, scratch_script, FileKind, JuvError, JuvResult};

/// Add `packages` (and/or the contents of a requirements file) to the inline
/// metadata of the notebook or script at `path`.
pub fn add<P: PackageManager + ?Sized>(
    pm: &P,
    path: &Path,
    packages: &[String],
    requirements: Option<&Path>,
) -> JuvResult<()> {
    match FileKind::of(path) {
        Some(FileKind::Notebook) => add_to_notebook(pm, path, packages, requirements),
        Some(FileKind::Script) => Ok(pm.add_dependencies(path, packages, requirements)?),
        None => Err(JuvError::UnsupportedExtension(path.to_path_buf())),
    }
}

fn add_to_notebook<P: PackageManager + ?Sized>(
    pm: &P,
    path: &Path,
    packages: &[String],
    requirements: Option<&Path>,
) -> JuvResult<()> {
    let mut notebook = read_ipynb(path)?;
    let index = notebook
        .inline_metadata_cell()
        .ok_or_else(|| NotebookError::MissingInlineMetadata(path.to_path_buf()))?;

    let scratch = scratch_script(parent_dir(path))?;
    std::fs::write(scratch.path(), notebook.cells[index].source())?;
    debug!(
        "Updating metadata cell {} of {:?} via {:?}",
        index,
        path,
        scratch.path()
    );

    pm.add_dependencies(scratch.path(), packages, requirements)?;

    let updated = std::fs::read_to_string(scratch.path())?;
    notebook.cells[index].set_source(updated.trim());
    write_ipynb(&notebook, path)?;

    Ok(())
}
