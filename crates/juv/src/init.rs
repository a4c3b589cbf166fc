//! `juv init`: create a notebook whose first cell is a uv script stub.

use std::path::{Path, PathBuf};

use juv_env::PackageManager;
use juv_notebook::{first_untitled_path, write_ipynb, Cell, Notebook};
use log::debug;

use crate::{add, scratch_script, FileKind, JuvError, JuvResult};

/// Build a notebook with a single hidden cell holding the script stub that
/// `uv init --script` generates.
///
/// The stub is produced in a scratch file inside `dir`, which is removed
/// whether or not uv succeeds.
pub fn new_notebook_with_inline_metadata<P: PackageManager + ?Sized>(
    pm: &P,
    dir: &Path,
    python: Option<&str>,
) -> JuvResult<Notebook> {
    let scratch = scratch_script(dir)?;
    debug!("Generating script stub in {:?}", scratch.path());

    pm.init_script(scratch.path(), python)?;
    let contents = std::fs::read_to_string(scratch.path())?;

    Ok(Notebook::new(vec![Cell::code(contents.trim()).hidden()]))
}

/// Initialize a notebook at `path`, or at the first free `UntitledN.ipynb`
/// in the current directory.
///
/// An existing file at the target is overwritten. If `packages` is non-empty
/// they are added once the notebook is on disk; a failure there leaves the
/// freshly written notebook in place.
///
/// Returns the path that was written.
pub fn init<P: PackageManager + ?Sized>(
    pm: &P,
    path: Option<&Path>,
    python: Option<&str>,
    packages: &[String],
) -> JuvResult<PathBuf> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => first_untitled_path(&std::env::current_dir()?)?,
    };

    if FileKind::of(&path) != Some(FileKind::Notebook) {
        return Err(JuvError::InvalidExtension(path));
    }

    let notebook = new_notebook_with_inline_metadata(pm, crate::parent_dir(&path), python)?;
    write_ipynb(&notebook, &path)?;

    if !packages.is_empty() {
        add::add(pm, &path, packages, None)?;
    }

    Ok(path)
}
