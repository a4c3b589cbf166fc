//! Default notebook naming for `juv init` without a path.

use std::path::{Path, PathBuf};

use crate::{NotebookError, NotebookResult};

/// Number of candidate names probed: `Untitled.ipynb` plus `Untitled1..=99`.
pub const MAX_UNTITLED_CANDIDATES: usize = 100;

/// Find the first `UntitledN.ipynb` in `dir` that does not exist yet.
///
/// Probes `Untitled.ipynb`, then `Untitled1.ipynb` through `Untitled99.ipynb`.
/// Nothing is created; the caller writes the file.
pub fn first_untitled_path(dir: &Path) -> NotebookResult<PathBuf> {
    (0..MAX_UNTITLED_CANDIDATES)
        .map(|i| {
            if i == 0 {
                dir.join("Untitled.ipynb")
            } else {
                dir.join(format!("Untitled{}.ipynb", i))
            }
        })
        .find(|path| !path.exists())
        .ok_or_else(|| NotebookError::NoUntitledAvailable(dir.to_path_buf()))
}
