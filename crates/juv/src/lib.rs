//! juv: launch ephemeral, reproducible Jupyter notebooks with uv.
//!
//! Each CLI verb maps to a module here. The modules take a
//! [`PackageManager`](juv_env::PackageManager) so they can run against the
//! real `uv` binary or a fake in tests; printing is left to the binary.

use std::path::{Path, PathBuf};

use juv_env::ToolError;
use juv_notebook::NotebookError;

pub mod add;
pub mod info;
pub mod init;
pub mod legacy;
pub mod run;

#[cfg(test)]
pub(crate) mod testing;

/// Result type for juv commands.
pub type JuvResult<T> = Result<T, JuvError>;

/// Errors surfaced by juv commands.
#[derive(Debug, thiserror::Error)]
pub enum JuvError {
    #[error("File must have a `.ipynb` extension: {0}")]
    InvalidExtension(PathBuf),

    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(PathBuf),

    #[error(transparent)]
    Notebook(#[from] NotebookError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Kinds of files juv knows how to handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FileKind {
    Notebook,
    Script,
}

impl FileKind {
    pub(crate) fn of(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(juv_notebook::NOTEBOOK_EXTENSION) => Some(FileKind::Notebook),
            Some("py") => Some(FileKind::Script),
            _ => None,
        }
    }
}

/// Directory a file lives in, with `.` for bare relative names.
pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Create a scratch `.py` file next to `path`, removed when dropped.
pub(crate) fn scratch_script(dir: &Path) -> std::io::Result<tempfile::NamedTempFile> {
    tempfile::Builder::new()
        .prefix(".juv-")
        .suffix(".py")
        .tempfile_in(dir)
}
