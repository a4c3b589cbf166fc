//! Notebook documents with PEP 723 inline script metadata.
//!
//! This crate holds the file-format side of juv:
//!
//! - A minimal nbformat v4 document model ([`Notebook`], [`Cell`]) that
//!   round-trips the fields juv touches and preserves everything else
//! - PEP 723 `# /// script` block detection, extraction and parsing
//! - The `UntitledN.ipynb` probe used when `juv init` gets no path
//! - Conversion of percent-format Python scripts into notebooks
//!
//! Nothing here spawns processes; talking to `uv` lives in `juv-env`.
//!
//! ```ignore
//! use juv_notebook::{read_ipynb, ScriptMetadata};
//!
//! let nb = read_ipynb(Path::new("analysis.ipynb"))?;
//! let meta = nb.script_metadata()?.unwrap_or_default();
//! println!("needs {:?}", meta.dependencies);
//! ```

use std::path::PathBuf;

pub mod notebook;
pub mod pep723;
pub mod script;
pub mod untitled;

pub use notebook::{read_ipynb, to_ipynb_string, write_ipynb, Cell, CellType, Notebook};
pub use pep723::{
    extract_inline_meta, includes_inline_metadata, parse_inline_script_metadata, ScriptMetadata,
};
pub use script::notebook_from_script;
pub use untitled::first_untitled_path;

/// File extension of Jupyter notebooks, without the leading dot.
pub const NOTEBOOK_EXTENSION: &str = "ipynb";

/// Result type for notebook operations.
pub type NotebookResult<T> = Result<T, NotebookError>;

/// Errors that can occur while reading, writing or inspecting notebooks.
#[derive(Debug, thiserror::Error)]
pub enum NotebookError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid notebook JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid inline script metadata: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Multiple `# /// script` blocks found")]
    MultipleScriptBlocks,

    #[error("No inline script metadata found in {0}")]
    MissingInlineMetadata(PathBuf),

    #[error("Could not find an available UntitledX.ipynb in {0}")]
    NoUntitledAvailable(PathBuf),
}
