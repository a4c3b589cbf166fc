//! uv invocation and Jupyter frontend launching for juv.
//!
//! juv never resolves or installs packages itself. Every environment
//! operation goes through the [`PackageManager`] trait, whose production
//! implementation ([`Uv`]) shells out to the `uv` binary:
//!
//! - `init_script`: `uv init --script` to produce a PEP 723 stub
//! - `add_dependencies`: `uv add --script` to edit a metadata block
//! - `tool_run`: `uv tool run` to materialise an isolated environment and
//!   launch the Jupyter frontend in it
//! - `version`: `uv --version`
//!
//! ```ignore
//! use juv_env::{tools, PackageManager, Uv};
//!
//! let uv = Uv::new(tools::get_uv_path()?);
//! println!("{}", uv.version()?);
//! ```

use std::process::ExitStatus;

pub mod runtime;
pub mod tools;
pub mod uv;

pub use runtime::{RunPlan, Runtime, RuntimeName};
pub use uv::{PackageManager, Uv};

/// Result type for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Errors from locating or running external tools.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("'uv' command not found: {0}")]
    UvNotFound(#[from] which::Error),

    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Invalid runtime specifier: {0}")]
    InvalidSpecifier(String),
}
