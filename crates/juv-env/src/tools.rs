//! Locating the `uv` binary.
//!
//! juv does not bootstrap uv; it must be installed and on `PATH`. The lookup
//! happens once when the CLI starts and the resolved path is handed to
//! [`crate::Uv`].

use std::path::PathBuf;

use log::debug;

use crate::ToolResult;

/// Remediation printed when uv is missing.
pub const UV_INSTALL_HINT: &str = "Please install 'uv' to run `juv`.\n\
For more information, visit: https://github.com/astral-sh/uv";

/// Find `uv` on `PATH`.
pub fn get_uv_path() -> ToolResult<PathBuf> {
    let path = which::which("uv")?;
    debug!("Found uv at {:?}", path);
    Ok(path)
}
