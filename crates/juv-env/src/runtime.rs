//! Jupyter frontend specifiers and the `uv tool run` launch plan.
//!
//! A frontend is written `NAME` or `NAME@VERSION`, e.g. `lab`,
//! `notebook@7.2.1` or `nbclassic`. The plan runs
//! `uv tool run --isolated ... jupyter NAME <notebook>` so the frontend and the
//! notebook's declared dependencies share one throwaway environment.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use juv_notebook::ScriptMetadata;

use crate::{ToolError, ToolResult};

/// Frontend used when neither `--jupyter` nor `JUV_JUPYTER` is given.
pub const DEFAULT_RUNTIME: &str = "lab";

/// Environment variable naming the default frontend.
pub const JUPYTER_ENV_VAR: &str = "JUV_JUPYTER";

/// Child environment: path of the uv binary that launched the session.
pub const INTERNAL_UV_ENV_VAR: &str = "JUV_INTERNAL__UV";
/// Child environment: absolute path of the notebook being served.
pub const INTERNAL_TARGET_ENV_VAR: &str = "JUV_INTERNAL__NOTEBOOK_TARGET";
/// Child environment: comma-separated frontend packages added to the env.
pub const INTERNAL_EXTRAS_ENV_VAR: &str = "JUV_INTERNAL__NOTEBOOK_EXTRAS";

/// Supported Jupyter frontends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeName {
    Lab,
    Notebook,
    Nbclassic,
}

impl RuntimeName {
    pub const ALL: [RuntimeName; 3] = [RuntimeName::Lab, RuntimeName::Notebook, RuntimeName::Nbclassic];

    /// Name of the `jupyter` subcommand.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeName::Lab => "lab",
            RuntimeName::Notebook => "notebook",
            RuntimeName::Nbclassic => "nbclassic",
        }
    }

    /// PyPI package that provides the frontend.
    pub fn package(&self) -> &'static str {
        match self {
            RuntimeName::Lab => "jupyterlab",
            RuntimeName::Notebook => "notebook",
            RuntimeName::Nbclassic => "nbclassic",
        }
    }
}

impl fmt::Display for RuntimeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuntimeName {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuntimeName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ToolError::InvalidSpecifier(s.to_string()))
    }
}

/// A frontend plus an optional pinned version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Runtime {
    pub name: RuntimeName,
    pub version: Option<String>,
}

impl Runtime {
    /// Resolve a specifier, falling back to [`DEFAULT_RUNTIME`].
    pub fn resolve(specifier: Option<&str>) -> ToolResult<Self> {
        specifier.unwrap_or(DEFAULT_RUNTIME).parse()
    }

    /// Packages installed alongside the notebook's own dependencies.
    pub fn extras(&self) -> Vec<String> {
        let frontend = match &self.version {
            Some(version) => format!("{}=={}", self.name.package(), version),
            None => self.name.package().to_string(),
        };
        vec!["setuptools".to_string(), frontend]
    }
}

impl FromStr for Runtime {
    type Err = ToolError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ToolError::InvalidSpecifier(value.to_string());
        let parts: Vec<&str> = value.split('@').collect();
        match parts.as_slice() {
            [name] => Ok(Runtime {
                name: name.parse().map_err(|_| invalid())?,
                version: None,
            }),
            [name, version] if !version.is_empty() => Ok(Runtime {
                name: name.parse().map_err(|_| invalid())?,
                version: Some(version.to_string()),
            }),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}@{}", self.name, version),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Everything needed to launch a notebook through `uv tool run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub target: PathBuf,
    pub runtime: Runtime,
    pub python: Option<String>,
    pub dependencies: Vec<String>,
    pub with_args: Vec<String>,
    pub no_cache: bool,
    pub no_project: bool,
}

impl RunPlan {
    /// Build a plan for `target`.
    ///
    /// An explicit `python` wins over the notebook's `requires-python`.
    pub fn new(
        target: PathBuf,
        runtime: Runtime,
        meta: &ScriptMetadata,
        python: Option<String>,
        with_args: Vec<String>,
    ) -> Self {
        Self {
            target,
            runtime,
            python: python.or_else(|| meta.requires_python.clone()),
            dependencies: meta.dependencies.clone(),
            with_args,
            no_cache: false,
            no_project: false,
        }
    }

    pub fn no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }

    pub fn no_project(mut self, no_project: bool) -> Self {
        self.no_project = no_project;
        self
    }

    /// Arguments passed to `uv`.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["tool".into(), "run".into(), "--isolated".into()];
        if self.no_project {
            args.push("--no-project".into());
        }
        if self.no_cache {
            args.push("--no-cache".into());
        }
        if let Some(python) = &self.python {
            args.push(format!("--python={}", python).into());
        }
        for requirement in self
            .runtime
            .extras()
            .iter()
            .chain(&self.dependencies)
            .chain(&self.with_args)
        {
            args.push(format!("--with={}", requirement).into());
        }
        args.push("jupyter".into());
        args.push(self.runtime.name.as_str().into());
        args.push(self.target.clone().into_os_string());
        args
    }

    /// Extra environment variables for the launched frontend.
    pub fn env(&self, uv: &Path) -> Vec<(&'static str, OsString)> {
        let target = std::fs::canonicalize(&self.target).unwrap_or_else(|_| self.target.clone());
        vec![
            (INTERNAL_UV_ENV_VAR, uv.as_os_str().to_os_string()),
            (INTERNAL_TARGET_ENV_VAR, target.into_os_string()),
            (INTERNAL_EXTRAS_ENV_VAR, self.runtime.extras().join(",").into()),
        ]
    }
}
