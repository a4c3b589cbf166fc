//! The narrow interface juv needs from a package manager, and its uv
//! implementation.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};

use log::{debug, info};

use crate::runtime::RunPlan;
use crate::{ToolError, ToolResult};

/// Operations juv delegates to the package manager.
///
/// Implemented by [`Uv`] for real use; tests substitute a fake.
pub trait PackageManager {
    /// Write a fresh PEP 723 script stub to `script`.
    fn init_script(&self, script: &Path, python: Option<&str>) -> ToolResult<()>;

    /// Add requirements to the inline metadata block of `script`, in place.
    fn add_dependencies(
        &self,
        script: &Path,
        packages: &[String],
        requirements: Option<&Path>,
    ) -> ToolResult<()>;

    /// Materialise the environment described by `plan` and run the frontend
    /// in the foreground until it exits.
    fn tool_run(&self, plan: &RunPlan) -> ToolResult<ExitStatus>;

    /// Version string reported by the package manager itself.
    fn version(&self) -> ToolResult<String>;
}

/// The `uv` binary.
#[derive(Debug, Clone)]
pub struct Uv {
    path: PathBuf,
}

impl Uv {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn command(&self) -> Command {
        Command::new(&self.path)
    }

    /// Run a command to completion, capturing output and failing on a
    /// non-zero exit.
    fn run_checked(&self, mut cmd: Command) -> ToolResult<Output> {
        let command = describe(&cmd);
        debug!("Running {}", command);

        let output = cmd
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| ToolError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ToolError::CommandFailed {
                command,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }
}

fn describe(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|arg| arg.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

impl PackageManager for Uv {
    fn init_script(&self, script: &Path, python: Option<&str>) -> ToolResult<()> {
        let mut cmd = self.command();
        cmd.args(["init", "--quiet"]);
        if let Some(python) = python {
            cmd.arg("--python").arg(python);
        }
        cmd.arg("--script").arg(script);

        self.run_checked(cmd)?;
        Ok(())
    }

    fn add_dependencies(
        &self,
        script: &Path,
        packages: &[String],
        requirements: Option<&Path>,
    ) -> ToolResult<()> {
        let mut cmd = self.command();
        cmd.args(["add", "--quiet"]);
        if let Some(requirements) = requirements {
            cmd.arg("--requirements").arg(requirements);
        }
        cmd.arg("--script").arg(script).args(packages);

        self.run_checked(cmd)?;
        Ok(())
    }

    fn tool_run(&self, plan: &RunPlan) -> ToolResult<ExitStatus> {
        let mut cmd = self.command();
        cmd.args(plan.args()).envs(plan.env(&self.path));

        let command = describe(&cmd);
        info!("Launching {}", command);

        cmd.status()
            .map_err(|source| ToolError::Spawn { command, source })
    }

    fn version(&self) -> ToolResult<String> {
        let mut cmd = self.command();
        cmd.arg("--version");
        let output = self.run_checked(cmd)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }
}
