//! `juv run`: launch a notebook (or script) in an ephemeral environment.

use std::path::PathBuf;
use std::process::ExitStatus;

use juv_env::{PackageManager, RunPlan, Runtime};
use juv_notebook::{notebook_from_script, read_ipynb, write_ipynb};
use log::info;

use crate::{FileKind, JuvError, JuvResult};

/// Inputs of `juv run`.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub path: PathBuf,
    /// Frontend specifier (`lab`, `notebook@7.2`, ...). `None` means `lab`.
    pub jupyter: Option<String>,
    pub python: Option<String>,
    pub with_args: Vec<String>,
    pub no_cache: bool,
    pub no_project: bool,
}

/// A resolved launch, ready for [`launch`].
#[derive(Debug, Clone)]
pub struct PreparedRun {
    pub plan: RunPlan,
    /// Set when a `.py` script was converted to a notebook on the way.
    pub converted: Option<PathBuf>,
}

/// Resolve the frontend, load the notebook and build the `uv tool run` plan.
///
/// Scripts are converted to a sibling `.ipynb` first, overwriting any
/// notebook already there.
pub fn prepare(options: RunOptions) -> JuvResult<PreparedRun> {
    let runtime = Runtime::resolve(options.jupyter.as_deref())?;

    let (notebook, target, converted) = match FileKind::of(&options.path) {
        Some(FileKind::Notebook) => (read_ipynb(&options.path)?, options.path, None),
        Some(FileKind::Script) => {
            let script = std::fs::read_to_string(&options.path)?;
            let notebook = notebook_from_script(&script)?;
            let target = options.path.with_extension(juv_notebook::NOTEBOOK_EXTENSION);
            write_ipynb(&notebook, &target)?;
            info!("Converted {:?} to {:?}", options.path, target);
            (notebook, target.clone(), Some(target))
        }
        None => return Err(JuvError::UnsupportedExtension(options.path)),
    };

    let meta = notebook.script_metadata()?.unwrap_or_default();
    let plan = RunPlan::new(target, runtime, &meta, options.python, options.with_args)
        .no_cache(options.no_cache)
        .no_project(options.no_project);

    Ok(PreparedRun { plan, converted })
}

/// Run the frontend in the foreground and wait for it to exit.
pub fn launch<P: PackageManager + ?Sized>(pm: &P, prepared: &PreparedRun) -> JuvResult<ExitStatus> {
    Ok(pm.tool_run(&prepared.plan)?)
}
