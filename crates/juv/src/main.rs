//! juv CLI entry point.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use juv::legacy::upgrade_legacy_jupyter_command;
use juv::run::RunOptions;
use juv_env::runtime::JUPYTER_ENV_VAR;
use juv_env::{tools, Uv};
use log::debug;

#[derive(Parser, Debug)]
#[command(name = "juv", version)]
#[command(about = "A wrapper around uv to launch ephemeral Jupyter notebooks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Display juv's version
    Version,

    /// Display juv and uv versions
    Info,

    /// Initialize a new notebook
    Init {
        /// Notebook to create (default: first free UntitledN.ipynb)
        file: Option<PathBuf>,

        /// Python version for the notebook's environment
        #[arg(long)]
        python: Option<String>,

        /// Packages to add right away
        #[arg(long = "with", value_name = "PACKAGE")]
        with_args: Vec<String>,
    },

    /// Add dependencies to the notebook
    Add {
        #[arg(value_parser = existing_path)]
        file: PathBuf,

        /// Requirements to add
        packages: Vec<String>,

        /// Add all packages listed in a requirements file
        #[arg(short, long, value_parser = existing_path)]
        requirements: Option<PathBuf>,
    },

    /// Launch a notebook or script
    Run {
        #[arg(value_parser = existing_path)]
        file: PathBuf,

        /// The Jupyter frontend to use (lab, notebook or nbclassic, optionally NAME@VERSION)
        #[arg(long, env = JUPYTER_ENV_VAR)]
        jupyter: Option<String>,

        /// Extra packages to run with
        #[arg(long = "with", value_name = "PACKAGE")]
        with_args: Vec<String>,

        /// Python interpreter to run with
        #[arg(long)]
        python: Option<String>,

        /// Avoid reading from or writing to the uv cache
        #[arg(long)]
        no_cache: bool,

        /// Ignore the enclosing project when resolving
        #[arg(long)]
        no_project: bool,
    },
}

fn existing_path(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.exists() {
        Ok(path)
    } else {
        Err(format!("Path '{}' does not exist.", value))
    }
}

fn main() -> ExitCode {
    let rewrite = upgrade_legacy_jupyter_command(std::env::args_os());
    if let Some(jupyter) = &rewrite.jupyter {
        eprintln!(
            "Warning: The command '{jupyter}' is deprecated. Please use 'run' with \
             `--jupyter={jupyter}` or set {JUPYTER_ENV_VAR}={jupyter}"
        );
    }

    // Usage errors exit 1; --help and --version output keep clap's exit code.
    let cli = match Cli::try_parse_from(rewrite.args) {
        Ok(cli) => cli,
        Err(err) if err.use_stderr() => {
            let _ = err.print();
            return ExitCode::FAILURE;
        }
        Err(err) => err.exit(),
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    match execute(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn execute(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Version => {
            println!("{}", juv::info::version_line());
        }
        Commands::Info => {
            let uv = require_uv()?;
            println!("{}", juv::info::info(&uv)?);
        }
        Commands::Init {
            file,
            python,
            with_args,
        } => {
            let uv = require_uv()?;
            let path = juv::init::init(&uv, file.as_deref(), python.as_deref(), &with_args)?;
            println!("Initialized notebook at `{}`", display_path(&path));
        }
        Commands::Add {
            file,
            packages,
            requirements,
        } => {
            let uv = require_uv()?;
            juv::add::add(&uv, &file, &packages, requirements.as_deref())
                .with_context(|| format!("Failed to update {}", file.display()))?;
            println!("Updated `{}`", display_path(&file));
        }
        Commands::Run {
            file,
            jupyter,
            with_args,
            python,
            no_cache,
            no_project,
        } => {
            let uv = require_uv()?;
            let prepared = juv::run::prepare(RunOptions {
                path: file,
                jupyter,
                python,
                with_args,
                no_cache,
                no_project,
            })?;
            if let Some(converted) = &prepared.converted {
                println!("Converted script to notebook `{}`", display_path(converted));
            }

            let status = juv::run::launch(&uv, &prepared)?;
            debug!("Frontend exited with {}", status);
            return Ok(exit_code(status));
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Locate uv, failing with install instructions when it is missing.
fn require_uv() -> Result<Uv> {
    match tools::get_uv_path() {
        Ok(path) => Ok(Uv::new(path)),
        Err(err) => {
            debug!("{}", err);
            Err(anyhow!("'uv' command not found.\n{}", tools::UV_INSTALL_HINT))
        }
    }
}

fn display_path(path: &Path) -> String {
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

/// The child's exit code; 1 when it was killed by a signal.
fn exit_code(status: std::process::ExitStatus) -> ExitCode {
    status
        .code()
        .and_then(|code| u8::try_from(code).ok())
        .map(ExitCode::from)
        .unwrap_or(ExitCode::FAILURE)
}
