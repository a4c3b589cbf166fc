//! Rewrite of the deprecated `juv lab|notebook|nbclassic <file>` forms.
//!
//! `juv lab nb.ipynb` becomes `juv run --jupyter=lab nb.ipynb`. The rewrite
//! happens on raw argv before clap sees it, and the frontend is handed back
//! to the caller rather than stashed in the environment.

use std::ffi::{OsStr, OsString};

use juv_env::Runtime;

/// Result of [`upgrade_legacy_jupyter_command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyRewrite {
    pub args: Vec<OsString>,
    /// The deprecated command as typed (e.g. `notebook@7`), if one was found.
    pub jupyter: Option<String>,
}

fn is_flag(arg: &OsStr) -> bool {
    arg.to_str().is_some_and(|s| s.starts_with('-'))
}

fn takes_value(arg: &OsStr) -> bool {
    arg.to_str()
        .is_some_and(|s| s.starts_with("--") && s.len() > 2 && !s.contains('='))
}

fn has_jupyter_flag(args: &[OsString]) -> bool {
    args.iter()
        .take_while(|arg| arg.as_os_str() != "--")
        .filter_map(|arg| arg.to_str())
        .any(|arg| arg == "--jupyter" || arg.starts_with("--jupyter="))
}

/// Find the subcommand position in `args` (argv[0] included) and, if it is a
/// frontend specifier, replace it with `run --jupyter=<specifier>`.
pub fn upgrade_legacy_jupyter_command<I, T>(args: I) -> LegacyRewrite
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();

    let position = args
        .iter()
        .enumerate()
        .skip(1)
        .take_while(|(_, arg)| arg.as_os_str() != "--")
        .find(|&(i, arg)| !is_flag(arg) && !(i > 1 && takes_value(&args[i - 1])))
        .map(|(i, _)| i);

    let jupyter = position.and_then(|i| {
        let candidate = args[i].to_str()?;
        candidate.parse::<Runtime>().ok()?;
        Some((i, candidate.to_string()))
    });

    match jupyter {
        Some((i, jupyter)) => {
            args[i] = "run".into();
            // an explicit --jupyter later on wins over the legacy command
            if !has_jupyter_flag(&args[i + 1..]) {
                args.insert(i + 1, format!("--jupyter={}", jupyter).into());
            }
            LegacyRewrite {
                args,
                jupyter: Some(jupyter),
            }
        }
        None => LegacyRewrite { args, jupyter: None },
    }
}
