//! End-to-end tests of the `juv` binary against a fake `uv` on `PATH`.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

/// Logs its argv, then imitates the bits of uv that juv calls.
const FAKE_UV: &str = r##"#!/bin/sh
echo "$@" >> "$FAKE_UV_LOG"
case "$1" in
  --version)
    echo "uv 0.5.0 (fake)"
    ;;
  init)
    for last; do :; done
    printf '# /// script\n# requires-python = ">=3.12"\n# dependencies = []\n# ///\n\n\ndef main() -> None:\n    print("Hello from juv!")\n' > "$last"
    ;;
  add)
    shift 2
    if [ "$1" = "--requirements" ]; then shift 2; fi
    shift
    script="$1"
    shift
    {
      echo '# /// script'
      echo '# requires-python = ">=3.12"'
      echo '# dependencies = ['
      for pkg in "$@"; do echo "#     \"$pkg\","; done
      echo '# ]'
      echo '# ///'
    } > "$script"
    ;;
  tool)
    exit "${FAKE_UV_EXIT:-0}"
    ;;
esac
"##;

struct Sandbox {
    work: TempDir,
    bin: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let bin = tempfile::tempdir().unwrap();
        let uv = bin.path().join("uv");
        fs::write(&uv, FAKE_UV).unwrap();
        fs::set_permissions(&uv, fs::Permissions::from_mode(0o755)).unwrap();

        Self {
            work: tempfile::tempdir().unwrap(),
            bin,
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.work.path().join(name)
    }

    fn log(&self) -> PathBuf {
        self.bin.path().join("uv.log")
    }

    fn juv_with_path(&self, path: &str) -> Command {
        let mut cmd = Command::cargo_bin("juv").unwrap();
        cmd.current_dir(self.work.path())
            .env("PATH", path)
            .env("FAKE_UV_LOG", self.log())
            .env_remove("JUV_JUPYTER")
            .env_remove("RUST_LOG");
        cmd
    }

    fn juv(&self) -> Command {
        self.juv_with_path(&format!("{}:/usr/bin:/bin", self.bin.path().display()))
    }

    fn uv_calls(&self) -> Vec<String> {
        fs::read_to_string(self.log())
            .unwrap_or_default()
            .lines()
            .map(String::from)
            .collect()
    }

    fn init(&self, name: &str) {
        self.juv().args(["init", name]).assert().success();
    }
}

fn read_cells(path: &Path) -> Vec<Value> {
    let nb: Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    nb["cells"].as_array().unwrap().clone()
}

fn cell_source(cell: &Value) -> String {
    cell["source"]
        .as_array()
        .unwrap()
        .iter()
        .map(|line| line.as_str().unwrap())
        .collect()
}

#[test]
fn version_does_not_need_uv() {
    let sandbox = Sandbox::new();
    let empty = tempfile::tempdir().unwrap();

    sandbox
        .juv_with_path(&empty.path().display().to_string())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::diff(format!(
            "juv {}\n",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn version_flag_matches_version_command() {
    let sandbox = Sandbox::new();

    sandbox
        .juv()
        .arg("--version")
        .assert()
        .code(0)
        .stdout(predicate::str::diff(format!(
            "juv {}\n",
            env!("CARGO_PKG_VERSION")
        )));
    assert!(sandbox.uv_calls().is_empty());
}

#[test]
fn info_prints_both_versions() {
    let sandbox = Sandbox::new();

    sandbox
        .juv()
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::diff(format!(
            "juv {}\nuv 0.5.0 (fake)\n",
            env!("CARGO_PKG_VERSION")
        )));
    assert_eq!(sandbox.uv_calls(), vec!["--version"]);
}

#[test]
fn init_rejects_non_notebook_extension() {
    let sandbox = Sandbox::new();

    sandbox
        .juv()
        .args(["init", "foo.txt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("`.ipynb` extension"));

    assert!(!sandbox.path("foo.txt").exists());
    assert_eq!(fs::read_dir(sandbox.work.path()).unwrap().count(), 0);
    assert!(sandbox.uv_calls().is_empty());
}

#[test]
fn init_creates_single_hidden_cell() {
    let sandbox = Sandbox::new();

    sandbox
        .juv()
        .args(["init", "foo.ipynb"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Initialized notebook at `"))
        .stdout(predicate::str::contains("foo.ipynb`"));

    let cells = read_cells(&sandbox.path("foo.ipynb"));
    assert_eq!(cells.len(), 1);
    assert_eq!(cells[0]["cell_type"], "code");
    assert_eq!(cells[0]["metadata"]["jupyter"]["source_hidden"], true);

    let source = cell_source(&cells[0]);
    assert!(source.starts_with("# /// script\n"));
    assert!(source.ends_with("print(\"Hello from juv!\")"));

    let calls = sandbox.uv_calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].starts_with("init --quiet --script "));
}

#[test]
fn init_without_path_uses_untitled() {
    let sandbox = Sandbox::new();
    fs::write(sandbox.path("Untitled.ipynb"), "{}").unwrap();

    sandbox.juv().arg("init").assert().success();

    assert!(sandbox.path("Untitled1.ipynb").exists());
    assert_eq!(fs::read_to_string(sandbox.path("Untitled.ipynb")).unwrap(), "{}");
}

#[test]
fn init_with_packages() {
    let sandbox = Sandbox::new();

    sandbox
        .juv()
        .args(["init", "--with", "requests", "--python", "3.11", "deps.ipynb"])
        .assert()
        .success();

    let cells = read_cells(&sandbox.path("deps.ipynb"));
    assert_eq!(cells.len(), 1);
    assert!(cell_source(&cells[0]).contains("#     \"requests\",\n"));

    let calls = sandbox.uv_calls();
    assert!(calls[0].starts_with("init --quiet --python 3.11 --script "));
    assert!(calls[1].starts_with("add --quiet --script "));
    assert!(calls[1].ends_with(" requests"));
}

#[test]
fn add_updates_notebook() {
    let sandbox = Sandbox::new();
    sandbox.init("nb.ipynb");

    sandbox
        .juv()
        .args(["add", "nb.ipynb", "numpy", "polars>=1"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Updated `"));

    let cells = read_cells(&sandbox.path("nb.ipynb"));
    assert_eq!(cells.len(), 1);
    assert_eq!(cells[0]["metadata"]["jupyter"]["source_hidden"], true);
    let source = cell_source(&cells[0]);
    assert!(source.contains("\"numpy\""));
    assert!(source.contains("\"polars>=1\""));

    // No scratch files left behind.
    assert_eq!(fs::read_dir(sandbox.work.path()).unwrap().count(), 1);
}

#[test]
fn add_requires_existing_file() {
    let sandbox = Sandbox::new();

    sandbox
        .juv()
        .args(["add", "missing.ipynb", "numpy"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
    assert!(sandbox.uv_calls().is_empty());
}

#[test]
fn run_passes_plan_to_uv_and_returns_its_exit_code() {
    let sandbox = Sandbox::new();
    sandbox.init("nb.ipynb");

    sandbox
        .juv()
        .args(["run", "nb.ipynb", "--jupyter=notebook@7", "--with", "rich"])
        .env("FAKE_UV_EXIT", "3")
        .assert()
        .code(3);

    assert_eq!(
        sandbox.uv_calls().last().unwrap(),
        "tool run --isolated --python=>=3.12 --with=setuptools --with=notebook==7 \
         --with=rich jupyter notebook nb.ipynb"
    );
}

#[test]
fn run_reads_frontend_from_env() {
    let sandbox = Sandbox::new();
    sandbox.init("nb.ipynb");

    sandbox
        .juv()
        .args(["run", "nb.ipynb", "--no-cache"])
        .env("JUV_JUPYTER", "nbclassic")
        .assert()
        .success();

    let call = sandbox.uv_calls().last().unwrap().clone();
    assert!(call.starts_with("tool run --isolated --no-cache "));
    assert!(call.ends_with("--with=nbclassic jupyter nbclassic nb.ipynb"));
}

#[test]
fn run_rejects_unknown_frontend() {
    let sandbox = Sandbox::new();
    sandbox.init("nb.ipynb");

    sandbox
        .juv()
        .args(["run", "nb.ipynb", "--jupyter", "voila"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("voila"));
}

#[test]
fn run_converts_scripts() {
    let sandbox = Sandbox::new();
    fs::write(
        sandbox.path("explore.py"),
        "# /// script\n# dependencies = [\"httpx\"]\n# ///\n\n# %%\nimport httpx\n",
    )
    .unwrap();

    sandbox
        .juv()
        .args(["run", "explore.py"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Converted script to notebook `"));

    assert!(sandbox.path("explore.ipynb").exists());
    assert!(sandbox
        .uv_calls()
        .last()
        .unwrap()
        .ends_with("--with=httpx jupyter lab explore.ipynb"));
}

#[test]
fn legacy_lab_command_is_rewritten() {
    let sandbox = Sandbox::new();
    sandbox.init("nb.ipynb");

    sandbox
        .juv()
        .args(["lab", "nb.ipynb"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Warning: The command 'lab' is deprecated. Please use 'run' with `--jupyter=lab`",
        ));

    assert!(sandbox
        .uv_calls()
        .last()
        .unwrap()
        .ends_with("--with=jupyterlab jupyter lab nb.ipynb"));
}

#[test]
fn legacy_command_defers_to_explicit_jupyter_flag() {
    let sandbox = Sandbox::new();
    sandbox.init("nb.ipynb");

    sandbox
        .juv()
        .args(["lab", "nb.ipynb", "--jupyter=notebook"])
        .assert()
        .success();

    assert!(sandbox
        .uv_calls()
        .last()
        .unwrap()
        .ends_with("--with=notebook jupyter notebook nb.ipynb"));
}

#[test]
fn missing_uv_exits_with_install_hint() {
    let sandbox = Sandbox::new();
    let empty = tempfile::tempdir().unwrap();

    sandbox
        .juv_with_path(&empty.path().display().to_string())
        .args(["init", "nb.ipynb"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: 'uv' command not found."))
        .stderr(predicate::str::contains("https://github.com/astral-sh/uv"));

    assert!(!sandbox.path("nb.ipynb").exists());
}
