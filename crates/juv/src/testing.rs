//! In-process stand-in for uv used by the command tests.

use std::cell::RefCell;
use std::path::Path;
use std::process::ExitStatus;

use juv_env::{PackageManager, RunPlan, ToolResult};
use juv_notebook::{extract_inline_meta, ScriptMetadata};

pub(crate) const STUB_BODY: &str = "\n\ndef main() -> None:\n    print(\"Hello from juv!\")\n";

/// Mimics the parts of `uv init --script` / `uv add --script` juv relies on,
/// and records every call.
#[derive(Default)]
pub(crate) struct FakeUv {
    pub calls: RefCell<Vec<String>>,
    pub plans: RefCell<Vec<RunPlan>>,
}

pub(crate) fn render_block(meta: &ScriptMetadata) -> String {
    let mut block = String::from("# /// script\n");
    if let Some(python) = &meta.requires_python {
        block.push_str(&format!("# requires-python = \"{}\"\n", python));
    }
    if meta.dependencies.is_empty() {
        block.push_str("# dependencies = []\n");
    } else {
        block.push_str("# dependencies = [\n");
        for dep in &meta.dependencies {
            block.push_str(&format!("#     \"{}\",\n", dep));
        }
        block.push_str("# ]\n");
    }
    block.push_str("# ///");
    block
}

impl PackageManager for FakeUv {
    fn init_script(&self, script: &Path, python: Option<&str>) -> ToolResult<()> {
        self.calls.borrow_mut().push(format!("init {:?}", python));
        let meta = ScriptMetadata {
            dependencies: vec![],
            requires_python: Some(format!(">={}", python.unwrap_or("3.12"))),
        };
        std::fs::write(script, format!("{}{}", render_block(&meta), STUB_BODY)).unwrap();
        Ok(())
    }

    fn add_dependencies(
        &self,
        script: &Path,
        packages: &[String],
        requirements: Option<&Path>,
    ) -> ToolResult<()> {
        self.calls
            .borrow_mut()
            .push(format!("add {} {:?}", packages.join(","), requirements));

        let source = std::fs::read_to_string(script).unwrap();
        let mut meta = ScriptMetadata::from_source(&source)
            .unwrap()
            .unwrap_or_default();
        let (_, rest) = extract_inline_meta(&source).unwrap();

        let mut wanted: Vec<String> = packages.to_vec();
        if let Some(requirements) = requirements {
            let listed = std::fs::read_to_string(requirements).unwrap();
            wanted.extend(
                listed
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(String::from),
            );
        }
        for package in wanted {
            if !meta.dependencies.contains(&package) {
                meta.dependencies.push(package);
            }
        }

        std::fs::write(script, format!("{}{}", render_block(&meta), rest)).unwrap();
        Ok(())
    }

    fn tool_run(&self, plan: &RunPlan) -> ToolResult<ExitStatus> {
        self.calls.borrow_mut().push("tool run".to_string());
        self.plans.borrow_mut().push(plan.clone());
        Ok(success())
    }

    fn version(&self) -> ToolResult<String> {
        self.calls.borrow_mut().push("version".to_string());
        Ok("uv 0.5.0 (fake)\n".to_string())
    }
}

#[cfg(unix)]
fn success() -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(0)
}

#[cfg(windows)]
fn success() -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(0)
}
