//! `juv version` and `juv info`.

use juv_env::PackageManager;

use crate::JuvResult;

/// `juv <version>`, with no dependency on uv.
pub fn version_line() -> String {
    format!("juv {}", env!("CARGO_PKG_VERSION"))
}

/// juv's version followed by the version uv reports for itself.
pub fn info<P: PackageManager + ?Sized>(pm: &P) -> JuvResult<String> {
    let uv = pm.version()?;
    Ok(format!("{}\n{}", version_line(), uv.trim_end()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeUv;

    #[test]
    fn test_version_line() {
        assert_eq!(version_line(), format!("juv {}", env!("CARGO_PKG_VERSION")));
        assert!(version_line().starts_with("juv 0."));
    }

    #[test]
    fn test_info_reports_both_versions() {
        let uv = FakeUv::default();
        let report = info(&uv).unwrap();

        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines, vec![version_line().as_str(), "uv 0.5.0 (fake)"]);
        assert!(!report.ends_with('\n'));
        assert_eq!(*uv.calls.borrow(), vec!["version"]);
    }
}
