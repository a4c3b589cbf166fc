//! PEP 723 inline script metadata.
//!
//! A script declares its environment in a comment block:
//!
//! ```text
//! # /// script
//! # requires-python = ">=3.12"
//! # dependencies = [
//! #     "requests",
//! # ]
//! # ///
//! ```
//!
//! Block detection follows the reference regular expression from the PEP.
//! Only blocks of type `script` are considered.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{NotebookError, NotebookResult};

const SCRIPT_BLOCK_TYPE: &str = "script";

fn block_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?m)^# /// (?P<type>[a-zA-Z0-9-]+)$\s(?P<content>(^#(| .*)$\s)+)^# ///$")
            .expect("PEP 723 block regex is valid")
    })
}

/// Byte ranges of every `script` block in `source`.
fn script_blocks(source: &str) -> Vec<(Range<usize>, String)> {
    block_regex()
        .captures_iter(source)
        .filter(|caps| caps.name("type").map(|m| m.as_str()) == Some(SCRIPT_BLOCK_TYPE))
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let content = caps.name("content")?;
            Some((whole.range(), uncomment(content.as_str())))
        })
        .collect()
}

/// Strip the leading `# ` (or bare `#`) from every line of a block body.
fn uncomment(content: &str) -> String {
    content
        .split_inclusive('\n')
        .map(|line| {
            line.strip_prefix("# ")
                .or_else(|| line.strip_prefix('#'))
                .unwrap_or(line)
        })
        .collect()
}

fn single_block(source: &str) -> NotebookResult<Option<(Range<usize>, String)>> {
    let mut blocks = script_blocks(source);
    if blocks.len() > 1 {
        return Err(NotebookError::MultipleScriptBlocks);
    }
    Ok(blocks.pop())
}

/// Whether `source` contains a `# /// script` block.
pub fn includes_inline_metadata(source: &str) -> bool {
    !script_blocks(source).is_empty()
}

/// The TOML body of the `script` block in `source`, with comment markers removed.
pub fn parse_inline_script_metadata(source: &str) -> NotebookResult<Option<String>> {
    Ok(single_block(source)?.map(|(_, toml)| toml))
}

/// Split a script into its metadata block (verbatim, comments included) and
/// the remaining code.
pub fn extract_inline_meta(script: &str) -> NotebookResult<(Option<String>, String)> {
    match single_block(script)? {
        Some((range, _)) => {
            let block = script[range.clone()].to_string();
            let rest = format!("{}{}", &script[..range.start], &script[range.end..]);
            Ok((Some(block), rest))
        }
        None => Ok((None, script.to_string())),
    }
}

/// Parsed contents of a `script` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptMetadata {
    /// PEP 508 dependency specifiers.
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Python version constraint, e.g. `">=3.12"`.
    #[serde(rename = "requires-python", default)]
    pub requires_python: Option<String>,
}

impl ScriptMetadata {
    pub fn from_toml(toml: &str) -> NotebookResult<Self> {
        Ok(toml::from_str(toml)?)
    }

    /// Parse the `script` block of `source`, if present.
    pub fn from_source(source: &str) -> NotebookResult<Option<Self>> {
        match parse_inline_script_metadata(source)? {
            Some(toml) => Ok(Some(Self::from_toml(&toml)?)),
            None => Ok(None),
        }
    }
}
