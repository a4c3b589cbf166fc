//! Minimal nbformat v4 document model.
//!
//! Only the fields juv reads or writes are typed. Everything else (notebook
//! metadata, cell attachments, unknown keys) is carried through untouched so
//! that rewriting a notebook after `juv add` does not lose information.

use std::io::Write;
use std::path::Path;

use log::info;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::pep723::{includes_inline_metadata, parse_inline_script_metadata, ScriptMetadata};
use crate::NotebookResult;

/// Major nbformat version written by juv.
pub const NBFORMAT: u32 = 4;

/// Minor nbformat version written by juv (cell ids are required from 4.5).
pub const NBFORMAT_MINOR: u32 = 5;

/// A Jupyter notebook document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub nbformat: u32,
    pub nbformat_minor: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The three nbformat cell kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    Code,
    Markdown,
    Raw,
}

/// A single notebook cell, tagged by `cell_type` on disk.
///
/// Fields are declared in the key order nbformat itself writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
pub enum Cell {
    Code {
        execution_count: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default)]
        metadata: Map<String, Value>,
        #[serde(default)]
        outputs: Vec<Value>,
        #[serde(deserialize_with = "deserialize_source")]
        source: Vec<String>,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    Markdown {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default)]
        metadata: Map<String, Value>,
        #[serde(deserialize_with = "deserialize_source")]
        source: Vec<String>,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    Raw {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default)]
        metadata: Map<String, Value>,
        #[serde(deserialize_with = "deserialize_source")]
        source: Vec<String>,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
}

/// nbformat allows a multiline string either as one string or a list of lines.
fn deserialize_source<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MultilineString {
        Single(String),
        Lines(Vec<String>),
    }

    Ok(match MultilineString::deserialize(deserializer)? {
        MultilineString::Single(text) => split_lines(&text),
        MultilineString::Lines(lines) => lines,
    })
}

/// Split text into nbformat source lines, keeping the line endings.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_string).collect()
}

/// Generate a cell id the way nbformat does (first 8 hex chars of a UUID4).
fn new_cell_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

impl Cell {
    /// Create a new code cell with no outputs.
    pub fn code(source: &str) -> Self {
        Cell::Code {
            execution_count: None,
            id: Some(new_cell_id()),
            metadata: Map::new(),
            outputs: Vec::new(),
            source: split_lines(source),
            extra: Map::new(),
        }
    }

    /// Create a new markdown cell.
    pub fn markdown(source: &str) -> Self {
        Cell::Markdown {
            id: Some(new_cell_id()),
            metadata: Map::new(),
            source: split_lines(source),
            extra: Map::new(),
        }
    }

    /// Mark the cell's source as collapsed in Jupyter frontends.
    pub fn hidden(mut self) -> Self {
        self.set_hidden(true);
        self
    }

    pub fn cell_type(&self) -> CellType {
        match self {
            Cell::Code { .. } => CellType::Code,
            Cell::Markdown { .. } => CellType::Markdown,
            Cell::Raw { .. } => CellType::Raw,
        }
    }

    pub fn is_code(&self) -> bool {
        matches!(self, Cell::Code { .. })
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Cell::Code { id, .. } | Cell::Markdown { id, .. } | Cell::Raw { id, .. } => {
                id.as_deref()
            }
        }
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        match self {
            Cell::Code { metadata, .. }
            | Cell::Markdown { metadata, .. }
            | Cell::Raw { metadata, .. } => metadata,
        }
    }

    fn metadata_mut(&mut self) -> &mut Map<String, Value> {
        match self {
            Cell::Code { metadata, .. }
            | Cell::Markdown { metadata, .. }
            | Cell::Raw { metadata, .. } => metadata,
        }
    }

    /// Source lines as stored in the document.
    pub fn source_lines(&self) -> &[String] {
        match self {
            Cell::Code { source, .. } | Cell::Markdown { source, .. } | Cell::Raw { source, .. } => {
                source
            }
        }
    }

    /// The full source text of the cell.
    pub fn source(&self) -> String {
        self.source_lines().concat()
    }

    /// Replace the whole source of the cell.
    pub fn set_source(&mut self, text: &str) {
        let lines = split_lines(text);
        match self {
            Cell::Code { source, .. } | Cell::Markdown { source, .. } | Cell::Raw { source, .. } => {
                *source = lines
            }
        }
    }

    /// Whether `metadata.jupyter.source_hidden` is set.
    pub fn is_hidden(&self) -> bool {
        self.metadata()
            .get("jupyter")
            .and_then(|j| j.get("source_hidden"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        let metadata = self.metadata_mut();
        if hidden {
            let jupyter = metadata
                .entry("jupyter")
                .or_insert_with(|| Value::Object(Map::new()));
            if !jupyter.is_object() {
                *jupyter = Value::Object(Map::new());
            }
            if let Value::Object(jupyter) = jupyter {
                jupyter.insert("source_hidden".to_string(), Value::Bool(true));
            }
        } else if let Some(Value::Object(jupyter)) = metadata.get_mut("jupyter") {
            jupyter.remove("source_hidden");
            if jupyter.is_empty() {
                metadata.remove("jupyter");
            }
        }
    }
}

impl Notebook {
    /// Create an nbformat 4.5 notebook holding the given cells.
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            metadata: Map::new(),
            nbformat: NBFORMAT,
            nbformat_minor: NBFORMAT_MINOR,
            extra: Map::new(),
        }
    }

    /// Index of the first code cell carrying a `# /// script` block.
    pub fn inline_metadata_cell(&self) -> Option<usize> {
        self.cells
            .iter()
            .position(|cell| cell.is_code() && includes_inline_metadata(&cell.source()))
    }

    /// Parsed inline script metadata of the notebook, if it has any.
    pub fn script_metadata(&self) -> NotebookResult<Option<ScriptMetadata>> {
        let Some(index) = self.inline_metadata_cell() else {
            return Ok(None);
        };
        match parse_inline_script_metadata(&self.cells[index].source())? {
            Some(toml) => Ok(Some(ScriptMetadata::from_toml(&toml)?)),
            None => Ok(None),
        }
    }
}

/// Read and parse a notebook from disk.
pub fn read_ipynb(path: &Path) -> NotebookResult<Notebook> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Serialise a notebook the way nbformat writes it: one-space indent and a
/// trailing newline.
pub fn to_ipynb_string(notebook: &Notebook) -> NotebookResult<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    notebook.serialize(&mut serializer)?;
    buf.push(b'\n');
    // serde_json only ever emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Temp file in `dir` carrying the mode `path` should end up with: the
/// existing file's permissions, or the umask default for a new notebook.
fn notebook_tempfile(dir: &Path, path: &Path) -> std::io::Result<tempfile::NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".juv-").suffix(".ipynb");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let file = builder.tempfile_in(dir)?;

    if let Ok(existing) = std::fs::metadata(path) {
        file.as_file().set_permissions(existing.permissions())?;
    }
    Ok(file)
}

/// Write a notebook to `path`, replacing any existing file.
///
/// The document is written to a temporary file in the same directory and
/// renamed into place, so readers never observe a half-written notebook.
pub fn write_ipynb(notebook: &Notebook, path: &Path) -> NotebookResult<()> {
    let content = to_ipynb_string(notebook)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = notebook_tempfile(dir, path)?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    file.persist(path).map_err(|e| e.error)?;

    info!("Wrote notebook with {} cells to {:?}", notebook.cells.len(), path);
    Ok(())
}
