use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Server-side identifier of an uploaded (or chained) file
///
/// The backend hands out integer ids, but string ids are accepted too so
/// a differently-configured server never breaks deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileId {
    Int(u64),
    Text(String),
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<u64> for FileId {
    fn from(value: u64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for FileId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// A single scalar cell value from a preview head
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl CellValue {
    /// Text used for display, matching and escaping. Null renders empty.
    pub fn display_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<serde_json::Value> for CellValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::Text(s),
            // Nested values are not expected in a head; keep their JSON text
            other => Self::Text(other.to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Self::from(value))
    }
}

static NULL_CELL: CellValue = CellValue::Null;

/// A preview row: column name to scalar value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, CellValue>);

impl Row {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Value for a column; columns missing from the record read as null
    pub fn get(&self, column: &str) -> &CellValue {
        self.0.get(column).unwrap_or(&NULL_CELL)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn text(&self, column: &str) -> String {
        self.get(column).display_text()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Execution mode reported by the backend
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResultMode {
    Find,
    Replace,
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadResult {
    pub file_id: FileId,
    pub filename: String,
    pub is_excel: bool,
    pub columns: Vec<String>,
    pub head: Vec<Row>,
}

/// Advisory planner metadata, display only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentInfo {
    pub intent: ResultMode,
    #[serde(default)]
    pub replacement: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Match statistics for a find run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindStats {
    pub total_matches: u64,
    pub per_column: BTreeMap<String, u64>,
    pub rows_with_hits: u64,
    pub head_hit_row_indices: Option<Vec<usize>>,
}

/// One highlighted example cell produced by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleCell {
    pub count: u64,
    pub html: String,
}

/// A row of backend-highlighted examples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleRow {
    #[serde(rename = "_index")]
    pub index: usize,
    #[serde(flatten)]
    pub cells: BTreeMap<String, ExampleCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FindResult {
    pub pattern: Option<String>,
    pub flags: Option<String>,
    pub applied_columns: Vec<String>,
    pub row_filter: String,
    pub stats: FindStats,
    pub examples: Vec<ExampleRow>,
    pub result_rows_count: Option<u64>,
    pub result_rows_description: Option<String>,
}

/// File identity handed back when a replace result is chained
#[derive(Debug, Clone, PartialEq)]
pub struct ChainedFile {
    pub file_id: FileId,
    pub filename: Option<String>,
    pub columns: Vec<String>,
    pub head: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceResult {
    pub pattern: Option<String>,
    pub flags: Option<String>,
    pub columns: Vec<String>,
    pub processed_head: Vec<Row>,
    pub download_url: Option<String>,
    pub download_filename: Option<String>,
    pub replacements_count: u64,
    pub per_column: BTreeMap<String, u64>,
    pub head_hit_row_indices: Vec<usize>,
    pub chain: Option<ChainedFile>,
}

/// The single live result set
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    Find(FindResult),
    Replace(ReplaceResult),
}

impl ExecutionResult {
    pub fn mode(&self) -> ResultMode {
        match self {
            Self::Find(_) => ResultMode::Find,
            Self::Replace(_) => ResultMode::Replace,
        }
    }
}

/// Severity of a transient notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient user-facing notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    pub fn new(level: ToastLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

impl FromStr for FileId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<u64>() {
            Ok(n) => Self::Int(n),
            Err(_) => Self::Text(s.to_string()),
        })
    }
}
