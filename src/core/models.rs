//! Wire models for the find/replace backend
//!
//! Every optional or legacy key is modelled as `Option` so that a response
//! never fails to decode just because an older server omits a field. The
//! ordered fallbacks between those keys live in [`crate::core::resolve`].

use crate::core::types::{ExampleRow, FileId, IntentInfo, ResultMode, Row, UploadResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `POST /upload` success body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub file_id: FileId,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub is_excel: bool,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub head: Vec<Row>,
}

impl From<UploadResponse> for UploadResult {
    fn from(resp: UploadResponse) -> Self {
        Self {
            file_id: resp.file_id,
            filename: resp.filename,
            is_excel: resp.is_excel,
            columns: resp.columns,
            head: resp.head,
        }
    }
}

/// Error body returned with `400` responses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

/// `POST /execute` request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub file_id: FileId,
    pub instruction: String,
    pub download: bool,
    pub chain: bool,
}

/// Intent metadata; older servers sent just the intent name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntentField {
    Info(IntentInfo),
    Bare(ResultMode),
}

impl IntentField {
    pub fn into_info(self) -> IntentInfo {
        match self {
            Self::Info(info) => info,
            Self::Bare(intent) => IntentInfo {
                intent,
                replacement: None,
                confidence: None,
                reason: None,
            },
        }
    }
}

/// Nested statistics block of a find response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsPayload {
    #[serde(default)]
    pub total_matches: Option<u64>,
    #[serde(default)]
    pub per_column: BTreeMap<String, u64>,
    #[serde(default)]
    pub rows_with_hits: Option<u64>,
    #[serde(default)]
    pub changed_row_indices: Option<Vec<usize>>,
    #[serde(default)]
    pub head_hit_row_indices: Option<Vec<usize>>,
    /// Legacy location of the active row filter
    #[serde(default)]
    pub row_filter: Option<String>,
}

/// Chained file identity returned by a replace with `chain = true`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainPayload {
    pub file_id: FileId,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub is_excel: bool,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub head: Vec<Row>,
}

/// `POST /execute` success body, both modes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteResponse {
    pub mode: ResultMode,
    #[serde(default)]
    pub file_id: Option<FileId>,

    #[serde(default, alias = "pattern")]
    pub regex: Option<String>,
    #[serde(default)]
    pub flags: Option<String>,
    #[serde(default, alias = "pattern_source")]
    pub regex_source: Option<String>,
    #[serde(default, alias = "display_pattern")]
    pub display_regex: Option<String>,
    #[serde(default, alias = "display_pattern_source")]
    pub display_regex_source: Option<String>,
    #[serde(default)]
    pub intent: Option<IntentField>,
    #[serde(default)]
    pub plan_source: Option<String>,

    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub columns_applied: Vec<String>,
    #[serde(default)]
    pub row_filter: Option<String>,
    #[serde(default)]
    pub row_filter_normalized: Option<String>,
    #[serde(default)]
    pub mask_row_indices_head: Option<Vec<usize>>,
    #[serde(default)]
    pub result_rows_count: Option<u64>,
    #[serde(default)]
    pub result_rows_description: Option<String>,

    // find
    #[serde(default)]
    pub stats: Option<StatsPayload>,
    #[serde(default)]
    pub examples: Vec<ExampleRow>,

    // replace
    #[serde(default, alias = "processed_head")]
    pub head: Vec<Row>,
    #[serde(default)]
    pub replacements: Option<u64>,
    #[serde(default)]
    pub per_column: BTreeMap<String, u64>,
    #[serde(default)]
    pub head_hit_row_indices: Option<Vec<usize>>,
    #[serde(default)]
    pub changed_row_indices: Option<Vec<usize>>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub download_filename: Option<String>,
    #[serde(default)]
    pub chain: Option<ChainPayload>,
}
