//! View state and its transitions
//!
//! Everything the front end shows is owned by one [`ViewState`]. It only
//! changes through [`ViewState::apply`], one [`StateEvent`] at a time, and
//! each successful response replaces the affected part wholesale.

use crate::core::models::ExecuteResponse;
use crate::core::pagination::{PageNav, Pager, page_mask};
use crate::core::pattern::{Matcher, effective_highlight_pattern, highlight_matcher};
use crate::core::resolve;
use crate::core::types::{
    ChainedFile, ExecutionResult, FindResult, FindStats, IntentInfo, ReplaceResult, ResultMode,
    Row, Toast, ToastLevel, UploadResult,
};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Default page size choices
pub const DEFAULT_PAGE_SIZES: [usize; 4] = [25, 50, 100, 200];

/// Which request is outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum BusyKind {
    Upload,
    Execute,
}

/// A state change waiting for the user's explicit consent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    EnableAutoChain,
}

impl Confirmation {
    pub fn prompt(&self) -> &'static str {
        match self {
            Confirmation::EnableAutoChain => {
                "Enable auto-chain? Each successful replace will become the new base file for the next instruction."
            }
        }
    }
}

/// Where the head hit set came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum HitSource {
    Server,
    Client,
    None,
}

/// Events that drive [`ViewState`]
#[derive(Debug, Clone)]
pub enum StateEvent {
    UploadStarted,
    UploadSucceeded(UploadResult),
    UploadFailed(String),
    FileRemoved,
    ExecuteStarted,
    ExecuteSucceeded {
        instruction: String,
        /// Whether the request asked the server for a chained file
        chained: bool,
        response: Box<ExecuteResponse>,
    },
    ExecuteFailed(String),
    AutoChainRequested(bool),
    ConfirmationResolved(bool),
    InstructionChanged(String),
    Page(PageNav),
    PageSizeChanged(usize),
    PageSizeCycled,
    ShowHitsOnlyToggled,
    RegexInfoToggled,
}

/// A committed execute response, reconciled into display form
#[derive(Debug, Clone)]
pub struct ResultView {
    pub instruction: String,
    pub result: ExecutionResult,
    pub pattern: Option<String>,
    pub flags: Option<String>,
    pub pattern_source: Option<String>,
    pub display_pattern: Option<String>,
    pub display_pattern_source: Option<String>,
    pub intent: Option<IntentInfo>,
    pub plan_source: Option<String>,
    pub row_filter: String,
    pub result_rows_count: Option<u64>,
    pub result_rows_description: Option<String>,
    /// Head positions that matched (find) or changed (replace)
    pub head_hits: Option<BTreeSet<usize>>,
    pub hit_source: HitSource,
    matcher: Option<Matcher>,
}

impl ResultView {
    /// Reconcile a raw response; `base` is the head the find ran against
    pub fn from_response(
        instruction: String,
        resp: ExecuteResponse,
        base: Option<&UploadResult>,
    ) -> Self {
        let (pattern, pattern_source) = resolve::pattern(&resp);
        let (display_pattern, display_pattern_source) = match resolve::display_pattern(&resp) {
            Some((p, s)) => (Some(p), s),
            None => (None, None),
        };
        let flags = resp.flags.clone();
        let highlight = effective_highlight_pattern(pattern.as_deref(), display_pattern.as_deref());
        let matcher = highlight_matcher(highlight, flags.as_deref());

        let row_filter = resolve::row_filter(&resp);
        let result_rows_count = resolve::result_rows_count(&resp);
        let intent = resp.intent.clone().map(|i| i.into_info());

        let (result, head_hits, hit_source) = match resp.mode {
            ResultMode::Find => {
                let applied_columns = resolve::applied_columns(&resp);
                let stats = resp.stats.clone().unwrap_or_default();
                let server_hits = resolve::find_head_hits(&resp);
                let (head_hits, hit_source) = match server_hits {
                    Some(hits) => (Some(hits), HitSource::Server),
                    None => match (&matcher, base) {
                        (Some(rx), Some(upload)) => {
                            let cols = match_columns(&applied_columns, &upload.columns);
                            (
                                Some(client_side_hits(&upload.head, &cols, rx)),
                                HitSource::Client,
                            )
                        }
                        _ => (None, HitSource::None),
                    },
                };
                let find = FindResult {
                    pattern: pattern.clone(),
                    flags: flags.clone(),
                    applied_columns,
                    row_filter: row_filter.clone(),
                    stats: FindStats {
                        total_matches: stats.total_matches.unwrap_or_default(),
                        per_column: resolve::per_column(&resp),
                        rows_with_hits: stats.rows_with_hits.unwrap_or_default(),
                        head_hit_row_indices: stats.head_hit_row_indices.clone(),
                    },
                    examples: resp.examples.clone(),
                    result_rows_count,
                    result_rows_description: resp.result_rows_description.clone(),
                };
                (ExecutionResult::Find(find), head_hits, hit_source)
            }
            ResultMode::Replace => {
                let hits = resolve::replace_head_hits(&resp);
                let columns = if resp.columns.is_empty() {
                    base.map(|u| u.columns.clone()).unwrap_or_default()
                } else {
                    resp.columns.clone()
                };
                let chain = resp.chain.clone().map(|c| ChainedFile {
                    file_id: c.file_id,
                    filename: c.filename,
                    columns: c.columns,
                    head: c.head,
                });
                let replace = ReplaceResult {
                    pattern: pattern.clone(),
                    flags: flags.clone(),
                    columns,
                    processed_head: resp.head.clone(),
                    download_url: resp.download_url.clone(),
                    download_filename: resp.download_filename.clone(),
                    replacements_count: resp.replacements.unwrap_or_default(),
                    per_column: resolve::per_column(&resp),
                    head_hit_row_indices: hits.iter().copied().collect(),
                    chain,
                };
                (ExecutionResult::Replace(replace), Some(hits), HitSource::Server)
            }
        };

        Self {
            instruction,
            result,
            pattern,
            flags,
            pattern_source,
            display_pattern,
            display_pattern_source,
            intent,
            plan_source: resp.plan_source,
            row_filter,
            result_rows_count,
            result_rows_description: resp.result_rows_description,
            head_hits,
            hit_source,
            matcher,
        }
    }

    /// Compiled highlight matcher; absent for match-all or unusable patterns
    pub fn matcher(&self) -> Option<&Matcher> {
        self.matcher.as_ref()
    }

    pub fn mode(&self) -> ResultMode {
        self.result.mode()
    }

    pub fn download_url(&self) -> Option<&str> {
        match &self.result {
            ExecutionResult::Replace(r) => r.download_url.as_deref(),
            ExecutionResult::Find(_) => None,
        }
    }
}

/// Columns a matcher applies to: the applied set restricted to known columns
fn match_columns(applied: &[String], all: &[String]) -> Vec<String> {
    let known: Vec<String> = applied
        .iter()
        .filter(|c| all.contains(c))
        .cloned()
        .collect();
    if known.is_empty() {
        all.to_vec()
    } else {
        known
    }
}

/// Re-derive head hits locally when the server sent no mask
fn client_side_hits(head: &[Row], columns: &[String], matcher: &Matcher) -> BTreeSet<usize> {
    head.iter()
        .enumerate()
        .filter(|(_, row)| {
            columns
                .iter()
                .any(|c| matcher.is_match(&row.text(c)).unwrap_or(false))
        })
        .map(|(i, _)| i)
        .collect()
}

/// Rows to show before pagination, with their head positions
#[derive(Debug)]
pub struct Preview<'a> {
    pub columns: &'a [String],
    /// `(head index, row)` in display order
    pub rows: Vec<(usize, &'a Row)>,
    pub hits: BTreeSet<usize>,
    pub matcher: Option<&'a Matcher>,
    pub match_columns: Vec<String>,
    pub whole_row: bool,
}

/// One page of the preview, ready for a renderer
#[derive(Debug)]
pub struct PageView<'a> {
    pub columns: &'a [String],
    pub rows: Vec<&'a Row>,
    pub head_indices: Vec<usize>,
    /// Page-local positions of hit rows
    pub mask: BTreeSet<usize>,
    pub matcher: Option<&'a Matcher>,
    pub match_columns: Vec<String>,
    pub whole_row: bool,
    pub page: usize,
    pub page_count: usize,
    pub total: usize,
}

/// All mutable UI state
#[derive(Debug, Clone)]
pub struct ViewState {
    pub upload: Option<UploadResult>,
    pub result: Option<ResultView>,
    pub instruction: String,
    pub auto_chain: bool,
    pub pending_confirmation: Option<Confirmation>,
    pub show_hits_only: bool,
    pub show_regex_info: bool,
    pub pager: Pager,
    pub page_sizes: Vec<usize>,
    busy: Option<BusyKind>,
    toasts: Vec<Toast>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(100, DEFAULT_PAGE_SIZES.to_vec())
    }
}

impl ViewState {
    pub fn new(page_size: usize, page_sizes: Vec<usize>) -> Self {
        Self {
            upload: None,
            result: None,
            instruction: String::new(),
            auto_chain: false,
            pending_confirmation: None,
            show_hits_only: false,
            show_regex_info: false,
            pager: Pager::new(page_size),
            page_sizes,
            busy: None,
            toasts: Vec::new(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_some()
    }

    pub fn busy_kind(&self) -> Option<BusyKind> {
        self.busy
    }

    pub fn push_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toasts.push(Toast::new(level, message));
    }

    /// Toasts queued since the last drain, oldest first
    pub fn drain_toasts(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }

    fn set_busy(&mut self, busy: Option<BusyKind>) {
        self.busy = busy;
        self.pager.disabled = busy.is_some();
    }

    /// Apply one event
    pub fn apply(&mut self, event: StateEvent) {
        match event {
            StateEvent::UploadStarted => self.start(BusyKind::Upload),
            StateEvent::UploadSucceeded(upload) => {
                info!(
                    "Uploaded {} as file {} ({} columns, {} head rows)",
                    upload.filename,
                    upload.file_id,
                    upload.columns.len(),
                    upload.head.len()
                );
                self.set_busy(None);
                self.push_toast(ToastLevel::Success, format!("Uploaded {}", upload.filename));
                self.upload = Some(upload);
                self.result = None;
                self.pager.reset();
            }
            StateEvent::UploadFailed(detail) => {
                warn!("Upload failed: {}", detail);
                self.set_busy(None);
                self.push_toast(ToastLevel::Error, "Upload failed");
            }
            StateEvent::FileRemoved => {
                if self.is_busy() {
                    debug!("Ignoring file removal while a request is in flight");
                    return;
                }
                self.upload = None;
                self.result = None;
                self.pager.reset();
            }
            StateEvent::ExecuteStarted => self.start(BusyKind::Execute),
            StateEvent::ExecuteSucceeded {
                instruction,
                chained,
                response,
            } => {
                self.set_busy(None);
                self.commit(instruction, chained, *response);
            }
            StateEvent::ExecuteFailed(detail) => {
                warn!("Execute failed: {}", detail);
                self.set_busy(None);
                self.push_toast(ToastLevel::Error, "Execution failed");
            }
            StateEvent::AutoChainRequested(enable) => {
                if self.is_busy() {
                    debug!("Ignoring auto-chain change while a request is in flight");
                    self.push_toast(
                        ToastLevel::Warning,
                        "Auto-chain can't change while a request is running",
                    );
                    return;
                }
                if enable && !self.auto_chain {
                    self.pending_confirmation = Some(Confirmation::EnableAutoChain);
                } else if !enable {
                    self.auto_chain = false;
                    if self.pending_confirmation == Some(Confirmation::EnableAutoChain) {
                        self.pending_confirmation = None;
                    }
                }
            }
            StateEvent::ConfirmationResolved(accepted) => {
                match self.pending_confirmation.take() {
                    Some(Confirmation::EnableAutoChain) if accepted && self.is_busy() => {
                        self.push_toast(
                            ToastLevel::Warning,
                            "Auto-chain can't change while a request is running",
                        );
                    }
                    Some(Confirmation::EnableAutoChain) if accepted => {
                        self.auto_chain = true;
                        self.push_toast(
                            ToastLevel::Info,
                            "Auto-chain on: replace results become the new base",
                        );
                    }
                    _ => {}
                }
            }
            StateEvent::InstructionChanged(text) => self.instruction = text,
            StateEvent::Page(nav) => {
                let total = self.preview_len();
                self.pager.navigate(nav, total);
            }
            StateEvent::PageSizeChanged(size) => {
                if !self.pager.disabled {
                    self.pager.set_page_size(size);
                }
            }
            StateEvent::PageSizeCycled => {
                if !self.pager.disabled {
                    let choices = self.page_sizes.clone();
                    self.pager.cycle_page_size(&choices);
                }
            }
            StateEvent::ShowHitsOnlyToggled => {
                if !self.pager.disabled {
                    self.show_hits_only = !self.show_hits_only;
                    self.pager.reset();
                }
            }
            StateEvent::RegexInfoToggled => self.show_regex_info = !self.show_regex_info,
        }
    }

    fn start(&mut self, kind: BusyKind) {
        if let Some(current) = self.busy {
            warn!("{} requested while {} is in flight", kind, current);
            return;
        }
        self.set_busy(Some(kind));
    }

    /// Replace the live result set with a reconciled response
    fn commit(&mut self, instruction: String, chained: bool, response: ExecuteResponse) {
        let view = ResultView::from_response(instruction, response, self.upload.as_ref());
        match &view.result {
            ExecutionResult::Find(find) => {
                let n = find.stats.total_matches;
                self.push_toast(
                    ToastLevel::Success,
                    format!("Found {} match{}", n, if n == 1 { "" } else { "es" }),
                );
            }
            ExecutionResult::Replace(replace) => {
                let n = replace.replacements_count;
                self.push_toast(
                    ToastLevel::Success,
                    format!("Replaced {} value{}", n, if n == 1 { "" } else { "s" }),
                );
                if chained {
                    self.adopt_chain(replace.chain.as_ref());
                }
            }
        }
        debug!(
            "Committed {} result (hits from {}, row filter {:?})",
            view.mode(),
            view.hit_source,
            view.row_filter
        );
        self.result = Some(view);
        self.pager.reset();
    }

    fn adopt_chain(&mut self, chain: Option<&ChainedFile>) {
        match (chain, self.upload.as_mut()) {
            (Some(chain), Some(upload)) => {
                info!("Chained result {} replaces file {}", chain.file_id, upload.file_id);
                upload.file_id = chain.file_id.clone();
                upload.columns = chain.columns.clone();
                upload.head = chain.head.clone();
                if let Some(name) = &chain.filename {
                    upload.filename = name.clone();
                }
                upload.is_excel = false;
                self.push_toast(
                    ToastLevel::Success,
                    format!("Result set as new base (file {})", chain.file_id),
                );
            }
            _ => {
                self.push_toast(
                    ToastLevel::Warning,
                    "Chaining was requested, but no chained file was returned",
                );
            }
        }
    }

    /// Rows to display before pagination
    pub fn preview(&self) -> Preview<'_> {
        let empty: &[String] = &[];
        let Some(view) = &self.result else {
            return match &self.upload {
                Some(upload) => Preview {
                    columns: &upload.columns,
                    rows: upload.head.iter().enumerate().collect(),
                    hits: BTreeSet::new(),
                    matcher: None,
                    match_columns: Vec::new(),
                    whole_row: false,
                },
                None => Preview {
                    columns: empty,
                    rows: Vec::new(),
                    hits: BTreeSet::new(),
                    matcher: None,
                    match_columns: Vec::new(),
                    whole_row: false,
                },
            };
        };

        match &view.result {
            ExecutionResult::Find(find) => {
                let no_rows: &[Row] = &[];
                let (columns, head) = match &self.upload {
                    Some(u) => (u.columns.as_slice(), u.head.as_slice()),
                    None => (empty, no_rows),
                };
                let rows: Vec<(usize, &Row)> = match &view.head_hits {
                    Some(hits) => head
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| hits.contains(i))
                        .collect(),
                    None => head.iter().enumerate().collect(),
                };
                Preview {
                    columns,
                    rows,
                    hits: view.head_hits.clone().unwrap_or_default(),
                    matcher: view.matcher(),
                    match_columns: match_columns(&find.applied_columns, columns),
                    whole_row: false,
                }
            }
            ExecutionResult::Replace(replace) => {
                let hits = view.head_hits.clone().unwrap_or_default();
                let rows: Vec<(usize, &Row)> = replace
                    .processed_head
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| !self.show_hits_only || hits.contains(i))
                    .collect();
                Preview {
                    columns: &replace.columns,
                    rows,
                    hits,
                    matcher: None,
                    match_columns: Vec::new(),
                    whole_row: true,
                }
            }
        }
    }

    pub fn preview_len(&self) -> usize {
        self.preview().rows.len()
    }

    /// The current page of the preview
    pub fn page_view(&self) -> PageView<'_> {
        let preview = self.preview();
        let total = preview.rows.len();
        let window = self.pager.window(total);
        let displayed: Vec<usize> = preview.rows.iter().map(|(i, _)| *i).collect();
        let mask = page_mask(&displayed, &preview.hits, window.clone());
        let page_rows = &preview.rows[window];
        PageView {
            columns: preview.columns,
            rows: page_rows.iter().map(|(_, r)| *r).collect(),
            head_indices: page_rows.iter().map(|(i, _)| *i).collect(),
            mask,
            matcher: preview.matcher,
            match_columns: preview.match_columns,
            whole_row: preview.whole_row,
            page: self.pager.clamp(self.pager.page(), total),
            page_count: self.pager.page_count(total),
            total,
        }
    }
}
