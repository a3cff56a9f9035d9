//! Request orchestration around [`ViewState`]
//!
//! A [`Session`] owns the view state and the API client. Each backend call is
//! split into a `begin_*` step that applies the busy gate, the network future,
//! and a `finish_*` step that commits the outcome. The terminal front end runs
//! the network part on a spawned task; batch mode and tests use the composed
//! async helpers.

use crate::core::models::{ExecuteRequest, ExecuteResponse, UploadResponse};
use crate::core::state::{StateEvent, ViewState};
use crate::core::types::ToastLevel;
use crate::services::api_client::{ApiClient, ApiError};
use color_eyre::Result;
use color_eyre::eyre::eyre;
use std::path::Path;
use tracing::{debug, info, warn};

/// Drives [`ViewState`] through the backend calls
#[derive(Debug)]
pub struct Session {
    client: ApiClient,
    pub state: ViewState,
}

impl Session {
    pub fn new(client: ApiClient, state: ViewState) -> Self {
        Self { client, state }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Mark an upload as started; `false` if another request is in flight
    pub fn begin_upload(&mut self) -> bool {
        if self.state.is_busy() {
            warn!("Upload refused: a request is already in flight");
            return false;
        }
        self.state.apply(StateEvent::UploadStarted);
        true
    }

    pub fn finish_upload(&mut self, result: Result<UploadResponse, ApiError>) {
        match result {
            Ok(resp) => self.state.apply(StateEvent::UploadSucceeded(resp.into())),
            Err(e) => self.state.apply(StateEvent::UploadFailed(e.to_string())),
        }
    }

    /// Validate and mark an execute as started, returning the request to send
    pub fn begin_execute(&mut self, instruction: &str) -> Option<ExecuteRequest> {
        if self.state.is_busy() {
            warn!("Execute refused: a request is already in flight");
            return None;
        }
        let instruction = instruction.trim();
        let Some(file_id) = self.state.upload.as_ref().map(|u| u.file_id.clone()) else {
            self.state
                .push_toast(ToastLevel::Warning, "Upload a file before running an instruction");
            return None;
        };
        if instruction.is_empty() {
            self.state.push_toast(ToastLevel::Warning, "Enter an instruction first");
            return None;
        }
        let request = ExecuteRequest {
            file_id,
            instruction: instruction.to_string(),
            download: true,
            chain: self.state.auto_chain,
        };
        self.state
            .apply(StateEvent::InstructionChanged(instruction.to_string()));
        self.state.apply(StateEvent::ExecuteStarted);
        Some(request)
    }

    /// Commit the outcome of `request`; chaining follows what was sent
    pub fn finish_execute(
        &mut self,
        request: ExecuteRequest,
        result: Result<ExecuteResponse, ApiError>,
    ) {
        match result {
            Ok(mut response) => {
                if let Some(link) = response.download_url.take() {
                    let resolved = match self.client.resolve_download_url(&link) {
                        Ok(url) => url.to_string(),
                        Err(e) => {
                            debug!("Keeping unresolvable download link {:?}: {}", link, e);
                            link
                        }
                    };
                    response.download_url = Some(resolved);
                }
                self.state.apply(StateEvent::ExecuteSucceeded {
                    instruction: request.instruction,
                    chained: request.chain,
                    response: Box::new(response),
                });
            }
            Err(e) => self.state.apply(StateEvent::ExecuteFailed(e.to_string())),
        }
    }

    /// Upload a file and commit the outcome; returns whether it succeeded
    pub async fn upload(&mut self, path: &Path) -> bool {
        if !self.begin_upload() {
            return false;
        }
        let result = self.client.upload(path).await;
        let ok = result.is_ok();
        self.finish_upload(result);
        ok
    }

    /// Run an instruction against the current file; returns whether it succeeded
    pub async fn execute(&mut self, instruction: &str) -> bool {
        let Some(request) = self.begin_execute(instruction) else {
            return false;
        };
        let result = self.client.execute(&request).await;
        let ok = result.is_ok();
        self.finish_execute(request, result);
        ok
    }

    /// Save the server-side export of the last replace to `dest`
    pub async fn download_result(&self, dest: &Path) -> Result<usize> {
        let link = self
            .state
            .result
            .as_ref()
            .and_then(|r| r.download_url())
            .ok_or_else(|| eyre!("No download available for the current result"))?;
        let written = self.client.download(link, dest).await?;
        info!("Downloaded {} bytes to {}", written, dest.display());
        Ok(written)
    }

    /// Write the rows currently in the preview (all pages) as CSV
    pub fn export_preview_csv(&self, dest: &Path) -> Result<usize> {
        let preview = self.state.preview();
        if preview.columns.is_empty() {
            return Err(eyre!("Nothing to export"));
        }
        let mut writer = csv::Writer::from_path(dest)?;
        writer.write_record(preview.columns)?;
        for (_, row) in &preview.rows {
            writer.write_record(preview.columns.iter().map(|c| row.text(c)))?;
        }
        writer.flush()?;
        info!("Exported {} preview rows to {}", preview.rows.len(), dest.display());
        Ok(preview.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{FileId, Row, UploadResult};
    use crate::services::api_client::ApiConfig;
    use pretty_assertions::assert_eq;

    fn session() -> Session {
        let client = ApiClient::new(&ApiConfig::default()).unwrap();
        Session::new(client, ViewState::default())
    }

    fn with_upload() -> Session {
        let mut s = session();
        assert!(s.begin_upload());
        s.finish_upload(Ok(UploadResponse {
            file_id: FileId::Int(7),
            filename: "people.csv".to_string(),
            is_excel: false,
            columns: vec!["name".to_string(), "email".to_string()],
            head: vec![
                Row::from_iter([("name", "A"), ("email", "a@x.com")]),
                Row::from_iter([("name", "B, Jr."), ("email", "none")]),
            ],
        }));
        s.state.drain_toasts();
        s
    }

    #[test]
    fn test_execute_requires_upload() {
        let mut s = session();
        assert!(s.begin_execute("find emails").is_none());
        assert!(!s.state.is_busy());
        assert_eq!(s.state.drain_toasts().len(), 1);
    }

    #[test]
    fn test_execute_requires_instruction() {
        let mut s = with_upload();
        assert!(s.begin_execute("   ").is_none());
        assert!(!s.state.is_busy());
    }

    #[test]
    fn test_begin_execute_builds_request() {
        let mut s = with_upload();
        s.state.auto_chain = true;
        let req = s.begin_execute(" find emails ").unwrap();
        assert_eq!(
            req,
            ExecuteRequest {
                file_id: FileId::Int(7),
                instruction: "find emails".to_string(),
                download: true,
                chain: true,
            }
        );
        assert!(s.state.is_busy());
        assert_eq!(s.state.instruction, "find emails");
        assert!(s.begin_execute("again").is_none());
        assert!(!s.begin_upload());
    }

    #[test]
    fn test_relative_download_link_is_resolved() {
        let mut s = with_upload();
        let req = s.begin_execute("replace").unwrap();
        let resp: ExecuteResponse = serde_json::from_value(serde_json::json!({
            "mode": "replace",
            "replacements": 1,
            "download_url": "/media/exports/people-1.csv"
        }))
        .unwrap();
        s.finish_execute(req, Ok(resp));
        assert_eq!(
            s.state.result.as_ref().unwrap().download_url(),
            Some("http://localhost:8000/media/exports/people-1.csv")
        );
    }

    #[test]
    fn test_chained_request_keeps_new_base_after_toggle_off() {
        let mut s = with_upload();
        s.state.auto_chain = true;
        let req = s.begin_execute("replace emails").unwrap();
        s.state.apply(StateEvent::AutoChainRequested(false));
        assert!(s.state.auto_chain);
        let resp: ExecuteResponse = serde_json::from_value(serde_json::json!({
            "mode": "replace",
            "replacements": 1,
            "chain": {"file_id": 42, "columns": ["name", "email"], "head": []}
        }))
        .unwrap();
        s.finish_execute(req, Ok(resp));
        assert_eq!(s.state.upload.as_ref().unwrap().file_id, FileId::Int(42));
    }

    #[test]
    fn test_export_preview_csv() {
        let s = with_upload();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        assert_eq!(s.export_preview_csv(&path).unwrap(), 2);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "name,email\nA,a@x.com\n\"B, Jr.\",none\n");
    }

    #[test]
    fn test_export_without_data_fails() {
        let s = session();
        let dir = tempfile::tempdir().unwrap();
        assert!(s.export_preview_csv(&dir.path().join("x.csv")).is_err());
    }

    #[test]
    fn test_upload_result_conversion_keeps_identity() {
        let s = with_upload();
        let upload: &UploadResult = s.state.upload.as_ref().unwrap();
        assert_eq!(upload.file_id, FileId::Int(7));
    }
}
