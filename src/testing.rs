//! Scripted transport for protocol tests
//!
//! Replays queued GraphQL responses in order and records every call, so tests
//! can assert on exact request sequences without a network.

use crate::error::{Error, Result};
use crate::http::Transport;
use crate::types::JsonValue;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A recorded GraphQL call
#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub query: String,
    pub variables: JsonValue,
}

impl RecordedCall {
    /// True when the query text mentions `operation`
    pub fn is(&self, operation: &str) -> bool {
        self.query.contains(operation)
    }
}

/// A recorded object-storage transfer
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RecordedTransfer {
    PutObject { url: String, body: Vec<u8> },
    PutFile { url: String, path: PathBuf },
    Download { url: String, path: PathBuf },
}

pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<JsonValue>>>,
    calls: Mutex<Vec<RecordedCall>>,
    transfers: Mutex<Vec<RecordedTransfer>>,
    etags: bool,
    download_body: Vec<u8>,
    organization_context: String,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            transfers: Mutex::new(Vec::new()),
            etags: true,
            download_body: Vec::new(),
            organization_context: "org-test".to_string(),
        }
    }

    /// Queue a successful response body
    pub fn respond(self, body: JsonValue) -> Self {
        self.responses.lock().unwrap().push_back(Ok(body));
        self
    }

    /// Queue a failure
    pub fn fail(self, error: Error) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Make object PUTs come back without an ETag header
    pub fn without_etags(mut self) -> Self {
        self.etags = false;
        self
    }

    /// Bytes served by `download_to_file`
    pub fn with_download_body(mut self, body: &[u8]) -> Self {
        self.download_body = body.to_vec();
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn transfers(&self) -> Vec<RecordedTransfer> {
        self.transfers.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, query: &str, variables: &JsonValue) -> Result<JsonValue> {
        self.calls.lock().unwrap().push(RecordedCall {
            query: query.to_string(),
            variables: variables.clone(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Other("script exhausted".to_string())))
    }

    async fn put_object(&self, url: &str, body: Bytes) -> Result<Option<String>> {
        let mut transfers = self.transfers.lock().unwrap();
        transfers.push(RecordedTransfer::PutObject {
            url: url.to_string(),
            body: body.to_vec(),
        });
        let n = transfers.len();
        Ok(self.etags.then(|| format!("\"etag-{n}\"")))
    }

    async fn put_file(&self, url: &str, path: &Path) -> Result<()> {
        self.transfers.lock().unwrap().push(RecordedTransfer::PutFile {
            url: url.to_string(),
            path: path.to_path_buf(),
        });
        Ok(())
    }

    async fn download_to_file(&self, url: &str, path: &Path) -> Result<u64> {
        self.transfers.lock().unwrap().push(RecordedTransfer::Download {
            url: url.to_string(),
            path: path.to_path_buf(),
        });
        tokio::fs::write(path, &self.download_body).await?;
        Ok(self.download_body.len() as u64)
    }

    fn organization_context(&self) -> &str {
        &self.organization_context
    }
}
