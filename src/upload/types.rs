//! Upload session types

use crate::types::JsonValue;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// One uploaded part as the completion mutation expects it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedPart {
    /// ETag returned by object storage for this part
    #[serde(rename = "ETag")]
    pub etag: String,
    /// 1-based part number
    #[serde(rename = "PartNumber")]
    pub part_number: u32,
}

/// State of one multipart upload, from initiation to completion.
///
/// Parts are appended in upload order, so the list is always numbered
/// 1..=n without gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSession {
    /// Server-assigned upload id
    pub upload_id: String,
    /// Object key the parts are assembled under
    pub upload_key: String,
    /// Test the upload belongs to
    pub test_id: String,
    parts: Vec<CompletedPart>,
}

impl UploadSession {
    /// Create a session from the initiation response
    pub fn new(
        upload_id: impl Into<String>,
        upload_key: impl Into<String>,
        test_id: impl Into<String>,
    ) -> Self {
        Self {
            upload_id: upload_id.into(),
            upload_key: upload_key.into(),
            test_id: test_id.into(),
            parts: Vec::new(),
        }
    }

    /// Number the next chunk must be uploaded as
    pub fn next_part_number(&self) -> u32 {
        self.parts.len() as u32 + 1
    }

    /// Record the ETag of the part that was just uploaded
    pub fn record_part(&mut self, etag: impl Into<String>) -> &CompletedPart {
        let part_number = self.next_part_number();
        self.parts.push(CompletedPart {
            etag: etag.into(),
            part_number,
        });
        &self.parts[self.parts.len() - 1]
    }

    /// Parts recorded so far
    pub fn parts(&self) -> &[CompletedPart] {
        &self.parts
    }

    /// Variables for `generateUploadPartUrl` of the given part
    pub fn part_url_variables(&self, part_number: u32) -> JsonValue {
        json!({
            "input": {
                "partNumber": part_number,
                "uploadId": self.upload_id,
                "uploadKey": self.upload_key,
            }
        })
    }

    /// Consume the session into `completeMultipartUpload` variables
    pub fn into_completion_variables(self) -> JsonValue {
        json!({
            "input": {
                "partData": self.parts,
                "testId": self.test_id,
                "uploadId": self.upload_id,
                "uploadKey": self.upload_key,
            }
        })
    }
}

/// Result of a finished upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReceipt {
    /// Test the file was attached to
    pub test_id: String,
    /// Object key reported by the completion mutation
    pub key: Option<String>,
    /// Number of parts sent (always 1 for single-file uploads)
    pub parts: u32,
    /// Raw completion object
    pub response: JsonValue,
}
