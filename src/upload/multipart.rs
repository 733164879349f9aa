//! Multipart upload for binary analysis
//!
//! Initiate, then for each chunk request a pre-signed part URL and PUT the
//! bytes to it, then complete with the ordered part list. Any failure aborts
//! the whole sequence; a partially uploaded session is never resumed.

use super::chunks::ChunkReader;
use super::types::{UploadReceipt, UploadSession};
use crate::error::{Error, Result};
use crate::http::{data_field, string_field, Transport};
use serde_json::json;
use std::path::Path;
use tracing::{debug, info};

const START_MULTIPART_UPLOAD: &str = r#"
mutation Start($input: startMultipartUploadInput!) {
    startMultipartUpload(input: $input) {
        id
        key
    }
}
"#;

const GENERATE_UPLOAD_PART_URL: &str = r#"
mutation GenerateUploadPartUrl($input: generateUploadPartUrlInput!) {
    generateUploadPartUrl(input: $input) {
        key
        uploadUrl
    }
}
"#;

const COMPLETE_MULTIPART_UPLOAD: &str = r#"
mutation CompleteMultipartUpload($input: CompleteMultipartUploadInput!) {
    completeMultipartUpload(input: $input) {
        key
    }
}
"#;

/// Uploads a file for binary analysis in fixed-size parts
pub struct MultipartUploader<'a, T: Transport + ?Sized> {
    transport: &'a T,
    chunk_size: u64,
}

impl<'a, T: Transport + ?Sized> MultipartUploader<'a, T> {
    /// Create an uploader splitting files into `chunk_size` byte parts
    pub fn new(transport: &'a T, chunk_size: u64) -> Self {
        Self {
            transport,
            chunk_size,
        }
    }

    /// Upload `path` to the test `test_id`
    pub async fn upload(&self, test_id: &str, path: &Path) -> Result<UploadReceipt> {
        if test_id.is_empty() {
            return Err(Error::validation("Test ID is required"));
        }
        if path.as_os_str().is_empty() {
            return Err(Error::validation("File path is required"));
        }
        // opening the file checks chunk size and existence before any request
        let mut chunks = ChunkReader::open(path, self.chunk_size).await?;

        let mut session = self.start(test_id).await?;
        info!(
            test_id,
            upload_id = %session.upload_id,
            bytes = chunks.remaining(),
            parts = ChunkReader::chunk_count(chunks.remaining(), self.chunk_size),
            "started multipart upload"
        );

        while let Some(chunk) = chunks.next_chunk().await? {
            let part_number = session.next_part_number();
            let url = self.part_url(&session, part_number).await?;

            let len = chunk.len();
            let etag = self
                .transport
                .put_object(&url, chunk)
                .await?
                .ok_or(Error::MissingEtag { part_number })?;
            session.record_part(etag);

            debug!(part_number, bytes = len, "uploaded part");
        }

        let parts = session.parts().len() as u32;
        let response = self
            .transport
            .send(COMPLETE_MULTIPART_UPLOAD, &session.into_completion_variables())
            .await?;
        let completed = data_field(&response, "completeMultipartUpload")?.clone();
        let key = completed
            .get("key")
            .and_then(|k| k.as_str())
            .map(ToString::to_string);

        info!(test_id, parts, "completed multipart upload");
        Ok(UploadReceipt {
            test_id: test_id.to_string(),
            key,
            parts,
            response: completed,
        })
    }

    async fn start(&self, test_id: &str) -> Result<UploadSession> {
        let variables = json!({"input": {"testId": test_id}});
        let response = self.transport.send(START_MULTIPART_UPLOAD, &variables).await?;
        let started = data_field(&response, "startMultipartUpload")?;

        Ok(UploadSession::new(
            string_field(started, "startMultipartUpload", "id")?,
            string_field(started, "startMultipartUpload", "key")?,
            test_id,
        ))
    }

    async fn part_url(&self, session: &UploadSession, part_number: u32) -> Result<String> {
        let response = self
            .transport
            .send(
                GENERATE_UPLOAD_PART_URL,
                &session.part_url_variables(part_number),
            )
            .await?;
        let part = data_field(&response, "generateUploadPartUrl")?;
        string_field(part, "generateUploadPartUrl", "uploadUrl")
    }
}

/// Upload a file for binary analysis, splitting it into `chunk_size` parts
pub async fn upload_file_for_binary_analysis<T: Transport + ?Sized>(
    transport: &T,
    test_id: &str,
    path: &Path,
    chunk_size: u64,
) -> Result<UploadReceipt> {
    MultipartUploader::new(transport, chunk_size)
        .upload(test_id, path)
        .await
}
