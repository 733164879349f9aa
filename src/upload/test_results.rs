//! Single-file upload of third-party scanner results
//!
//! One pre-signed URL, one PUT of the whole file, one completion call that
//! takes the object key and no part list.

use super::types::UploadReceipt;
use crate::error::{Error, Result};
use crate::http::{data_field, string_field, Transport};
use serde_json::json;
use std::path::Path;
use tracing::info;

const GENERATE_TEST_RESULT_UPLOAD_URL: &str = r#"
mutation GenerateTestResultUploadUrl($input: generateTestResultUploadUrlInput!) {
    generateTestResultUploadUrl(input: $input) {
        uploadUrl
        key
    }
}
"#;

const COMPLETE_TEST_RESULT_UPLOAD: &str = r#"
mutation CompleteTestResultUpload($input: completeTestResultUploadInput!) {
    completeTestResultUpload(input: $input) {
        key
    }
}
"#;

/// Upload a test results file to the test `test_id`
pub async fn upload_test_results_file<T: Transport + ?Sized>(
    transport: &T,
    test_id: &str,
    path: &Path,
) -> Result<UploadReceipt> {
    if test_id.is_empty() {
        return Err(Error::validation("Test ID is required"));
    }
    if path.as_os_str().is_empty() {
        return Err(Error::validation("File path is required"));
    }
    if !tokio::fs::try_exists(path).await? {
        return Err(Error::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let variables = json!({
        "input": {
            "orgId": transport.organization_context(),
            "testId": test_id,
        }
    });
    let response = transport
        .send(GENERATE_TEST_RESULT_UPLOAD_URL, &variables)
        .await?;
    let target = data_field(&response, "generateTestResultUploadUrl")?;
    let upload_url = string_field(target, "generateTestResultUploadUrl", "uploadUrl")?;
    let key = string_field(target, "generateTestResultUploadUrl", "key")?;

    transport.put_file(&upload_url, path).await?;

    let variables = json!({"input": {"testId": test_id, "key": key}});
    let response = transport
        .send(COMPLETE_TEST_RESULT_UPLOAD, &variables)
        .await?;
    let completed = data_field(&response, "completeTestResultUpload")?.clone();

    info!(test_id, key = %key, "uploaded test results");
    Ok(UploadReceipt {
        test_id: test_id.to_string(),
        key: completed
            .get("key")
            .and_then(|k| k.as_str())
            .map(ToString::to_string)
            .or(Some(key)),
        parts: 1,
        response: completed,
    })
}
