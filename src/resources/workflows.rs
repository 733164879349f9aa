//! Composite upload workflows
//!
//! Create a fresh asset version, artifact and test under an existing asset,
//! then push a binary or a scanner results file to the new test.

use super::descriptors::{create_resource, CreateParams, ResourceKind, TestType};
use super::queries::{get_all, QueryFilter, ASSETS};
use crate::error::{Error, Result};
use crate::http::{string_field, Transport};
use crate::types::JsonValue;
use crate::upload::{upload_file_for_binary_analysis, upload_test_results_file, UploadReceipt};
use std::path::Path;
use tracing::info;

/// Inputs for creating an asset version, artifact and test under an asset
#[derive(Debug, Clone, PartialEq)]
pub struct UploadTestParams {
    pub asset_id: String,
    /// Name of the new asset version
    pub version: String,
    pub test_type: TestType,
    /// Taken from the asset when unset
    pub business_unit_id: Option<String>,
    /// Taken from the asset when unset
    pub created_by_user_id: Option<String>,
    /// Added to the asset's products when not already among them
    pub product_id: Option<String>,
    /// Suffix of the artifact name, e.g. "Firmware"
    pub artifact_description: Option<String>,
}

impl UploadTestParams {
    /// Parameters with only the required fields set
    pub fn new(asset_id: impl Into<String>, version: impl Into<String>, test_type: TestType) -> Self {
        Self {
            asset_id: asset_id.into(),
            version: version.into(),
            test_type,
            business_unit_id: None,
            created_by_user_id: None,
            product_id: None,
            artifact_description: None,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.asset_id.is_empty() {
            return Err(Error::validation("Asset ID is required"));
        }
        if self.version.is_empty() {
            return Err(Error::validation("Version is required"));
        }
        Ok(())
    }
}

/// Create the asset version, artifact and test a file is uploaded to.
///
/// Returns the id of the new test.
pub async fn create_upload_test<T: Transport + ?Sized>(
    transport: &T,
    params: &UploadTestParams,
) -> Result<String> {
    params.validate()?;

    let assets = get_all(transport, &ASSETS, &QueryFilter::new().id(&params.asset_id)).await?;
    let asset = assets
        .first()
        .ok_or_else(|| Error::not_found("Asset", &params.asset_id))?;
    let asset_name = string_field(asset, "allAssets", "name")?;

    let mut product_ids = string_list(&asset["ctx"]["products"]);
    if let Some(product_id) = &params.product_id {
        if !product_ids.contains(product_id) {
            product_ids.push(product_id.clone());
        }
    }

    let business_unit_id = params
        .business_unit_id
        .clone()
        .or_else(|| nested_id(asset, "group"))
        .ok_or_else(|| {
            Error::validation(
                "Business Unit ID is required and could not be retrieved from the existing asset",
            )
        })?;
    let created_by_user_id = params
        .created_by_user_id
        .clone()
        .or_else(|| nested_id(asset, "createdBy"))
        .ok_or_else(|| {
            Error::validation(
                "Created By User ID is required and could not be retrieved from the existing asset",
            )
        })?;

    let base = CreateParams {
        business_unit_id: Some(business_unit_id),
        created_by_user_id: Some(created_by_user_id),
        asset_id: Some(params.asset_id.clone()),
        ..CreateParams::default()
    };

    let asset_version = create_resource(
        transport,
        ResourceKind::AssetVersion,
        &CreateParams {
            name: Some(params.version.clone()),
            ..base.clone()
        },
    )
    .await?;
    let asset_version_id = string_field(&asset_version, "createAssetVersion", "id")?;

    let description = params
        .artifact_description
        .as_deref()
        .filter(|d| !d.is_empty())
        .unwrap_or(match params.test_type {
            TestType::BinaryAnalysis => "Binary",
            TestType::CycloneDx => "Unspecified Artifact",
        });
    let artifact = create_resource(
        transport,
        ResourceKind::Artifact,
        &CreateParams {
            asset_version_id: Some(asset_version_id.clone()),
            name: Some(format!("{asset_name} {} - {description}", params.version)),
            product_ids: product_ids.clone(),
            ..base.clone()
        },
    )
    .await?;
    let artifact_id = string_field(&artifact, "createArtifact", "id")?;

    let test_name = match params.test_type {
        TestType::BinaryAnalysis => {
            format!("{asset_name} {} - Finite State Binary Analysis", params.version)
        }
        other => format!("{asset_name} {} - {other}", params.version),
    };
    let test = create_resource(
        transport,
        ResourceKind::Test,
        &CreateParams {
            artifact_id: Some(artifact_id),
            name: Some(test_name),
            product_ids,
            test_type: Some(params.test_type),
            tools: params.test_type.tools(),
            ..base
        },
    )
    .await?;
    let test_id = string_field(&test, "createTest", "id")?;

    info!(
        asset_id = %params.asset_id,
        asset_version_id = %asset_version_id,
        test_id = %test_id,
        "created upload test"
    );
    Ok(test_id)
}

/// Create a new asset version with a binary analysis test and upload `path` to it
pub async fn create_asset_version_and_upload_binary<T: Transport + ?Sized>(
    transport: &T,
    params: &UploadTestParams,
    path: &Path,
    chunk_size: u64,
) -> Result<UploadReceipt> {
    ensure_file(path).await?;
    let mut params = params.clone();
    params.test_type = TestType::BinaryAnalysis;
    if params.artifact_description.as_deref().unwrap_or_default().is_empty() {
        params.artifact_description = Some("Firmware Binary".to_string());
    }

    let test_id = create_upload_test(transport, &params).await?;
    upload_file_for_binary_analysis(transport, &test_id, path, chunk_size).await
}

/// Create a new asset version with a scanner test and upload the results file to it
pub async fn create_asset_version_and_upload_test_results<T: Transport + ?Sized>(
    transport: &T,
    params: &UploadTestParams,
    path: &Path,
) -> Result<UploadReceipt> {
    ensure_file(path).await?;
    if params.test_type == TestType::BinaryAnalysis {
        return Err(Error::validation(
            "Binary analysis takes a binary upload, not a results file",
        ));
    }

    let test_id = create_upload_test(transport, params).await?;
    upload_test_results_file(transport, &test_id, path).await
}

/// Check the source file before anything is created for it
async fn ensure_file(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(Error::validation("File path is required"));
    }
    if !tokio::fs::try_exists(path).await? {
        return Err(Error::FileNotFound {
            path: path.display().to_string(),
        });
    }
    Ok(())
}

fn nested_id(value: &JsonValue, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(|v| v.get("id"))
        .and_then(JsonValue::as_str)
        .filter(|id| !id.is_empty())
        .map(ToString::to_string)
}

fn string_list(value: &JsonValue) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(JsonValue::as_str)
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}
