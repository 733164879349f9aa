//! Create mutations as data
//!
//! Each resource kind is a descriptor: mutation text, result field, the
//! parameters it requires and a variables builder. `create_resource` is the
//! only code path that sends them.

use crate::error::{Error, Result};
use crate::http::{data_field, Transport};
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;
use tracing::info;

// ============================================================================
// Test Types and Tools
// ============================================================================

/// Scanner tool recorded on a test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
}

/// File format of the results a test receives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestType {
    /// Finite State Binary Analysis of an uploaded binary
    BinaryAnalysis,
    /// Third-party CycloneDX SBOM
    CycloneDx,
}

impl TestType {
    /// Value of `testResultFileFormat`
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BinaryAnalysis => "finite_state_binary_analysis",
            Self::CycloneDx => "cyclonedx",
        }
    }

    /// Tools a test of this type is created with; a fresh list on every call
    pub fn tools(self) -> Vec<Tool> {
        match self {
            Self::BinaryAnalysis => vec![Tool {
                name: "Finite State Binary Analysis".to_string(),
                description:
                    "SBOM and Vulnerability Analysis from Finite State Binary SCA and Binary SAST."
                        .to_string(),
            }],
            Self::CycloneDx => Vec::new(),
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "finite_state_binary_analysis" => Ok(Self::BinaryAnalysis),
            "cyclonedx" => Ok(Self::CycloneDx),
            other => Err(Error::validation(format!(
                "Test type {other} is not supported"
            ))),
        }
    }
}

// ============================================================================
// Parameters
// ============================================================================

/// A parameter a create mutation may require
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    BusinessUnitId,
    CreatedByUserId,
    AssetId,
    AssetVersionId,
    ArtifactId,
    Name,
    TestType,
}

impl Param {
    fn label(self, kind: ResourceKind) -> String {
        match self {
            Self::BusinessUnitId => "Business unit ID".to_string(),
            Self::CreatedByUserId => "Created by user ID".to_string(),
            Self::AssetId => "Asset ID".to_string(),
            Self::AssetVersionId => "Asset version ID".to_string(),
            Self::ArtifactId => "Artifact ID".to_string(),
            Self::Name => format!("{kind} name"),
            Self::TestType => "Test type".to_string(),
        }
    }
}

/// Inputs of a create call. Unused fields are ignored by a given kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateParams {
    pub business_unit_id: Option<String>,
    pub created_by_user_id: Option<String>,
    pub asset_id: Option<String>,
    pub asset_version_id: Option<String>,
    pub artifact_id: Option<String>,
    pub name: Option<String>,
    /// Products the new object is associated with
    pub product_ids: Vec<String>,
    /// Product description
    pub description: Option<String>,
    /// Link a new product to an existing vendor
    pub vendor_id: Option<String>,
    /// Create a vendor for a new product
    pub vendor_name: Option<String>,
    pub test_type: Option<TestType>,
    /// Tools recorded on a test; empty unless set
    pub tools: Vec<Tool>,
}

impl CreateParams {
    /// Empty parameters
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, param: Param) -> Option<&str> {
        let value = match param {
            Param::BusinessUnitId => self.business_unit_id.as_deref(),
            Param::CreatedByUserId => self.created_by_user_id.as_deref(),
            Param::AssetId => self.asset_id.as_deref(),
            Param::AssetVersionId => self.asset_version_id.as_deref(),
            Param::ArtifactId => self.artifact_id.as_deref(),
            Param::Name => self.name.as_deref(),
            Param::TestType => self.test_type.map(TestType::as_str),
        };
        value.filter(|v| !v.is_empty())
    }

    fn value(&self, param: Param) -> JsonValue {
        self.get(param).map_or(JsonValue::Null, JsonValue::from)
    }
}

// ============================================================================
// Descriptors
// ============================================================================

/// Objects that can be created through `create_resource`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Product,
    Asset,
    AssetVersion,
    Artifact,
    Test,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Product => "Product",
            Self::Asset => "Asset",
            Self::AssetVersion => "Asset version",
            Self::Artifact => "Artifact",
            Self::Test => "Test",
        };
        f.write_str(s)
    }
}

/// Declarative description of one create mutation
#[derive(Debug, Clone, Copy)]
pub struct ResourceDescriptor {
    pub kind: ResourceKind,
    pub mutation: &'static str,
    pub result_field: &'static str,
    /// Checked in order; the first missing one is reported
    pub required: &'static [Param],
    build: fn(&CreateParams) -> JsonValue,
}

impl ResourceDescriptor {
    /// Check required parameters, then build the mutation variables
    pub fn variables(&self, params: &CreateParams) -> Result<JsonValue> {
        if let Some(missing) = self.required.iter().find(|p| params.get(**p).is_none()) {
            return Err(Error::validation(format!(
                "{} is required",
                missing.label(self.kind)
            )));
        }
        Ok((self.build)(params))
    }
}

impl ResourceKind {
    /// Descriptor for this kind
    pub fn descriptor(self) -> &'static ResourceDescriptor {
        match self {
            Self::Product => &PRODUCT,
            Self::Asset => &ASSET,
            Self::AssetVersion => &ASSET_VERSION,
            Self::Artifact => &ARTIFACT,
            Self::Test => &TEST,
        }
    }
}

static PRODUCT: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceKind::Product,
    mutation: r#"
mutation CreateProductMutation($input: CreateProductInput!) {
    createProduct(input: $input) {
        id
        name
        vendor { name }
        group { id name }
        createdBy { id email }
        ctx { businessUnit }
    }
}
"#,
    result_field: "createProduct",
    required: &[Param::BusinessUnitId, Param::CreatedByUserId, Param::Name],
    build: product_variables,
};

static ASSET: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceKind::Asset,
    mutation: r#"
mutation CreateAssetMutation($input: CreateAssetInput!) {
    createAsset(input: $input) {
        id
        name
        dependentProducts { id name }
        group { id name }
        createdBy { id email }
        ctx { asset products businessUnits }
    }
}
"#,
    result_field: "createAsset",
    required: &[Param::BusinessUnitId, Param::CreatedByUserId, Param::Name],
    build: asset_variables,
};

static ASSET_VERSION: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceKind::AssetVersion,
    mutation: r#"
mutation CreateAssetVersionMutation($input: CreateAssetVersionInput!) {
    createAssetVersion(input: $input) {
        id
        name
        asset { id name }
        createdBy { id email }
        ctx { asset products businessUnits }
    }
}
"#,
    result_field: "createAssetVersion",
    required: &[
        Param::BusinessUnitId,
        Param::CreatedByUserId,
        Param::AssetId,
        Param::Name,
    ],
    build: asset_version_variables,
};

static ARTIFACT: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceKind::Artifact,
    mutation: r#"
mutation CreateArtifactMutation($input: CreateArtifactInput!) {
    createArtifact(input: $input) {
        id
        name
        assetVersion { id name asset { id name } }
        createdBy { id email }
        ctx { asset products businessUnits }
    }
}
"#,
    result_field: "createArtifact",
    required: &[
        Param::BusinessUnitId,
        Param::CreatedByUserId,
        Param::AssetVersionId,
        Param::Name,
    ],
    build: artifact_variables,
};

static TEST: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceKind::Test,
    mutation: r#"
mutation CreateTestMutation($input: CreateTestInput!) {
    createTest(input: $input) {
        id
        name
        artifactUnderTest {
            id
            name
            assetVersion { id name asset { id name dependentProducts { id name } } }
        }
        createdBy { id email }
        ctx { asset products businessUnits }
    }
}
"#,
    result_field: "createTest",
    required: &[
        Param::BusinessUnitId,
        Param::CreatedByUserId,
        Param::AssetId,
        Param::ArtifactId,
        Param::Name,
        Param::TestType,
    ],
    build: test_variables,
};

// ============================================================================
// Variable Builders
// ============================================================================

fn scoped_ctx(params: &CreateParams, asset: JsonValue) -> JsonValue {
    let mut ctx = JsonObject::new();
    if !asset.is_null() {
        ctx.insert("asset".to_string(), asset);
    }
    ctx.insert(
        "businessUnits".to_string(),
        json!([params.value(Param::BusinessUnitId)]),
    );
    if !params.product_ids.is_empty() {
        ctx.insert("products".to_string(), json!(params.product_ids));
    }
    JsonValue::Object(ctx)
}

fn product_variables(params: &CreateParams) -> JsonValue {
    let business_unit = params.value(Param::BusinessUnitId);
    let mut input = json!({
        "name": params.value(Param::Name),
        "group": business_unit,
        "createdBy": params.value(Param::CreatedByUserId),
        "ctx": {"businessUnit": business_unit},
    });
    if let Some(description) = &params.description {
        input["description"] = json!(description);
    }
    if let Some(vendor_id) = &params.vendor_id {
        input["vendor"] = json!({"id": vendor_id});
    }
    if let Some(vendor_name) = &params.vendor_name {
        input["createVendor"] = json!({"name": vendor_name});
    }
    json!({"input": input})
}

fn asset_variables(params: &CreateParams) -> JsonValue {
    json!({"input": {
        "name": params.value(Param::Name),
        "group": params.value(Param::BusinessUnitId),
        "createdBy": params.value(Param::CreatedByUserId),
        "ctx": scoped_ctx(params, JsonValue::Null),
    }})
}

fn asset_version_variables(params: &CreateParams) -> JsonValue {
    let asset = params.value(Param::AssetId);
    json!({"input": {
        "name": params.value(Param::Name),
        "createdBy": params.value(Param::CreatedByUserId),
        "asset": asset,
        "ctx": scoped_ctx(params, asset.clone()),
    }})
}

fn artifact_variables(params: &CreateParams) -> JsonValue {
    let asset_version = params.value(Param::AssetVersionId);
    // the artifact context is keyed by its asset version
    json!({"input": {
        "name": params.value(Param::Name),
        "createdBy": params.value(Param::CreatedByUserId),
        "assetVersion": asset_version,
        "ctx": scoped_ctx(params, asset_version.clone()),
    }})
}

fn test_variables(params: &CreateParams) -> JsonValue {
    json!({"input": {
        "name": params.value(Param::Name),
        "createdBy": params.value(Param::CreatedByUserId),
        "artifactUnderTest": params.value(Param::ArtifactId),
        "testResultFileFormat": params.value(Param::TestType),
        "ctx": scoped_ctx(params, params.value(Param::AssetId)),
        "tools": params.tools,
    }})
}

// ============================================================================
// Create
// ============================================================================

/// Create an object of `kind` and return the created object.
///
/// Missing required parameters fail before any request is sent.
pub async fn create_resource<T: Transport + ?Sized>(
    transport: &T,
    kind: ResourceKind,
    params: &CreateParams,
) -> Result<JsonValue> {
    let descriptor = kind.descriptor();
    let variables = descriptor.variables(params)?;

    let response = transport.send(descriptor.mutation, &variables).await?;
    let created = data_field(&response, descriptor.result_field)?.clone();

    info!(
        kind = %kind,
        id = created.get("id").and_then(|v| v.as_str()).unwrap_or_default(),
        "created resource"
    );
    Ok(created)
}
