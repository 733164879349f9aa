//! List query templates
//!
//! Every template is query text, the result field and a variables builder
//! over a `QueryFilter`. They all run through the paginator.

use crate::error::{Error, Result};
use crate::http::Transport;
use crate::pagination::{fetch_all, QueryDescriptor};
use crate::types::{JsonValue, Record};
use serde_json::json;

/// Records requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Optional filter parameters shared by the list templates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFilter {
    /// Restrict to a single object
    pub id: Option<String>,
    pub business_unit_id: Option<String>,
    pub asset_version_id: Option<String>,
    pub product_id: Option<String>,
    /// Finding category, e.g. `CVE` or `CREDENTIALS`
    pub category: Option<String>,
    /// Software component type, e.g. `LIBRARY` or `OPERATING_SYSTEM`
    pub component_type: Option<String>,
}

impl QueryFilter {
    /// Filter with nothing set
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one object id
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn business_unit(mut self, id: impl Into<String>) -> Self {
        self.business_unit_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn asset_version(mut self, id: impl Into<String>) -> Self {
        self.asset_version_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn product(mut self, id: impl Into<String>) -> Self {
        self.product_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn component_type(mut self, component_type: impl Into<String>) -> Self {
        self.component_type = Some(component_type.into());
        self
    }
}

/// A named, paginated list query
#[derive(Debug, Clone, Copy)]
pub struct QueryTemplate {
    /// Short name used on the command line
    pub name: &'static str,
    pub query: &'static str,
    pub field: &'static str,
    build: fn(&QueryFilter) -> Result<JsonValue>,
}

impl QueryTemplate {
    /// Build the query descriptor for `filter`
    pub fn descriptor(&self, filter: &QueryFilter) -> Result<QueryDescriptor> {
        let variables = (self.build)(filter)?;
        Ok(QueryDescriptor::new(self.query, self.field).with_variables(variables))
    }

    /// Look a template up by its short name
    pub fn by_name(name: &str) -> Option<&'static QueryTemplate> {
        ALL_TEMPLATES.iter().copied().find(|t| t.name == name)
    }
}

/// Run `template` with `filter` and return every record across all pages
pub async fn get_all<T: Transport + ?Sized>(
    transport: &T,
    template: &QueryTemplate,
    filter: &QueryFilter,
) -> Result<Vec<Record>> {
    let descriptor = template.descriptor(filter)?;
    fetch_all(transport, &descriptor).await
}

/// Access-control context (`ctx`) of an existing artifact
pub async fn get_artifact_context<T: Transport + ?Sized>(
    transport: &T,
    artifact_id: &str,
) -> Result<JsonValue> {
    if artifact_id.is_empty() {
        return Err(Error::validation("Artifact ID is required"));
    }
    let artifacts = get_all(transport, &ARTIFACTS, &QueryFilter::new().id(artifact_id)).await?;
    let artifact = artifacts
        .first()
        .ok_or_else(|| Error::not_found("Artifact", artifact_id))?;

    match artifact.get("ctx") {
        Some(ctx) if !ctx.is_null() => Ok(ctx.clone()),
        _ => Err(Error::schema_mismatch(
            format!("{}.ctx", ARTIFACTS.field),
            "artifact record has no context",
        )),
    }
}

fn page_variables(filter: JsonValue) -> JsonValue {
    json!({
        "filter": filter,
        "after": null,
        "first": DEFAULT_PAGE_SIZE,
    })
}

fn required<'a>(value: &'a Option<String>, what: &str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::validation(format!("{what} is required")))
}

fn unfiltered(_: &QueryFilter) -> Result<JsonValue> {
    Ok(json!({"after": null, "first": DEFAULT_PAGE_SIZE}))
}

fn id_filter(filter: &QueryFilter) -> Result<JsonValue> {
    let mut f = json!({});
    if let Some(id) = &filter.id {
        f["id"] = json!(id);
    }
    Ok(page_variables(f))
}

fn id_and_group_filter(filter: &QueryFilter) -> Result<JsonValue> {
    let mut f = json!({});
    if let Some(id) = &filter.id {
        f["id"] = json!(id);
    }
    if let Some(bu) = &filter.business_unit_id {
        f["group"] = json!({"id": bu});
    }
    Ok(page_variables(f))
}

fn product_filter(filter: &QueryFilter) -> Result<JsonValue> {
    let product = required(&filter.product_id, "Product ID")?;
    Ok(page_variables(json!({"id": product})))
}

fn findings_filter(filter: &QueryFilter) -> Result<JsonValue> {
    let asset_version = required(&filter.asset_version_id, "Asset Version ID")?;
    let mut f = json!({
        "assetVersionRefId": asset_version,
        "mergedFindingRefId": null,
        "deletedAt": null,
    });
    if let Some(category) = &filter.category {
        f["category_in"] = json!([category]);
    }
    let mut variables = page_variables(f);
    variables["orderBy"] = json!(["title_ASC"]);
    Ok(variables)
}

fn software_components_filter(filter: &QueryFilter) -> Result<JsonValue> {
    let asset_version = required(&filter.asset_version_id, "Asset Version ID")?;
    let mut f = json!({
        "assetVersionRefId": asset_version,
        "mergedComponentRefId": null,
        "deletedAt": null,
    });
    if let Some(component_type) = &filter.component_type {
        f["type_in"] = json!([component_type]);
    }
    let mut variables = page_variables(f);
    variables["orderBy"] = json!(["absoluteRiskScore_DESC"]);
    Ok(variables)
}

// ============================================================================
// Templates
// ============================================================================

pub static ARTIFACTS: QueryTemplate = QueryTemplate {
    name: "artifacts",
    query: r#"
query GetArtifacts($filter: AssetFilter!, $after: String, $first: Int) {
    allAssets(filter: $filter, after: $after, first: $first) {
        _cursor
        id
        name
        createdAt
        deletedAt
        assetVersion { id name asset { id name } }
        createdBy { id email }
        ctx { asset products businessUnits }
    }
}
"#,
    field: "allAssets",
    build: id_and_group_filter,
};

pub static ASSETS: QueryTemplate = QueryTemplate {
    name: "assets",
    query: r#"
query GetAllAssets($filter: AssetFilter!, $after: String, $first: Int) {
    allAssets(filter: $filter, after: $after, first: $first) {
        _cursor
        id
        name
        createdAt
        group { id name }
        createdBy { id email }
        versions { id name }
        ctx { asset products businessUnits }
    }
}
"#,
    field: "allAssets",
    build: id_and_group_filter,
};

pub static ASSET_VERSIONS: QueryTemplate = QueryTemplate {
    name: "asset-versions",
    query: r#"
query GetAllAssetVersions($filter: AssetVersionFilter!, $after: String, $first: Int) {
    allAssetVersions(filter: $filter, after: $after, first: $first) {
        _cursor
        id
        name
        createdAt
        asset { id name }
        ctx { asset products businessUnits }
    }
}
"#,
    field: "allAssetVersions",
    build: id_filter,
};

pub static PRODUCT_ASSET_VERSIONS: QueryTemplate = QueryTemplate {
    name: "product-asset-versions",
    query: r#"
query GetProductAssetVersions($filter: ProductFilter!, $after: String, $first: Int) {
    allProducts(filter: $filter, after: $after, first: $first) {
        _cursor
        id
        name
        assets {
            id
            name
            versions { id name createdAt }
        }
    }
}
"#,
    field: "allProducts",
    build: product_filter,
};

pub static BUSINESS_UNITS: QueryTemplate = QueryTemplate {
    name: "business-units",
    query: r#"
query GetBusinessUnits($after: String, $first: Int) {
    allGroups(after: $after, first: $first) {
        _cursor
        id
        name
    }
}
"#,
    field: "allGroups",
    build: unfiltered,
};

pub static ORGANIZATIONS: QueryTemplate = QueryTemplate {
    name: "organizations",
    query: r#"
query GetOrganizations($after: String, $first: Int) {
    allOrganizations(after: $after, first: $first) {
        _cursor
        id
        name
    }
}
"#,
    field: "allOrganizations",
    build: unfiltered,
};

pub static PRODUCTS: QueryTemplate = QueryTemplate {
    name: "products",
    query: r#"
query GetProducts($filter: ProductFilter!, $after: String, $first: Int) {
    allProducts(filter: $filter, after: $after, first: $first) {
        _cursor
        id
        name
        createdAt
        group { id name }
        vendor { name }
        createdBy { id email }
        ctx { businessUnit }
    }
}
"#,
    field: "allProducts",
    build: id_and_group_filter,
};

pub static USERS: QueryTemplate = QueryTemplate {
    name: "users",
    query: r#"
query GetUsers($after: String, $first: Int) {
    allUsers(after: $after, first: $first) {
        _cursor
        id
        email
        createdAt
    }
}
"#,
    field: "allUsers",
    build: unfiltered,
};

pub static FINDINGS: QueryTemplate = QueryTemplate {
    name: "findings",
    query: r#"
query GetFindingsForAnAssetVersion($filter: FindingFilter, $after: String, $first: Int, $orderBy: [FindingOrderBy!]) {
    allFindings(filter: $filter, after: $after, first: $first, orderBy: $orderBy) {
        _cursor
        id
        title
        date
        category
        severity
        riskScore
        cves { cveId }
        currentStatus { status justification createdAt }
        affects { id name version }
    }
}
"#,
    field: "allFindings",
    build: findings_filter,
};

pub static SOFTWARE_COMPONENTS: QueryTemplate = QueryTemplate {
    name: "software-components",
    query: r#"
query GetSoftwareComponentsForAnAssetVersion($filter: SoftwareComponentInstanceFilter, $after: String, $first: Int, $orderBy: [SoftwareComponentInstanceOrderBy!]) {
    allSoftwareComponentInstances(filter: $filter, after: $after, first: $first, orderBy: $orderBy) {
        _cursor
        id
        name
        version
        type
        hashes { alg content }
        licenses { name copyLeft isFsfLibre isOsiApproved }
        supplier { name }
    }
}
"#,
    field: "allSoftwareComponentInstances",
    build: software_components_filter,
};

/// Every named template, in command-line listing order
pub static ALL_TEMPLATES: &[&QueryTemplate] = &[
    &ARTIFACTS,
    &ASSETS,
    &ASSET_VERSIONS,
    &PRODUCT_ASSET_VERSIONS,
    &BUSINESS_UNITS,
    &ORGANIZATIONS,
    &PRODUCTS,
    &USERS,
    &FINDINGS,
    &SOFTWARE_COMPONENTS,
];

// ============================================================================
// SBOM Search
// ============================================================================

const SBOM_SEARCH_IN_ASSET_VERSION: &str = r#"
query GetSoftwareComponentInstances($filter: SoftwareComponentInstanceFilter, $after: String, $first: Int) {
    allSoftwareComponentInstances(filter: $filter, after: $after, first: $first) {
        _cursor
        id
        name
        version
        originalComponents { id name version }
    }
}
"#;

const SBOM_SEARCH_IN_ORGANIZATION: &str = r#"
query GetSoftwareComponentInstances($filter: SoftwareComponentInstanceFilter, $after: String, $first: Int) {
    allSoftwareComponentInstances(filter: $filter, after: $after, first: $first) {
        _cursor
        id
        name
        version
        assetVersion { id name asset { id name } }
    }
}
"#;

/// How a component name is matched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchMethod {
    #[default]
    Exact,
    Contains,
}

/// Software component search across one asset version or the organization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SbomSearch {
    pub name: String,
    pub version: Option<String>,
    /// Search only this asset version; the whole organization when unset
    pub asset_version_id: Option<String>,
    pub method: SearchMethod,
    /// Only meaningful for exact matches
    pub case_sensitive: bool,
}

impl SbomSearch {
    /// Exact, case-insensitive search for `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Build the query descriptor
    pub fn descriptor(&self) -> Result<QueryDescriptor> {
        if self.name.is_empty() {
            return Err(Error::validation("Name is required"));
        }

        let mut filter = json!({"mergedComponentRefId": null});
        let query = match &self.asset_version_id {
            Some(id) => {
                filter["assetVersionRefId"] = json!(id);
                SBOM_SEARCH_IN_ASSET_VERSION
            }
            None => SBOM_SEARCH_IN_ORGANIZATION,
        };

        match (self.method, self.case_sensitive) {
            (SearchMethod::Exact, true) => filter["name"] = json!(self.name),
            (SearchMethod::Exact, false) => filter["name_like"] = json!(self.name),
            (SearchMethod::Contains, _) => filter["name_contains"] = json!(self.name),
        }
        if let Some(version) = &self.version {
            match self.method {
                SearchMethod::Exact => filter["version"] = json!(version),
                SearchMethod::Contains => filter["version_contains"] = json!(version),
            }
        }

        Ok(QueryDescriptor::new(query, "allSoftwareComponentInstances")
            .with_variables(page_variables(filter)))
    }
}

/// Search software components by name
pub async fn search_sbom<T: Transport + ?Sized>(
    transport: &T,
    search: &SbomSearch,
) -> Result<Vec<Record>> {
    fetch_all(transport, &search.descriptor()?).await
}
