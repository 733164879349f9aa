//! Resources module
//!
//! Platform objects (products, assets, asset versions, artifacts, tests) as
//! declarative data rather than one function per object.
//!
//! - `descriptors`: create mutations and the generic `create_resource`
//! - `queries`: paginated list templates, `get_all` and SBOM search
//! - `workflows`: create an asset version, artifact and test, then upload

mod descriptors;
mod queries;
mod workflows;

pub use descriptors::{
    create_resource, CreateParams, Param, ResourceDescriptor, ResourceKind, TestType, Tool,
};
pub use queries::{
    get_all, get_artifact_context, search_sbom, QueryFilter, QueryTemplate, SbomSearch,
    SearchMethod, ALL_TEMPLATES, ARTIFACTS, ASSETS, ASSET_VERSIONS, BUSINESS_UNITS,
    DEFAULT_PAGE_SIZE, FINDINGS, ORGANIZATIONS, PRODUCTS, PRODUCT_ASSET_VERSIONS,
    SOFTWARE_COMPONENTS, USERS,
};
pub use workflows::{
    create_asset_version_and_upload_binary, create_asset_version_and_upload_test_results,
    create_upload_test, UploadTestParams,
};
