//! Upload module
//!
//! Moves files to the platform through pre-signed object-storage URLs.
//!
//! # Protocols
//!
//! - **Multipart** (binary analysis): `startMultipartUpload`, then per chunk
//!   `generateUploadPartUrl` + PUT, then `completeMultipartUpload` with the
//!   ordered `(ETag, PartNumber)` list
//! - **Single file** (scanner results): `generateTestResultUploadUrl`, one PUT
//!   of the whole file, then `completeTestResultUpload` with the object key
//!
//! The two completion contracts differ and are kept as separate code paths.

mod chunks;
mod multipart;
mod test_results;
mod types;

pub use chunks::ChunkReader;
pub use multipart::{upload_file_for_binary_analysis, MultipartUploader};
pub use test_results::upload_test_results_file;
pub use types::{CompletedPart, UploadReceipt, UploadSession};
