//! Export job poller
//!
//! Launches a report or SBOM job, then sleeps and polls until the job reports
//! `COMPLETED` with a download link. The wait has no attempt limit; callers
//! bound it with the cancel future passed to `launch_and_await_until`.

use super::launch::LaunchMutation;
use super::types::{ExportJob, ExportRequest, ExportStatus};
use crate::error::{Error, Result};
use crate::http::{data_field, string_field, Transport};
use serde_json::json;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

const EXPORT_STATUS_QUERY: &str = r#"
query GenerateExportDownloadPresignedUrl($exportId: ID!) {
    generateExportDownloadPresignedUrl(exportId: $exportId) {
        downloadLink
        status
    }
}
"#;

const EXPORT_STATUS_FIELD: &str = "generateExportDownloadPresignedUrl";

/// Launches export jobs and waits for their download links
pub struct ExportPoller<'a, T: Transport + ?Sized> {
    transport: &'a T,
    interval: Duration,
}

impl<'a, T: Transport + ?Sized> ExportPoller<'a, T> {
    /// Create a poller sleeping `interval` before every status query
    pub fn new(transport: &'a T, interval: Duration) -> Self {
        Self {
            transport,
            interval,
        }
    }

    /// Get the poll interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Validate `request` and launch the job, returning its id
    pub async fn launch(&self, request: &ExportRequest) -> Result<String> {
        let target = request.validate()?;
        let mutation = LaunchMutation::resolve(request.format, request.subtype, &target);

        let response = self
            .transport
            .send(mutation.query, &mutation.variables)
            .await?;
        let launched = data_field(&response, mutation.field)?;
        let export_job_id = string_field(launched, mutation.field, "exportJobId")?;

        info!(
            export_job_id = %export_job_id,
            format = %request.format,
            subtype = %request.subtype,
            "launched export"
        );
        Ok(export_job_id)
    }

    /// Query the current state of a job once
    pub async fn status(&self, export_job_id: &str) -> Result<ExportJob> {
        let variables = json!({"exportId": export_job_id});
        let response = self.transport.send(EXPORT_STATUS_QUERY, &variables).await?;
        let job = data_field(&response, EXPORT_STATUS_FIELD)?;

        Ok(ExportJob {
            export_job_id: export_job_id.to_string(),
            status: ExportStatus::parse(job.get("status").and_then(|s| s.as_str())),
            download_link: job
                .get("downloadLink")
                .and_then(|l| l.as_str())
                .map(ToString::to_string),
        })
    }

    /// Poll until the job is ready, failed, or `cancel` resolves
    pub async fn wait_for(
        &self,
        export_job_id: &str,
        cancel: impl Future<Output = ()>,
    ) -> Result<String> {
        tokio::pin!(cancel);
        let cancelled = || Error::Cancelled {
            export_job_id: export_job_id.to_string(),
        };
        let mut attempts = 0u32;

        loop {
            tokio::select! {
                biased;
                () = &mut cancel => return Err(cancelled()),
                () = tokio::time::sleep(self.interval) => {}
            }

            let job = tokio::select! {
                biased;
                () = &mut cancel => return Err(cancelled()),
                job = self.status(export_job_id) => job?,
            };
            attempts += 1;

            if let Some(link) = job.ready_link() {
                info!(export_job_id, attempts, "export ready");
                return Ok(link.to_string());
            }

            match job.status {
                ExportStatus::Failed => {
                    return Err(Error::ExportFailed {
                        export_job_id: export_job_id.to_string(),
                        status: job.status.to_string(),
                    })
                }
                ExportStatus::Completed => {
                    warn!(
                        export_job_id,
                        attempts, "export reported COMPLETED without a download link"
                    );
                }
                ref status => {
                    debug!(export_job_id, attempts, status = %status, "export not ready");
                }
            }
        }
    }

    /// Launch a job and wait for its download link with no bound on the wait
    pub async fn launch_and_await(&self, request: &ExportRequest) -> Result<String> {
        self.launch_and_await_until(request, std::future::pending())
            .await
    }

    /// Launch a job and wait for its download link until `cancel` resolves
    pub async fn launch_and_await_until(
        &self,
        request: &ExportRequest,
        cancel: impl Future<Output = ()>,
    ) -> Result<String> {
        let export_job_id = self.launch(request).await?;
        self.wait_for(&export_job_id, cancel).await
    }

    /// Download a finished export to `path`
    pub async fn download(&self, download_link: &str, path: &Path) -> Result<u64> {
        let written = self.transport.download_to_file(download_link, path).await?;
        info!(bytes = written, path = %path.display(), "downloaded export");
        Ok(written)
    }
}
