//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{ClientConfig, Credentials};
use crate::error::{Error, Result, ResultExt};
use crate::export::{ExportFormat, ExportPoller, ExportRequest, ExportSubtype};
use crate::http::ApiClient;
use crate::pagination::{fetch_all, QueryDescriptor};
use crate::resources::{get_all, QueryFilter, QueryTemplate, ALL_TEMPLATES};
use crate::types::JsonValue;
use crate::upload::{upload_file_for_binary_analysis, upload_test_results_file, UploadReceipt};
use serde_json::json;
use std::fs;
use std::path::Path;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let client = self.client()?;
        match &self.cli.command {
            Commands::Token => self.token(&client).await,
            Commands::Query {
                file,
                field,
                variables,
            } => self.query(&client, file, field, variables.as_deref()).await,
            Commands::List {
                resource,
                id,
                business_unit,
                asset_version,
                product,
                category,
                component_type,
            } => {
                let filter = QueryFilter {
                    id: id.clone(),
                    business_unit_id: business_unit.clone(),
                    asset_version_id: asset_version.clone(),
                    product_id: product.clone(),
                    category: category.clone(),
                    component_type: component_type.clone(),
                };
                self.list(&client, resource, &filter).await
            }
            Commands::UploadBinary {
                test_id,
                file,
                chunk_size,
            } => {
                let chunk_size = chunk_size.unwrap_or(client.config().chunk_size);
                let receipt =
                    upload_file_for_binary_analysis(&client, test_id, file, chunk_size).await?;
                self.output_receipt(&receipt);
                Ok(())
            }
            Commands::UploadResults { test_id, file } => {
                let receipt = upload_test_results_file(&client, test_id, file).await?;
                self.output_receipt(&receipt);
                Ok(())
            }
            Commands::Export {
                format,
                subtype,
                asset_version,
                product,
                output,
            } => {
                let format: ExportFormat = format.parse()?;
                let subtype: ExportSubtype = subtype.parse()?;
                let mut request = ExportRequest::new(format, subtype);
                if let Some(id) = asset_version {
                    request = request.asset_version(id);
                }
                if let Some(id) = product {
                    request = request.product(id);
                }
                self.export(&client, &request, output.as_deref()).await
            }
        }
    }

    /// Load the client config file, or defaults when none is given
    fn load_config(&self) -> Result<ClientConfig> {
        match &self.cli.config {
            Some(path) => ClientConfig::from_yaml_file(path)
                .context(format!("Failed to load config {}", path.display())),
            None => Ok(ClientConfig::default()),
        }
    }

    fn client(&self) -> Result<ApiClient> {
        let config = self.load_config()?;
        let credentials = Credentials::from_env()?;
        ApiClient::new(config, credentials)
    }

    // ========================================================================
    // Commands
    // ========================================================================

    async fn token(&self, client: &ApiClient) -> Result<()> {
        let token = client.bearer_token().await?;
        self.output_message(&json!({ "type": "TOKEN", "token": token }));
        Ok(())
    }

    async fn query(
        &self,
        client: &ApiClient,
        file: &Path,
        field: &str,
        variables: Option<&str>,
    ) -> Result<()> {
        if !file.exists() {
            return Err(Error::FileNotFound {
                path: file.display().to_string(),
            });
        }
        let query = fs::read_to_string(file)?;
        let variables: JsonValue = match variables {
            Some(raw) => serde_json::from_str(raw).context("Invalid --variables JSON")?,
            None => JsonValue::Null,
        };

        let descriptor = QueryDescriptor::new(query, field).with_variables(variables);
        let records = fetch_all(client, &descriptor).await?;
        self.output_records(field, &records);
        Ok(())
    }

    async fn list(&self, client: &ApiClient, resource: &str, filter: &QueryFilter) -> Result<()> {
        let template = QueryTemplate::by_name(resource).ok_or_else(|| {
            let known: Vec<&str> = ALL_TEMPLATES.iter().map(|t| t.name).collect();
            Error::validation(format!(
                "Unknown resource '{resource}'. Available: {}",
                known.join(", ")
            ))
        })?;

        let records = get_all(client, template, filter).await?;
        self.output_records(template.name, &records);
        Ok(())
    }

    async fn export(
        &self,
        client: &ApiClient,
        request: &ExportRequest,
        output: Option<&Path>,
    ) -> Result<()> {
        let poller = ExportPoller::new(client, client.config().export_poll_interval);
        let cancel = async {
            // A failed handler install means no Ctrl-C; keep polling.
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        };

        let link = poller.launch_and_await_until(request, cancel).await?;
        let mut message = json!({
            "type": "EXPORT",
            "export": {
                "format": request.format.to_string(),
                "subtype": request.subtype.to_string(),
                "downloadLink": link,
            }
        });

        if let Some(path) = output {
            let bytes = poller.download(&link, path).await?;
            info!(path = %path.display(), bytes, "export downloaded");
            message["export"]["path"] = json!(path.display().to_string());
            message["export"]["bytes"] = json!(bytes);
        }

        self.output_message(&message);
        Ok(())
    }

    // ========================================================================
    // Output
    // ========================================================================

    fn output_records(&self, stream: &str, records: &[JsonValue]) {
        for record in records {
            self.output_message(&json!({
                "type": "RECORD",
                "record": { "stream": stream, "data": record }
            }));
        }
        info!(stream, count = records.len(), "query complete");
    }

    fn output_receipt(&self, receipt: &UploadReceipt) {
        self.output_message(&json!({
            "type": "UPLOAD",
            "upload": {
                "testId": receipt.test_id,
                "key": receipt.key,
                "parts": receipt.parts,
                "response": receipt.response,
            }
        }));
    }

    /// Output a message
    fn output_message(&self, msg: &JsonValue) {
        match self.cli.output_format {
            OutputFormat::Json => {
                if let Ok(line) = serde_json::to_string(msg) {
                    println!("{line}");
                }
            }
            OutputFormat::Pretty => {
                if let Ok(text) = serde_json::to_string_pretty(msg) {
                    println!("{text}");
                }
            }
        }
    }
}
