//! Bulk encoding of import assets into an upload body

use std::io::Write;

use assetport_api::{ImportAsset, ImportTask, Validate};
use chrono::Utc;
use flate2::Compression;
use flate2::write::GzEncoder;
use reqwest::multipart::{Form, Part};
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;

/// File name of the asset payload part
pub const ASSET_DATA_FILE_NAME: &str = "asset_data.jsonl.gz";

/// Description given to import tasks that do not set one
pub const DEFAULT_TASK_DESCRIPTION: &str = "assetport import";

/// Name given to import tasks that do not set one
#[must_use]
pub fn default_task_name() -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("Custom Asset Import {nanos}")
}

/// Validate assets and encode them as gzip-compressed NDJSON
///
/// Each asset is normalized, validated and written as one line of
/// camelCase JSON, in input order.
///
/// # Errors
/// Returns a validation error naming the position of the first invalid
/// asset, or an error if serialization fails.
pub fn encode_assets(assets: &[ImportAsset]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    for (i, asset) in assets.iter().enumerate() {
        let asset = asset
            .clone()
            .validated()
            .map_err(|err| err.within(format!("assets[{i}]")))?;
        serde_json::to_writer(&mut encoder, &asset)?;
        encoder.write_all(b"\n")?;
    }
    let payload = encoder.finish()?;
    debug!(assets = assets.len(), bytes = payload.len(), "encoded asset payload");
    Ok(payload)
}

/// The integration an import is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationRef {
    /// Built-in data source (older imports), sent as `sourceId`
    Source(Uuid),
    /// Custom integration, sent as `customIntegrationId`
    Custom(Uuid),
}

impl IntegrationRef {
    fn form_field(self) -> (&'static str, Uuid) {
        match self {
            IntegrationRef::Source(id) => ("sourceId", id),
            IntegrationRef::Custom(id) => ("customIntegrationId", id),
        }
    }
}

/// Everything sent to the asset import endpoint
#[derive(Debug, Clone)]
pub struct AssetImportRequest {
    pub site_id: Uuid,
    pub integration: IntegrationRef,
    pub task: ImportTask,
    /// Gzip-compressed NDJSON
    pub asset_data: Vec<u8>,
}

impl AssetImportRequest {
    /// Encode `assets` and fill in task defaults
    ///
    /// A blank task name or description is replaced by a placeholder;
    /// explicit values are kept.
    ///
    /// # Errors
    /// Returns a validation error if the task or any asset is invalid.
    pub fn new(
        site_id: Uuid,
        integration: IntegrationRef,
        task: Option<ImportTask>,
        assets: &[ImportAsset],
    ) -> Result<Self> {
        let mut task = task.unwrap_or_default();
        task.apply_defaults(default_task_name, DEFAULT_TASK_DESCRIPTION);
        task.exclude_unknown.get_or_insert(false);
        task.validate()
            .map_err(|err| err.within("importTask"))?;

        Ok(Self {
            site_id,
            integration,
            task,
            asset_data: encode_assets(assets)?,
        })
    }

    /// Text fields of the multipart body, in the order they are sent
    #[must_use]
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let (integration_key, integration_id) = self.integration.form_field();
        let mut fields = vec![
            ("siteId", self.site_id.to_string()),
            (integration_key, integration_id.to_string()),
            ("importTask.name", self.task.name.clone()),
            (
                "importTask.description",
                self.task.description.clone().unwrap_or_default(),
            ),
        ];
        if let IntegrationRef::Custom(_) = self.integration {
            let exclude = self.task.exclude_unknown.unwrap_or(false);
            fields.push(("importTask.excludeUnknown", exclude.to_string()));
        }
        fields.push(("importTask.tags", self.task.tags.join(",")));
        fields
    }

    /// Build the multipart body: the `assetData` file part, then the text fields
    ///
    /// # Errors
    /// Returns an error if the part's content type cannot be set.
    pub fn into_form(self) -> Result<Form> {
        let fields = self.form_fields();
        let asset_part = Part::bytes(self.asset_data)
            .file_name(ASSET_DATA_FILE_NAME)
            .mime_str("application/gzip")?;

        let form = fields
            .into_iter()
            .fold(Form::new().part("assetData", asset_part), |form, (key, value)| {
                form.text(key, value)
            });
        Ok(form)
    }
}
