//! Custom asset import

use assetport_api::{ImportAsset, ImportTask, Task};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::encode::{AssetImportRequest, IntegrationRef};
use crate::error::Result;
use crate::http::HttpClient;

/// Uploads custom asset data into a site
#[derive(Debug, Clone)]
pub struct CustomAssets {
    client: HttpClient,
}

impl CustomAssets {
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Upload assets and return the task created to process them
    ///
    /// The server merges assets with its existing inventory; an asset with a
    /// `run_zero_id` is merged onto that asset regardless of match rules.
    ///
    /// # Errors
    /// Returns a validation error before any request is made if the task or
    /// an asset is invalid, otherwise any transport or API error.
    ///
    /// # Example
    /// ```no_run
    /// # use assetport_client::{CustomAssets, Credentials, HttpClient, IntegrationRef};
    /// # use assetport_api::ImportAsset;
    /// # use uuid::Uuid;
    /// # async fn example(org: Uuid, site: Uuid, integration: Uuid) -> Result<(), Box<dyn std::error::Error>> {
    /// let client = HttpClient::new("https://console.runzero.com", Credentials::OrgKey("OT...".into()))?;
    /// let assets = vec![ImportAsset::new("host-1").with_hostname("host-1.example.com")];
    /// let task = CustomAssets::new(client)
    ///     .upload_assets(org, site, IntegrationRef::Custom(integration), &assets, None)
    ///     .await?;
    /// println!("import task {}", task.id);
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self, assets, task), fields(assets = assets.len()))]
    pub async fn upload_assets(
        &self,
        org_id: Uuid,
        site_id: Uuid,
        integration: IntegrationRef,
        assets: &[ImportAsset],
        task: Option<ImportTask>,
    ) -> Result<Task> {
        let request = AssetImportRequest::new(site_id, integration, task, assets)?;
        info!(
            task = %request.task.name,
            bytes = request.asset_data.len(),
            "uploading assets"
        );

        let path = format!("api/v1.0/import/org/{org_id}/assets");
        let task: Task = self
            .client
            .post_multipart(&path, request.into_form()?)
            .await?;
        info!(task_id = %task.id, "import task created");
        Ok(task)
    }
}
