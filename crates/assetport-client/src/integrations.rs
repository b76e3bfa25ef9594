//! Custom integration (custom asset source) management

use assetport_api::{CustomIntegration, NewCustomIntegration, Validate};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{ClientError, Result};
use crate::http::HttpClient;

const ORG_ENDPOINT: &str = "api/v1.0/org/custom-integrations";
const ACCOUNT_ENDPOINT: &str = "api/v1.0/account/custom-integrations";

/// Read access to the custom integrations visible to an organization
#[derive(Debug, Clone)]
pub struct CustomIntegrations {
    client: HttpClient,
}

impl CustomIntegrations {
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// List every custom integration
    ///
    /// # Errors
    /// Returns an error if the request fails or the server returns an error.
    pub async fn list(&self, org_id: Uuid) -> Result<Vec<CustomIntegration>> {
        self.client.get(ORG_ENDPOINT, &org_query(org_id)).await
    }

    /// Get a custom integration by id or, failing that, by name
    ///
    /// Returns `Ok(None)` when no integration has the given name.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidArgument`] if neither `id` nor `name`
    /// is given, or any transport or API error.
    #[instrument(skip(self))]
    pub async fn get(
        &self,
        org_id: Uuid,
        id: Option<Uuid>,
        name: Option<&str>,
    ) -> Result<Option<CustomIntegration>> {
        match (id, name) {
            (Some(id), _) => self
                .client
                .get(&format!("{ORG_ENDPOINT}/{id}"), &org_query(org_id))
                .await
                .map(Some),
            (None, Some(name)) => Ok(find_by_name(self.list(org_id).await?, name)),
            (None, None) => Err(missing_lookup()),
        }
    }
}

/// Account-level custom integration management
///
/// Requires an account key.
#[derive(Debug, Clone)]
pub struct CustomIntegrationsAdmin {
    client: HttpClient,
}

impl CustomIntegrationsAdmin {
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// List every custom integration in the account
    ///
    /// # Errors
    /// Returns an error if the request fails or the server returns an error.
    pub async fn list(&self) -> Result<Vec<CustomIntegration>> {
        self.client.get(ACCOUNT_ENDPOINT, &[]).await
    }

    /// Get a custom integration by id or, failing that, by name
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidArgument`] if neither `id` nor `name`
    /// is given, or any transport or API error.
    #[instrument(skip(self))]
    pub async fn get(
        &self,
        id: Option<Uuid>,
        name: Option<&str>,
    ) -> Result<Option<CustomIntegration>> {
        match (id, name) {
            (Some(id), _) => self
                .client
                .get(&format!("{ACCOUNT_ENDPOINT}/{id}"), &[])
                .await
                .map(Some),
            (None, Some(name)) => Ok(find_by_name(self.list().await?, name)),
            (None, None) => Err(missing_lookup()),
        }
    }

    /// Register a new custom integration
    ///
    /// # Errors
    /// Returns a validation error for a name with whitespace or an oversized
    /// icon, or any transport or API error.
    #[instrument(skip(self, integration), fields(name = %integration.name))]
    pub async fn create(&self, integration: &NewCustomIntegration) -> Result<CustomIntegration> {
        integration.validate()?;
        let created: CustomIntegration = self.client.post(ACCOUNT_ENDPOINT, integration).await?;
        info!(id = %created.id, "custom integration created");
        Ok(created)
    }

    /// Delete a custom integration
    ///
    /// # Errors
    /// Returns an error if the request fails or the server returns an error.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.client
            .delete(&format!("{ACCOUNT_ENDPOINT}/{id}"))
            .await?;
        info!("custom integration deleted");
        Ok(())
    }
}

pub(crate) fn org_query(org_id: Uuid) -> [(&'static str, String); 1] {
    [("_oid", org_id.to_string())]
}

fn find_by_name(integrations: Vec<CustomIntegration>, name: &str) -> Option<CustomIntegration> {
    integrations.into_iter().find(|ci| ci.name == name)
}

fn missing_lookup() -> ClientError {
    ClientError::InvalidArgument("must provide a custom integration id or name".to_string())
}
