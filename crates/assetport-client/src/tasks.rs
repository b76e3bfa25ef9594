//! Task lookup

use assetport_api::Task;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ClientError, Result};
use crate::http::HttpClient;
use crate::integrations::org_query;

const ENDPOINT: &str = "api/v1.0/org/tasks";

/// Read access to an organization's tasks
#[derive(Debug, Clone)]
pub struct Tasks {
    client: HttpClient,
}

impl Tasks {
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// List tasks, optionally filtered by status and a search query
    ///
    /// # Errors
    /// Returns an error if the request fails or the server returns an error.
    pub async fn list(
        &self,
        org_id: Uuid,
        status: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<Task>> {
        let mut query = org_query(org_id).to_vec();
        if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
            query.push(("search", search.to_string()));
        }
        if let Some(status) = status.map(str::trim).filter(|s| !s.is_empty()) {
            query.push(("status", status.to_string()));
        }
        self.client.get(ENDPOINT, &query).await
    }

    /// Get a task by id or, failing that, by name
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
    ) -> Result<Option<Task>> {
        match (id, name) {
            (Some(id), _) => self
                .client
                .get(&format!("{ENDPOINT}/{id}"), &org_query(org_id))
                .await
                .map(Some),
            (None, Some(name)) => Ok(self
                .list(org_id, None, None)
                .await?
                .into_iter()
                .find(|task| task.name.as_deref() == Some(name))),
            (None, None) => Err(ClientError::InvalidArgument(
                "must provide a task id or name".to_string(),
            )),
        }
    }

    /// Current status of a task, e.g. `processed`
    ///
    /// # Errors
    /// Returns an error if the request fails or the server returns an error.
    pub async fn status(&self, org_id: Uuid, id: Uuid) -> Result<Option<String>> {
        let task: Task = self
            .client
            .get(&format!("{ENDPOINT}/{id}"), &org_query(org_id))
            .await?;
        Ok(task.status)
    }
}
