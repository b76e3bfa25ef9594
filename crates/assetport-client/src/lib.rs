//! assetport-client: HTTP client library for the asset inventory API
//!
//! Provides the authenticated HTTP transport, the bulk encoder that turns
//! import assets into an upload body, and managers for asset imports,
//! custom integrations and tasks.
//!
//! # Examples
//!
//! ```no_run
//! use assetport_api::{ImportAsset, ImportTask};
//! use assetport_client::{CustomAssets, Credentials, HttpClient, IntegrationRef, Tasks};
//! use uuid::Uuid;
//!
//! # async fn example(org: Uuid, site: Uuid, integration: Uuid) -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::builder(Credentials::OrgKey("OT...".into()))
//!     .timeout(std::time::Duration::from_secs(60))
//!     .build()?;
//!
//! let assets = vec![ImportAsset::new("host-1").with_tag("env=prod")];
//! let task = CustomAssets::new(client.clone())
//!     .upload_assets(
//!         org,
//!         site,
//!         IntegrationRef::Custom(integration),
//!         &assets,
//!         Some(ImportTask::new("nightly sync")),
//!     )
//!     .await?;
//!
//! let status = Tasks::new(client).status(org, task.id).await?;
//! println!("{status:?}");
//! # Ok(())
//! # }
//! ```

pub mod encode;
pub mod error;
pub mod http;
pub mod imports;
pub mod integrations;
pub mod tasks;

pub use encode::{AssetImportRequest, IntegrationRef, encode_assets};
pub use error::{ClientError, Result};
pub use http::{Credentials, HttpClient, HttpClientBuilder, RateLimitInfo};
pub use imports::CustomAssets;
pub use integrations::{CustomIntegrations, CustomIntegrationsAdmin};
pub use tasks::Tasks;
