//! assetport-api: Asset import data model
//!
//! Contains the import asset record and its nested records, the wire field
//! names of each, the validation rules they must satisfy before upload, and
//! the request/response types shared by the client and CLI.

pub mod asset;
pub mod error;
pub mod fields;
pub mod formats;
pub mod requests;
pub mod responses;
pub mod service;
pub mod software;
pub mod validate;
pub mod vulnerability;

#[allow(deprecated)]
pub use asset::CustomAttribute;
pub use asset::{
    AttributeValue, CustomAttributes, ImportAsset, NetworkInterface, custom_attributes,
};
pub use error::ValidationError;
pub use fields::{
    AssetField, NetworkInterfaceField, ServiceField, SoftwareField, VulnerabilityField,
};
pub use requests::{ImportTask, NewCustomIntegration};
pub use responses::{CustomIntegration, Task};
pub use service::Service;
pub use software::Software;
pub use validate::Validate;
pub use vulnerability::Vulnerability;
