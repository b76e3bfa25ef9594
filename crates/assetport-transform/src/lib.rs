//! assetport-transform: Turn external data into import assets
//!
//! Reads CSV files or JSON documents, normalizes key casing, applies an
//! optional field mapping, folds unknown keys into custom attributes and
//! validates each resulting [`assetport_api::ImportAsset`].
//!
//! ```no_run
//! use assetport_transform::{FieldMapping, assets_from_csv};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mapping = FieldMapping::new().map("id", "asset_id").map("os", "platform");
//! let assets = assets_from_csv("inventory.csv", Some(&mapping))?;
//! println!("{} assets", assets.len());
//! # Ok(())
//! # }
//! ```

pub mod casing;
pub mod error;
pub mod ingest;
pub mod mapping;

pub use casing::to_camel_case;
pub use error::{Result, TransformError};
pub use ingest::{assets_from_csv, assets_from_csv_reader, assets_from_json};
pub use mapping::{FieldMapping, map_asset, remap_record};
