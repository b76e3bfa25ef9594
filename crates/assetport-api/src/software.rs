//! Software installed on an imported asset

use std::collections::BTreeMap;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::asset::{AttributeValue, CustomAttributes, null_as_default};
use crate::error::ValidationError;
use crate::formats::check_cpe;
use crate::validate::{
    MAX_TEXT_LEN, Validate, check_custom_attributes, check_opt_len, lowercase,
};

/// A software package, identified by CPE-style components
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Software {
    /// Identifier unique within the asset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_from: Option<String>,
    /// Size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_size: Option<u64>,
    /// Address of the service the software backs, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_address: Option<IpAddr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_port: Option<u16>,
    /// Transport protocol, stored lower-case
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_transport: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sw_edition: Option<String>,
    #[serde(rename = "targetSW", default, skip_serializing_if = "Option::is_none")]
    pub target_sw: Option<String>,
    #[serde(rename = "targetHW", default, skip_serializing_if = "Option::is_none")]
    pub target_hw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other: Option<String>,
    /// CPE 2.3 name, stored lower-case
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpe23: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub custom_attributes: CustomAttributes,
}

impl Software {
    /// Create a software entry with only its identifier set
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Set vendor, product and version
    #[must_use]
    pub fn with_product(
        mut self,
        vendor: impl Into<String>,
        product: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        self.vendor = Some(vendor.into());
        self.product = Some(product.into());
        self.version = Some(version.into());
        self
    }

    /// Set the CPE 2.3 name
    #[must_use]
    pub fn with_cpe23(mut self, cpe: impl Into<String>) -> Self {
        self.cpe23 = Some(cpe.into());
        self
    }

    /// Set the service the software is listening on
    #[must_use]
    pub fn with_service(
        mut self,
        address: IpAddr,
        port: u16,
        transport: impl Into<String>,
    ) -> Self {
        self.service_address = Some(address);
        self.service_port = Some(port);
        self.service_transport = Some(transport.into());
        self
    }

    /// Set a custom attribute
    #[must_use]
    pub fn with_custom_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.custom_attributes
            .insert(key.into(), value.into().into_string());
        self
    }
}

impl Validate for Software {
    fn normalize(&mut self) {
        lowercase(&mut self.service_transport);
        lowercase(&mut self.cpe23);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let text_fields = [
            ("id", &self.id),
            ("installedFrom", &self.installed_from),
            ("serviceTransport", &self.service_transport),
            ("vendor", &self.vendor),
            ("product", &self.product),
            ("version", &self.version),
            ("update", &self.update),
            ("edition", &self.edition),
            ("language", &self.language),
            ("swEdition", &self.sw_edition),
            ("targetSW", &self.target_sw),
            ("targetHW", &self.target_hw),
            ("other", &self.other),
            ("cpe23", &self.cpe23),
        ];
        for (field, value) in text_fields {
            check_opt_len(field, value.as_ref(), MAX_TEXT_LEN)?;
        }
        if let Some(cpe) = &self.cpe23 {
            check_cpe("cpe23", cpe)?;
        }
        check_custom_attributes(&self.custom_attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_cpe_and_transport() {
        let sw = Software::new("s1")
            .with_cpe23("CPE:2.3:A:Vendor:Product:1.0")
            .with_service("10.0.0.1".parse().unwrap(), 443, "TCP")
            .validated()
            .unwrap();

        assert_eq!(sw.cpe23.as_deref(), Some("cpe:2.3:a:vendor:product:1.0"));
        assert_eq!(sw.service_transport.as_deref(), Some("tcp"));
    }

    #[test]
    fn test_invalid_cpe_rejected() {
        let err = Software::new("s1").with_cpe23("foo").validated().unwrap_err();
        assert_eq!(err.field(), Some("cpe23"));
    }

    #[test]
    fn test_service_address_accepts_either_ip_version() {
        let v4: Software = serde_json::from_str(r#"{"serviceAddress": "192.0.2.1"}"#).unwrap();
        let v6: Software = serde_json::from_str(r#"{"serviceAddress": "2001:db8::1"}"#).unwrap();
        assert!(v4.service_address.unwrap().is_ipv4());
        assert!(v6.service_address.unwrap().is_ipv6());

        assert!(serde_json::from_str::<Software>(r#"{"serviceAddress": "nope"}"#).is_err());
    }

    #[test]
    fn test_target_fields_use_upper_suffix() {
        let sw = Software {
            target_sw: Some("windows".into()),
            target_hw: Some("x64".into()),
            ..Software::default()
        };
        let value = serde_json::to_value(&sw).unwrap();
        assert_eq!(value["targetSW"], "windows");
        assert_eq!(value["targetHW"], "x64");
    }

    #[test]
    fn test_vendor_length_limit() {
        let sw = Software::new("s1").with_product("v".repeat(1025), "p", "1");
        assert!(sw.validate().is_err());
    }
}
