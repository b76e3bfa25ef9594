//! The import asset record and its network interfaces

use std::collections::BTreeMap;
use std::net::{Ipv4Addr, Ipv6Addr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::formats::check_mac_address;
use crate::service::Service;
use crate::software::Software;
use crate::validate::{
    MAX_HOSTNAME_LEN, MAX_HOSTNAMES, MAX_IPV4_ADDRESSES, MAX_IPV6_ADDRESSES,
    MAX_NETWORK_INTERFACES, MAX_SERVICES, MAX_SOFTWARE, MAX_TAGS, MAX_TEXT_LEN,
    MAX_VULNERABILITIES, Validate, check_count, check_custom_attributes, check_len,
    check_opt_len, check_records, check_strings,
};
use crate::vulnerability::Vulnerability;

/// Flat string map of attributes not covered by the schema
pub type CustomAttributes = BTreeMap<String, String>;

// ============================================================================
// Custom attribute values
// ============================================================================

/// Single-value wrapper kept for callers written against the old attribute API
#[deprecated(note = "custom attribute values are plain strings; pass a String instead")]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomAttribute(String);

#[allow(deprecated)]
impl CustomAttribute {
    /// Wrap a value, enforcing the attribute value length limit
    ///
    /// # Errors
    /// Returns an error if the value is longer than 1024 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        check_len(
            "customAttribute",
            &value,
            crate::validate::MAX_ATTRIBUTE_VALUE_LEN,
        )?;
        Ok(Self(value))
    }

    /// The wrapped value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A custom attribute value as accepted from callers
#[allow(deprecated)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// Plain string value
    Plain(String),
    /// Value wrapped in the deprecated [`CustomAttribute`] type
    Legacy(CustomAttribute),
}

#[allow(deprecated)]
impl AttributeValue {
    /// Unwrap into the plain string stored on records
    #[must_use]
    pub fn into_string(self) -> String {
        match self {
            AttributeValue::Plain(value) => value,
            AttributeValue::Legacy(wrapped) => wrapped.0,
        }
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Plain(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Plain(value.to_string())
    }
}

#[allow(deprecated)]
impl From<CustomAttribute> for AttributeValue {
    fn from(value: CustomAttribute) -> Self {
        AttributeValue::Legacy(value)
    }
}

/// Collect caller-supplied attributes into the plain map stored on records
pub fn custom_attributes<I, K, V>(entries: I) -> CustomAttributes
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<AttributeValue>,
{
    entries
        .into_iter()
        .map(|(k, v)| (k.into(), v.into().into_string()))
        .collect()
}

/// Treat an explicit JSON `null` like a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Network interfaces
// ============================================================================

/// Network interface of an imported asset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    /// MAC/EUI-48 or EUI-64 address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    /// IPv4 addresses, most to least identifying
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub ipv4_addresses: Vec<Ipv4Addr>,
    /// IPv6 addresses, most to least identifying
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub ipv6_addresses: Vec<Ipv6Addr>,
}

impl NetworkInterface {
    /// Create an empty interface
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the MAC address
    #[must_use]
    pub fn with_mac(mut self, mac: impl Into<String>) -> Self {
        self.mac_address = Some(mac.into());
        self
    }

    /// Add an IPv4 address
    #[must_use]
    pub fn with_ipv4(mut self, addr: Ipv4Addr) -> Self {
        self.ipv4_addresses.push(addr);
        self
    }

    /// Add an IPv6 address
    #[must_use]
    pub fn with_ipv6(mut self, addr: Ipv6Addr) -> Self {
        self.ipv6_addresses.push(addr);
        self
    }

    /// Parse address strings, sorting each into the IPv4 or IPv6 list
    ///
    /// # Errors
    /// Returns an error for the first string that is not an IP address.
    pub fn with_addresses<I, S>(mut self, addrs: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for addr in addrs {
            let addr = addr.as_ref();
            match addr.parse::<std::net::IpAddr>() {
                Ok(std::net::IpAddr::V4(v4)) => self.ipv4_addresses.push(v4),
                Ok(std::net::IpAddr::V6(v6)) => self.ipv6_addresses.push(v6),
                Err(_) => {
                    return Err(ValidationError::invalid_format(
                        "ipAddress",
                        addr,
                        "expected an IPv4 or IPv6 address",
                    ));
                }
            }
        }
        Ok(self)
    }
}

impl Validate for NetworkInterface {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(mac) = &self.mac_address {
            check_mac_address("macAddress", mac)?;
        }
        check_count("ipv4Addresses", self.ipv4_addresses.len(), MAX_IPV4_ADDRESSES)?;
        check_count("ipv6Addresses", self.ipv6_addresses.len(), MAX_IPV6_ADDRESSES)?;
        Ok(())
    }
}

// ============================================================================
// Import asset
// ============================================================================

/// A custom asset to be created or merged by the platform after import
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportAsset {
    /// Identifier unique within the reporting integration
    pub id: String,
    /// Existing platform asset to force-merge onto, bypassing match heuristics
    #[serde(rename = "runZeroID", default, skip_serializing_if = "Option::is_none")]
    pub run_zero_id: Option<Uuid>,
    /// Networking configuration
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub network_interfaces: Vec<NetworkInterface>,
    /// Short or fully-qualified hostnames
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub hostnames: Vec<String>,
    /// Domain applied to hostnames that are not fully qualified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Earliest time the integration saw the asset
    #[serde(rename = "firstSeenTS", default, skip_serializing_if = "Option::is_none")]
    pub first_seen_ts: Option<DateTime<Utc>>,
    /// Latest time the integration saw the asset
    #[serde(rename = "lastSeenTS", default, skip_serializing_if = "Option::is_none")]
    pub last_seen_ts: Option<DateTime<Utc>>,
    /// Operating system name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    /// Operating system version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    /// Hardware manufacturer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    /// Hardware model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Free-form classifiers, `key=value` or bare labels
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tags: Vec<String>,
    /// Device type, e.g. `Desktop`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    /// Attributes not described by the schema
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub custom_attributes: CustomAttributes,
    /// Installed software
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub software: Vec<Software>,
    /// Known vulnerabilities
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub vulnerabilities: Vec<Vulnerability>,
    /// Exposed services
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub services: Vec<Service>,
}

impl ImportAsset {
    /// Create an asset with only its identifier set
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Force-merge onto an existing platform asset
    #[must_use]
    pub fn with_run_zero_id(mut self, id: Uuid) -> Self {
        self.run_zero_id = Some(id);
        self
    }

    /// Add a network interface
    #[must_use]
    pub fn with_network_interface(mut self, interface: NetworkInterface) -> Self {
        self.network_interfaces.push(interface);
        self
    }

    /// Add a hostname
    #[must_use]
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostnames.push(hostname.into());
        self
    }

    /// Set the domain
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set the operating system name and version
    #[must_use]
    pub fn with_os(mut self, os: impl Into<String>, version: impl Into<String>) -> Self {
        self.os = Some(os.into());
        self.os_version = Some(version.into());
        self
    }

    /// Set the device type
    #[must_use]
    pub fn with_device_type(mut self, device_type: impl Into<String>) -> Self {
        self.device_type = Some(device_type.into());
        self
    }

    /// Add a tag
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Set a custom attribute, accepting plain strings or the legacy wrapper
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

    /// Add a software entry
    #[must_use]
    pub fn with_software(mut self, software: Software) -> Self {
        self.software.push(software);
        self
    }

    /// Add a vulnerability
    #[must_use]
    pub fn with_vulnerability(mut self, vulnerability: Vulnerability) -> Self {
        self.vulnerabilities.push(vulnerability);
        self
    }

    /// Add a service
    #[must_use]
    pub fn with_service(mut self, service: Service) -> Self {
        self.services.push(service);
        self
    }
}

impl Validate for ImportAsset {
    fn normalize(&mut self) {
        self.software.iter_mut().for_each(Validate::normalize);
        self.vulnerabilities.iter_mut().for_each(Validate::normalize);
        self.services.iter_mut().for_each(Validate::normalize);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_len("id", &self.id, MAX_TEXT_LEN)?;
        check_records(
            "networkInterfaces",
            &self.network_interfaces,
            MAX_NETWORK_INTERFACES,
        )?;
        check_strings("hostnames", &self.hostnames, MAX_HOSTNAMES, MAX_HOSTNAME_LEN)?;
        check_opt_len("domain", self.domain.as_ref(), MAX_HOSTNAME_LEN)?;
        check_opt_len("os", self.os.as_ref(), MAX_TEXT_LEN)?;
        check_opt_len("osVersion", self.os_version.as_ref(), MAX_TEXT_LEN)?;
        check_opt_len("manufacturer", self.manufacturer.as_ref(), MAX_TEXT_LEN)?;
        check_opt_len("model", self.model.as_ref(), MAX_TEXT_LEN)?;
        check_opt_len("deviceType", self.device_type.as_ref(), MAX_TEXT_LEN)?;
        check_strings("tags", &self.tags, MAX_TAGS, MAX_TEXT_LEN)?;
        check_custom_attributes(&self.custom_attributes)?;
        check_records("software", &self.software, MAX_SOFTWARE)?;
        check_records("vulnerabilities", &self.vulnerabilities, MAX_VULNERABILITIES)?;
        check_records("services", &self.services, MAX_SERVICES)?;
        Ok(())
    }
}
