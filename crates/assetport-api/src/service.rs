//! Network services exposed by an imported asset

use std::collections::BTreeMap;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::asset::{AttributeValue, CustomAttributes, null_as_default};
use crate::error::ValidationError;
use crate::validate::{
    MAX_TEXT_LEN, Validate, check_custom_attributes, check_opt_len, check_strings, lowercase,
};

/// Maximum number of protocols on a service
pub const MAX_PROTOCOLS: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<IpAddr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Transport protocol, stored lower-case
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<String>,
    /// Virtual host name the service answers for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vhost: Option<String>,
    /// Application protocols spoken, e.g. `http`, `tls`
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub protocols: Vec<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub custom_attributes: CustomAttributes,
}

impl Service {
    pub fn new(address: IpAddr, port: u16, transport: impl Into<String>) -> Self {
        Self {
            address: Some(address),
            port: Some(port),
            transport: Some(transport.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocols.push(protocol.into());
        self
    }

    #[must_use]
    pub fn with_vhost(mut self, vhost: impl Into<String>) -> Self {
        self.vhost = Some(vhost.into());
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

impl Validate for Service {
    fn normalize(&mut self) {
        lowercase(&mut self.transport);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_opt_len("transport", self.transport.as_ref(), MAX_TEXT_LEN)?;
        check_opt_len("vhost", self.vhost.as_ref(), MAX_TEXT_LEN)?;
        check_strings("protocols", &self.protocols, MAX_PROTOCOLS, MAX_TEXT_LEN)?;
        check_custom_attributes(&self.custom_attributes)
    }
}
