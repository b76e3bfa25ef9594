//! Vulnerabilities reported against an imported asset

use std::collections::BTreeMap;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::asset::{AttributeValue, CustomAttributes, null_as_default};
use crate::error::ValidationError;
use crate::formats::{check_cpe, check_cve};
use crate::validate::{
    MAX_LONG_TEXT_LEN, MAX_TEXT_LEN, Validate, check_custom_attributes, check_opt_len,
    check_range, lowercase, uppercase,
};

/// Upper bound of CVSS, severity and risk scores
pub const MAX_SCORE: f64 = 10.0;
/// Upper bound of severity and risk ranks
pub const MAX_RANK: u8 = 4;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vulnerability {
    /// Identifier unique within the asset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    /// CVE identifier, stored upper-case
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cve: Option<String>,
    /// CPE 2.3 name of the affected product, stored lower-case
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpe23: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_address: Option<IpAddr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_port: Option<u16>,
    /// Transport protocol, stored lower-case
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_transport: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvss2_base_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvss2_temporal_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvss3_base_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvss3_temporal_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity_score: Option<f64>,
    /// 0 (info) to 4 (critical)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity_rank: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
    /// 0 (info) to 4 (critical)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_rank: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exploitable: Option<bool>,
    #[serde(rename = "firstDetectedTS", default, skip_serializing_if = "Option::is_none")]
    pub first_detected_ts: Option<DateTime<Utc>>,
    #[serde(rename = "lastDetectedTS", default, skip_serializing_if = "Option::is_none")]
    pub last_detected_ts: Option<DateTime<Utc>>,
    #[serde(rename = "publishedTS", default, skip_serializing_if = "Option::is_none")]
    pub published_ts: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub custom_attributes: CustomAttributes,
}

impl Vulnerability {
    /// Create a vulnerability with only its identifier set
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Set the CVE identifier
    #[must_use]
    pub fn with_cve(mut self, cve: impl Into<String>) -> Self {
        self.cve = Some(cve.into());
        self
    }

    /// Set the CPE 2.3 name
    #[must_use]
    pub fn with_cpe23(mut self, cpe: impl Into<String>) -> Self {
        self.cpe23 = Some(cpe.into());
        self
    }

    /// Set the display name and description
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self.description = Some(description.into());
        self
    }

    /// Set the severity score and rank
    #[must_use]
    pub fn with_severity(mut self, score: f64, rank: u8) -> Self {
        self.severity_score = Some(score);
        self.severity_rank = Some(rank);
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

impl Validate for Vulnerability {
    fn normalize(&mut self) {
        uppercase(&mut self.cve);
        lowercase(&mut self.cpe23);
        lowercase(&mut self.service_transport);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let text_fields = [
            ("id", &self.id),
            ("name", &self.name),
            ("cve", &self.cve),
            ("cpe23", &self.cpe23),
            ("serviceTransport", &self.service_transport),
        ];
        for (field, value) in text_fields {
            check_opt_len(field, value.as_ref(), MAX_TEXT_LEN)?;
        }
        check_opt_len("description", self.description.as_ref(), MAX_LONG_TEXT_LEN)?;
        check_opt_len("solution", self.solution.as_ref(), MAX_LONG_TEXT_LEN)?;

        if let Some(cve) = &self.cve {
            check_cve("cve", cve)?;
        }
        if let Some(cpe) = &self.cpe23 {
            check_cpe("cpe23", cpe)?;
        }

        let scores = [
            ("cvss2BaseScore", self.cvss2_base_score),
            ("cvss2TemporalScore", self.cvss2_temporal_score),
            ("cvss3BaseScore", self.cvss3_base_score),
            ("cvss3TemporalScore", self.cvss3_temporal_score),
            ("severityScore", self.severity_score),
            ("riskScore", self.risk_score),
        ];
        for (field, score) in scores {
            check_range(field, score, 0.0, MAX_SCORE)?;
        }
        check_range(
            "severityRank",
            self.severity_rank.map(f64::from),
            0.0,
            f64::from(MAX_RANK),
        )?;
        check_range(
            "riskRank",
            self.risk_rank.map(f64::from),
            0.0,
            f64::from(MAX_RANK),
        )?;

        check_custom_attributes(&self.custom_attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cve_is_uppercased_before_check() {
        let vuln = Vulnerability::new("v1")
            .with_cve("cve-1999-00001")
            .validated()
            .unwrap();
        assert_eq!(vuln.cve.as_deref(), Some("CVE-1999-00001"));
    }

    #[test]
    fn test_invalid_cve_rejected() {
        let err = Vulnerability::new("v1")
            .with_cve("CVE-INVALID")
            .validated()
            .unwrap_err();
        assert_eq!(err.field(), Some("cve"));
    }

    #[test]
    fn test_cpe_is_lowercased_before_check() {
        let vuln = Vulnerability::new("v1")
            .with_cpe23("CPE:/A:2.3:*")
            .validated()
            .unwrap();
        assert_eq!(vuln.cpe23.as_deref(), Some("cpe:/a:2.3:*"));

        assert!(Vulnerability::new("v1").with_cpe23("not-a-cpe").validated().is_err());
    }

    #[test]
    fn test_score_and_rank_bounds() {
        assert!(Vulnerability::new("v1").with_severity(10.0, 4).validate().is_ok());
        assert!(Vulnerability::new("v1").with_severity(10.1, 4).validate().is_err());
        assert!(Vulnerability::new("v1").with_severity(5.0, 5).validate().is_err());

        let negative = Vulnerability {
            cvss3_base_score: Some(-1.0),
            ..Vulnerability::default()
        };
        assert!(matches!(
            negative.validate(),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "cvss3BaseScore"
        ));
    }

    #[test]
    fn test_description_allows_long_text() {
        let vuln = Vulnerability::new("v1").with_name("n", "d".repeat(65_535));
        assert!(vuln.validate().is_ok());

        let vuln = Vulnerability::new("v1").with_name("n", "d".repeat(65_536));
        assert!(vuln.validate().is_err());
    }

    #[test]
    fn test_timestamp_wire_names() {
        let json = r#"{"id": "v1", "publishedTS": "2023-03-06T18:14:50Z", "exploitable": true}"#;
        let vuln: Vulnerability = serde_json::from_str(json).unwrap();
        assert!(vuln.published_ts.is_some());
        assert_eq!(vuln.exploitable, Some(true));

        let value = serde_json::to_value(&vuln).unwrap();
        assert!(value.get("publishedTS").is_some());
    }
}
