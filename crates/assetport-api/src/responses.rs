//! Response types for the API

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A task as reported by the server
///
/// Task objects use snake_case keys on the wire. Every field except `id` is
/// optional; keys the server adds later are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    #[serde(default)]
    pub site_id: Option<Uuid>,
    #[serde(default)]
    pub custom_integration_id: Option<Uuid>,
    /// Numeric id of a built-in data source
    #[serde(default)]
    pub source_id: Option<i64>,
    #[serde(default)]
    pub created_by: Option<String>,
    /// Unix seconds
    #[serde(default)]
    pub created_at: Option<i64>,
    /// Unix seconds
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub params: Option<HashMap<String, String>>,
    #[serde(default)]
    pub stats: Option<HashMap<String, serde_json::Value>>,
}

impl Task {
    /// Whether the server finished processing the task
    #[must_use]
    pub fn is_processed(&self) -> bool {
        self.status.as_deref() == Some("processed")
    }
}

/// A registered custom integration (custom asset source)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomIntegration {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Decoded PNG icon
    #[serde(default, with = "icon_base64", skip_serializing_if = "Option::is_none")]
    pub icon: Option<Vec<u8>>,
    #[serde(default)]
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub created_by_id: Option<Uuid>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub destroyed_at: Option<DateTime<Utc>>,
}

/// Serde adapter carrying icon bytes as standard base64 text
pub(crate) mod icon_base64 {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(icon: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match icon {
            Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(text) if !text.is_empty() => STANDARD
                .decode(text.as_bytes())
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_ignores_unknown_fields() {
        let json = r#"{
            "id": "e77602e0-3fb8-4734-aef9-fbc6fdcb0fa8",
            "name": "Custom Asset Import",
            "type": "import",
            "status": "processed",
            "created_at": 1576300370,
            "recur": false,
            "stats": {"assets": 3}
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();

        assert_eq!(task.kind.as_deref(), Some("import"));
        assert_eq!(task.created_at, Some(1_576_300_370));
        assert!(task.is_processed());
    }

    #[test]
    fn test_custom_integration_decodes_icon() {
        let json = r#"{
            "id": "f6cfb91a-52ea-4a86-bf9a-5a891a26f52b",
            "name": "my-custom-integration",
            "icon": "cG5n",
            "createdAt": "2023-03-06T18:14:50.52Z"
        }"#;
        let ci: CustomIntegration = serde_json::from_str(json).unwrap();

        assert_eq!(ci.icon.as_deref(), Some(b"png".as_slice()));
        assert!(ci.created_at.is_some());
    }

    #[test]
    fn test_custom_integration_rejects_bad_icon() {
        let json = r#"{
            "id": "f6cfb91a-52ea-4a86-bf9a-5a891a26f52b",
            "name": "x",
            "icon": "***"
        }"#;
        assert!(serde_json::from_str::<CustomIntegration>(json).is_err());
    }
}
