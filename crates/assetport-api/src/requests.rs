//! Request types for the API

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::responses::icon_base64;
use crate::validate::{MAX_TAGS, MAX_TEXT_LEN, Validate, check_len, check_opt_len, check_strings};

/// Maximum length of an import task name
pub const MAX_TASK_NAME_LEN: usize = 100;
/// Maximum size of a custom integration icon, in bytes
pub const MAX_ICON_BYTES: usize = 200_000;

/// Metadata of the task created when asset data is imported
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportTask {
    /// Task name; a timestamped placeholder is used when blank
    #[serde(default)]
    pub name: String,
    /// Task description; a fixed placeholder is used when blank
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Tags applied to the import task (not to the assets)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Ask the server to drop assets it cannot match instead of creating them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_unknown: Option<bool>,
}

impl ImportTask {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    #[must_use]
    pub fn with_exclude_unknown(mut self, exclude: bool) -> Self {
        self.exclude_unknown = Some(exclude);
        self
    }

    /// Fill a blank name or description with the given placeholders
    ///
    /// Explicit non-blank values are never overwritten.
    pub fn apply_defaults(&mut self, name: impl FnOnce() -> String, description: &str) {
        if self.name.trim().is_empty() {
            self.name = name();
        }
        if self
            .description
            .as_deref()
            .is_none_or(|d| d.trim().is_empty())
        {
            self.description = Some(description.to_string());
        }
    }
}

impl Validate for ImportTask {
    fn validate(&self) -> Result<(), ValidationError> {
        check_len("name", &self.name, MAX_TASK_NAME_LEN)?;
        check_opt_len("description", self.description.as_ref(), MAX_TEXT_LEN)?;
        check_strings("tags", &self.tags, MAX_TAGS, MAX_TEXT_LEN)
    }
}

/// Body used to register a new custom integration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomIntegration {
    /// Unique name, without whitespace
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// PNG icon, at most 256x256 pixels
    #[serde(
        default,
        with = "icon_base64",
        skip_serializing_if = "Option::is_none"
    )]
    pub icon: Option<Vec<u8>>,
}

impl NewCustomIntegration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_icon(mut self, icon: Vec<u8>) -> Self {
        self.icon = Some(icon);
        self
    }
}

impl Validate for NewCustomIntegration {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() || self.name.chars().any(char::is_whitespace) {
            return Err(ValidationError::invalid_format(
                "name",
                &self.name,
                "expected a non-empty name without whitespace",
            ));
        }
        check_opt_len("description", self.description.as_ref(), MAX_TEXT_LEN)?;
        match &self.icon {
            Some(icon) if icon.len() > MAX_ICON_BYTES => Err(ValidationError::TooLong {
                field: "icon".to_string(),
                limit: MAX_ICON_BYTES,
                actual: icon.len(),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_blank_fields() {
        let mut task = ImportTask::new("  ");
        task.apply_defaults(|| "generated".to_string(), "placeholder");
        assert_eq!(task.name, "generated");
        assert_eq!(task.description.as_deref(), Some("placeholder"));
    }

    #[test]
    fn test_defaults_keep_explicit_values() {
        let mut task = ImportTask::new("nightly").with_description("from the CMDB");
        task.apply_defaults(|| unreachable!(), "placeholder");
        assert_eq!(task.name, "nightly");
        assert_eq!(task.description.as_deref(), Some("from the CMDB"));
    }

    #[test]
    fn test_task_name_limit() {
        assert!(ImportTask::new("n".repeat(100)).validate().is_ok());
        assert!(ImportTask::new("n".repeat(101)).validate().is_err());
    }

    #[test]
    fn test_task_tag_limit() {
        let mut task = ImportTask::new("tags");
        task.tags = (0..101).map(|i| i.to_string()).collect();
        assert!(task.validate().is_err());
    }

    #[test]
    fn test_integration_name_rejects_whitespace() {
        assert!(NewCustomIntegration::new("my-source").validate().is_ok());
        assert!(NewCustomIntegration::new("my source").validate().is_err());
        assert!(NewCustomIntegration::new("").validate().is_err());
    }

    #[test]
    fn test_integration_icon_size_limit() {
        let ok = NewCustomIntegration::new("icon").with_icon(vec![0; MAX_ICON_BYTES]);
        assert!(ok.validate().is_ok());

        let big = NewCustomIntegration::new("icon").with_icon(vec![0; MAX_ICON_BYTES + 1]);
        assert!(big.validate().is_err());
    }

    #[test]
    fn test_integration_icon_is_base64_on_the_wire() {
        let body = NewCustomIntegration::new("icon").with_icon(b"png".to_vec());
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["icon"], "cG5n");
    }
}
