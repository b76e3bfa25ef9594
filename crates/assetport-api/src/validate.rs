//! Record validation
//!
//! Every record type implements [`Validate`]. Checks are local and synchronous:
//! a record either passes as a whole or the first violation is returned.

use std::collections::BTreeMap;

use crate::error::{ValidationError, preview};

/// Maximum number of custom attributes on a single record
pub const MAX_CUSTOM_ATTRIBUTES: usize = 1024;
/// Maximum length of a custom attribute key
pub const MAX_ATTRIBUTE_KEY_LEN: usize = 256;
/// Maximum length of a custom attribute value
pub const MAX_ATTRIBUTE_VALUE_LEN: usize = 1024;

/// Maximum length of descriptive string fields
pub const MAX_TEXT_LEN: usize = 1024;
/// Maximum length of long-form text (vulnerability descriptions and solutions)
pub const MAX_LONG_TEXT_LEN: usize = 65_535;
/// Maximum length of a hostname or domain
pub const MAX_HOSTNAME_LEN: usize = 260;

/// Maximum number of hostnames on an asset
pub const MAX_HOSTNAMES: usize = 100;
/// Maximum number of tags on an asset or import task
pub const MAX_TAGS: usize = 100;
/// Maximum number of network interfaces on an asset
pub const MAX_NETWORK_INTERFACES: usize = 256;
/// Maximum number of IPv4 addresses on a network interface
pub const MAX_IPV4_ADDRESSES: usize = 256;
/// Maximum number of IPv6 addresses on a network interface
pub const MAX_IPV6_ADDRESSES: usize = 100;
/// Maximum number of software entries on an asset
pub const MAX_SOFTWARE: usize = 1000;
/// Maximum number of vulnerabilities on an asset
pub const MAX_VULNERABILITIES: usize = 1000;
/// Maximum number of services on an asset
pub const MAX_SERVICES: usize = 1000;

/// A record that can be checked against the import schema
pub trait Validate {
    /// Fold case-insensitive fields into their canonical form
    fn normalize(&mut self) {}

    /// Check every constraint on the record
    ///
    /// # Errors
    /// Returns the first violation found.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Normalize, then validate, handing the record back on success
    ///
    /// # Errors
    /// Returns the first violation found.
    fn validated(mut self) -> Result<Self, ValidationError>
    where
        Self: Sized,
    {
        self.normalize();
        self.validate()?;
        Ok(self)
    }
}

pub(crate) fn check_len(field: &str, value: &str, limit: usize) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual > limit {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            limit,
            actual,
        });
    }
    Ok(())
}

pub(crate) fn check_opt_len(
    field: &str,
    value: Option<&String>,
    limit: usize,
) -> Result<(), ValidationError> {
    match value {
        Some(value) => check_len(field, value, limit),
        None => Ok(()),
    }
}

pub(crate) fn check_count(field: &str, actual: usize, limit: usize) -> Result<(), ValidationError> {
    if actual > limit {
        return Err(ValidationError::TooManyEntries {
            field: field.to_string(),
            limit,
            actual,
        });
    }
    Ok(())
}

/// Check a list of strings: entry count first, then each entry's length
pub(crate) fn check_strings(
    field: &str,
    values: &[String],
    max_entries: usize,
    max_len: usize,
) -> Result<(), ValidationError> {
    check_count(field, values.len(), max_entries)?;
    for (i, value) in values.iter().enumerate() {
        check_len(&format!("{field}[{i}]"), value, max_len)?;
    }
    Ok(())
}

/// Check nested records, prefixing any error with the entry's position
pub(crate) fn check_records<T: Validate>(
    field: &str,
    records: &[T],
    max_entries: usize,
) -> Result<(), ValidationError> {
    check_count(field, records.len(), max_entries)?;
    for (i, record) in records.iter().enumerate() {
        record
            .validate()
            .map_err(|err| err.within(format!("{field}[{i}]")))?;
    }
    Ok(())
}

pub(crate) fn check_range(
    field: &str,
    value: Option<f64>,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    match value {
        Some(value) if !(min..=max).contains(&value) => Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        }),
        _ => Ok(()),
    }
}

/// Enforce the 1024 / 256 / 1024 limits on a custom attribute map
///
/// # Errors
/// Returns a [`ValidationError`] naming the first key that breaks a limit.
pub fn check_custom_attributes(
    attributes: &BTreeMap<String, String>,
) -> Result<(), ValidationError> {
    check_count("customAttributes", attributes.len(), MAX_CUSTOM_ATTRIBUTES)?;

    for (key, value) in attributes {
        let key_len = key.chars().count();
        if key_len > MAX_ATTRIBUTE_KEY_LEN {
            return Err(ValidationError::TooLong {
                field: format!("customAttributes key \"{}\"", preview(key)),
                limit: MAX_ATTRIBUTE_KEY_LEN,
                actual: key_len,
            });
        }
        check_len(
            &format!("customAttributes[\"{}\"]", preview(key)),
            value,
            MAX_ATTRIBUTE_VALUE_LEN,
        )?;
    }
    Ok(())
}

/// Lower-case an optional string in place
pub(crate) fn lowercase(value: &mut Option<String>) {
    if let Some(v) = value {
        *v = v.to_lowercase();
    }
}

/// Upper-case an optional string in place
pub(crate) fn uppercase(value: &mut Option<String>) {
    if let Some(v) = value {
        *v = v.to_uppercase();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(n: usize) -> BTreeMap<String, String> {
        (0..n).map(|i| (format!("foo-{i}"), i.to_string())).collect()
    }

    #[test]
    fn test_custom_attribute_count_boundary() {
        assert!(check_custom_attributes(&attrs(1024)).is_ok());

        let err = check_custom_attributes(&attrs(1025)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooManyEntries {
                field: "customAttributes".into(),
                limit: 1024,
                actual: 1025,
            }
        );
    }

    #[test]
    fn test_custom_attribute_key_boundary() {
        let ok = BTreeMap::from([("f".repeat(256), "v".to_string())]);
        assert!(check_custom_attributes(&ok).is_ok());

        let bad = BTreeMap::from([("f".repeat(257), "v".to_string())]);
        let err = check_custom_attributes(&bad).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("maximum length of 256 with length of 257"));
        assert!(message.contains(&format!("{}...", "f".repeat(25))));
    }

    #[test]
    fn test_custom_attribute_value_boundary() {
        let ok = BTreeMap::from([("key".to_string(), "f".repeat(1024))]);
        assert!(check_custom_attributes(&ok).is_ok());

        let bad = BTreeMap::from([("key".to_string(), "f".repeat(1025))]);
        let err = check_custom_attributes(&bad).unwrap_err();
        assert_eq!(err.field(), Some("customAttributes[\"key\"]"));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 256 two-byte characters
        let key = "é".repeat(256);
        let ok = BTreeMap::from([(key, "v".to_string())]);
        assert!(check_custom_attributes(&ok).is_ok());
    }

    #[test]
    fn test_check_strings_reports_index() {
        let values = vec!["ok".to_string(), "x".repeat(300)];
        let err = check_strings("hostnames", &values, 100, 260).unwrap_err();
        assert_eq!(err.field(), Some("hostnames[1]"));
    }

    #[test]
    fn test_check_range() {
        assert!(check_range("cvss3BaseScore", Some(10.0), 0.0, 10.0).is_ok());
        assert!(check_range("cvss3BaseScore", None, 0.0, 10.0).is_ok());
        assert!(check_range("cvss3BaseScore", Some(10.5), 0.0, 10.0).is_err());
    }
}
