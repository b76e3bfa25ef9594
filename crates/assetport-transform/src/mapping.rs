//! Field mapping from arbitrary input records onto [`ImportAsset`]

use std::collections::{BTreeMap, HashSet};

use assetport_api::error::preview;
use assetport_api::{AssetField, ImportAsset, NetworkInterfaceField, Validate, ValidationError};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::casing::to_camel_case;
use crate::error::{Result, TransformError};

/// Caller-supplied renames, as `(target field, source field)` pairs
///
/// Targets are asset field names in either snake_case or camelCase; sources
/// are keys as they appear in the input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    entries: Vec<(String, String)>,
}

impl FieldMapping {
    /// Create an empty (identity) mapping
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map input key `source` onto asset field `target`
    #[must_use]
    pub fn map(mut self, target: impl Into<String>, source: impl Into<String>) -> Self {
        self.entries.push((target.into(), source.into()));
        self
    }

    /// Build from `(target, source)` pairs
    pub fn from_pairs<I, T, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (T, S)>,
        T: Into<String>,
        S: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(t, s)| (t.into(), s.into()))
                .collect(),
        }
    }

    /// Build from a JSON object of `{"target": "source"}`
    ///
    /// Anything other than an object yields the identity mapping, and entries
    /// whose source is not a string are skipped.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            warn!(kind = json_kind(value), "field mapping is not an object, ignoring it");
            return Self::new();
        };

        let mut mapping = Self::new();
        for (target, source) in object {
            match source.as_str() {
                Some(source) => mapping.entries.push((target.clone(), source.to_string())),
                None => warn!(target = %target, "field mapping source is not a string, skipping"),
            }
        }
        mapping
    }

    /// Build from `target=source` arguments
    ///
    /// # Errors
    /// Returns [`TransformError::InvalidMapping`] for an argument without `=`
    /// or with an empty side.
    pub fn parse_args<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut mapping = Self::new();
        for arg in args {
            let arg = arg.as_ref();
            match arg.split_once('=') {
                Some((target, source)) if !target.is_empty() && !source.is_empty() => {
                    mapping.entries.push((target.to_string(), source.to_string()));
                }
                _ => return Err(TransformError::InvalidMapping(arg.to_string())),
            }
        }
        Ok(mapping)
    }

    /// Whether the mapping renames nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(target, source)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(t, s)| (t.as_str(), s.as_str()))
    }
}

/// Rename and classify the keys of a raw record
///
/// Keys named as a source in `mapping` are renamed to their (recased)
/// target. Every other key is recased; keys matching an asset field are
/// kept, the rest are folded into `customAttributes`, replacing any
/// `customAttributes` present in the input. Keys of network interface
/// objects are recased as well; interface keys that are not interface
/// fields are dropped. A source named by several entries goes to the
/// first of them only.
///
/// # Errors
/// Returns an error if a value destined for `customAttributes` is an array
/// or an object.
pub fn remap_record(
    record: &Map<String, Value>,
    mapping: &FieldMapping,
) -> std::result::Result<Map<String, Value>, ValidationError> {
    let mut consumed = HashSet::new();
    let mut renamed = Vec::new();
    for (target, source) in mapping.iter() {
        if consumed.contains(source) {
            continue;
        }
        if let Some(value) = record.get(source).filter(|v| !v.is_null()) {
            consumed.insert(source);
            renamed.push((to_camel_case(target), value));
        }
    }

    let remaining = record
        .iter()
        .filter(|(key, _)| !consumed.contains(key.as_str()))
        .map(|(key, value)| (to_camel_case(key), value));

    let mut fields = Map::new();
    let mut attributes = BTreeMap::new();
    // renamed entries come last so they win over an input key of the same name
    for (key, value) in remaining.chain(renamed) {
        match AssetField::from_wire(&key) {
            Some(AssetField::NetworkInterfaces) => {
                fields.insert(key, recase_interfaces(value));
            }
            Some(_) if is_blank(value) => {
                fields.remove(&key);
            }
            Some(_) => {
                fields.insert(key, value.clone());
            }
            None => match attribute_text(&key, value)? {
                Some(text) => {
                    attributes.insert(key, Value::String(text));
                }
                None => {
                    attributes.remove(&key);
                }
            },
        }
    }

    fields.insert(
        AssetField::CustomAttributes.as_str().to_string(),
        Value::Object(attributes.into_iter().collect()),
    );
    Ok(fields)
}

/// Run a raw record through mapping, decoding and validation
///
/// # Errors
/// Returns the first violation found, or [`ValidationError::Malformed`] if
/// the mapped record does not decode into an [`ImportAsset`].
pub fn map_asset(
    record: &Map<String, Value>,
    mapping: &FieldMapping,
) -> std::result::Result<ImportAsset, ValidationError> {
    let fields = remap_record(record, mapping)?;
    let asset: ImportAsset = serde_json::from_value(Value::Object(fields))?;
    let asset = asset.validated()?;
    debug!(id = %asset.id, custom_attributes = asset.custom_attributes.len(), "mapped asset");
    Ok(asset)
}

fn recase_interfaces(value: &Value) -> Value {
    match value {
        Value::Array(interfaces) => Value::Array(
            interfaces
                .iter()
                .map(|interface| match interface {
                    Value::Object(fields) => Value::Object(recase_interface(fields)),
                    other => other.clone(),
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

fn recase_interface(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .filter_map(|(key, value)| {
            let key = to_camel_case(key);
            if NetworkInterfaceField::from_wire(&key).is_some() {
                Some((key, value.clone()))
            } else {
                warn!(field = %key, "dropping unknown network interface field");
                None
            }
        })
        .collect()
}

/// Empty cells (typical of CSV) leave a known field unset
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Render a scalar as attribute text; `None` for null
fn attribute_text(
    key: &str,
    value: &Value,
) -> std::result::Result<Option<String>, ValidationError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Array(_) | Value::Object(_) => Err(ValidationError::invalid_format(
            format!("customAttributes[\"{}\"]", preview(key)),
            &value.to_string(),
            "expected a string, number or boolean",
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_unknown_keys_become_custom_attributes() {
        let record = object(json!({"id": "x", "foo": "bar"}));
        let fields = remap_record(&record, &FieldMapping::new()).unwrap();

        assert_eq!(fields["id"], "x");
        assert_eq!(fields["customAttributes"], json!({"foo": "bar"}));
        assert!(fields.get("foo").is_none());
    }

    #[test]
    fn test_custom_attributes_always_present() {
        let record = object(json!({"id": "x"}));
        let fields = remap_record(&record, &FieldMapping::new()).unwrap();
        assert_eq!(fields["customAttributes"], json!({}));
    }

    #[test]
    fn test_snake_case_keys_match_schema() {
        let record = object(json!({
            "id": "x",
            "os_version": "12",
            "first_seen_ts": "2023-03-06T18:14:50Z",
            "serial_number": "abc"
        }));
        let fields = remap_record(&record, &FieldMapping::new()).unwrap();

        assert_eq!(fields["osVersion"], "12");
        assert_eq!(fields["firstSeenTS"], "2023-03-06T18:14:50Z");
        assert_eq!(fields["customAttributes"], json!({"serialNumber": "abc"}));
    }

    #[test]
    fn test_mapping_renames_source_keys() {
        let record = object(json!({"asset_id": "x", "fqdn": "host.example.com", "extra": 1}));
        let mapping = FieldMapping::new().map("id", "asset_id").map("domain", "fqdn");
        let fields = remap_record(&record, &mapping).unwrap();

        assert_eq!(fields["id"], "x");
        assert_eq!(fields["domain"], "host.example.com");
        assert_eq!(fields["customAttributes"], json!({"extra": "1"}));
    }

    #[test]
    fn test_mapped_value_wins_over_existing_key() {
        let record = object(json!({"id": "original", "other_id": "mapped"}));
        let mapping = FieldMapping::new().map("id", "other_id");
        let fields = remap_record(&record, &mapping).unwrap();
        assert_eq!(fields["id"], "mapped");
    }

    #[test]
    fn test_mapping_with_missing_or_null_source_is_skipped() {
        let record = object(json!({"id": "x", "nothing": null}));
        let mapping = FieldMapping::new().map("domain", "absent").map("os", "nothing");
        let fields = remap_record(&record, &mapping).unwrap();

        assert!(fields.get("domain").is_none());
        assert!(fields.get("os").is_none());
        assert_eq!(fields["customAttributes"], json!({}));
    }

    #[test]
    fn test_input_custom_attributes_are_replaced() {
        let record = object(json!({"id": "x", "customAttributes": {"a": "b"}, "c": "d"}));
        let fields = remap_record(&record, &FieldMapping::new()).unwrap();
        assert_eq!(fields["customAttributes"], json!({"c": "d"}));
    }

    #[test]
    fn test_network_interface_keys_recased() {
        let record = object(json!({
            "id": "x",
            "network_interfaces": [{
                "mac_address": "01:23:45:67:89:AB",
                "ipv4_addresses": ["10.0.0.1"]
            }]
        }));
        let asset = map_asset(&record, &FieldMapping::new()).unwrap();

        let nic = &asset.network_interfaces[0];
        assert_eq!(nic.mac_address.as_deref(), Some("01:23:45:67:89:AB"));
        assert_eq!(nic.ipv4_addresses[0].to_string(), "10.0.0.1");
    }

    #[test]
    fn test_unknown_network_interface_keys_dropped() {
        let record = object(json!({
            "id": "x",
            "network_interfaces": [{"mac_address": "01:23:45:67:89:AB", "vlan": 12}]
        }));
        let fields = remap_record(&record, &FieldMapping::new()).unwrap();

        assert_eq!(
            fields["networkInterfaces"],
            json!([{"macAddress": "01:23:45:67:89:AB"}])
        );
        assert_eq!(fields["customAttributes"], json!({}));
    }

    #[test]
    fn test_source_named_twice_goes_to_first_target() {
        let record = object(json!({"name": "db-01"}));
        let mapping = FieldMapping::new().map("id", "name").map("hostnames", "name");
        let fields = remap_record(&record, &mapping).unwrap();

        assert_eq!(fields["id"], "db-01");
        assert!(fields.get("hostnames").is_none());
        assert_eq!(fields["customAttributes"], json!({}));
    }

    #[test]
    fn test_blank_known_fields_are_unset() {
        let record = object(json!({"id": "x", "domain": "", "firstSeenTS": ""}));
        let asset = map_asset(&record, &FieldMapping::new()).unwrap();
        assert!(asset.domain.is_none());
        assert!(asset.first_seen_ts.is_none());
    }

    #[test]
    fn test_scalar_attributes_rendered_as_text() {
        let record = object(json!({"id": "x", "count": 3, "enabled": true, "gone": null}));
        let asset = map_asset(&record, &FieldMapping::new()).unwrap();

        assert_eq!(asset.custom_attributes["count"], "3");
        assert_eq!(asset.custom_attributes["enabled"], "true");
        assert!(!asset.custom_attributes.contains_key("gone"));
    }

    #[test]
    fn test_nested_attribute_value_rejected() {
        let record = object(json!({"id": "x", "nested": {"a": 1}}));
        let err = remap_record(&record, &FieldMapping::new()).unwrap_err();
        assert_eq!(err.field(), Some("customAttributes[\"nested\"]"));
    }

    #[test]
    fn test_run_zero_id_snake_case_is_not_the_wire_name() {
        let record = object(json!({"id": "x", "run_zero_id": "abc"}));
        let fields = remap_record(&record, &FieldMapping::new()).unwrap();
        assert_eq!(fields["customAttributes"], json!({"runZeroId": "abc"}));
    }

    #[test]
    fn test_map_asset_validates() {
        let record = object(json!({"id": "x", "hostnames": ["h".repeat(261)]}));
        let err = map_asset(&record, &FieldMapping::new()).unwrap_err();
        assert_eq!(err.field(), Some("hostnames[0]"));
    }

    #[test]
    fn test_map_asset_reports_bad_types() {
        let record = object(json!({"id": "x", "hostnames": "not-a-list"}));
        let err = map_asset(&record, &FieldMapping::new()).unwrap_err();
        assert!(matches!(err, ValidationError::Malformed(_)));
    }

    #[test]
    fn test_mapping_from_non_object_json_is_identity() {
        assert!(FieldMapping::from_json(&json!(["id", "name"])).is_empty());
        assert!(FieldMapping::from_json(&json!("id")).is_empty());
        assert!(FieldMapping::from_json(&Value::Null).is_empty());
    }

    #[test]
    fn test_mapping_from_json_skips_non_string_sources() {
        let mapping = FieldMapping::from_json(&json!({"id": "asset_id", "domain": 5}));
        assert_eq!(mapping.iter().collect::<Vec<_>>(), vec![("id", "asset_id")]);
    }

    #[test]
    fn test_parse_args() {
        let mapping = FieldMapping::parse_args(["id=asset_id", "os=platform"]).unwrap();
        assert_eq!(
            mapping.iter().collect::<Vec<_>>(),
            vec![("id", "asset_id"), ("os", "platform")]
        );

        assert!(FieldMapping::parse_args(["id"]).is_err());
        assert!(FieldMapping::parse_args(["=asset_id"]).is_err());
    }
}
