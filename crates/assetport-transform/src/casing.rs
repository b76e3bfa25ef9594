//! Key casing normalization

/// Convert a snake_case key into the camelCase form used on the wire
///
/// The first `_`-separated segment is kept as given, so keys that are
/// already camelCase pass through unchanged. Each following segment is
/// title-cased. A result ending in `Ts` gets its final `s` upper-cased,
/// which turns `first_seen_ts` into `firstSeenTS`.
#[must_use]
pub fn to_camel_case(key: &str) -> String {
    let mut segments = key.split('_');
    let mut result = segments.next().unwrap_or_default().to_string();
    for segment in segments {
        title_case_into(segment, &mut result);
    }

    if result.ends_with("Ts") {
        result.pop();
        result.push('S');
    }
    result
}

/// Upper-case the first letter of every run of cased characters and
/// lower-case the rest of the run
fn title_case_into(segment: &str, out: &mut String) {
    let mut in_word = false;
    for ch in segment.chars() {
        let cased = ch.is_uppercase() || ch.is_lowercase();
        if !cased {
            in_word = false;
            out.push(ch);
        } else if in_word {
            out.extend(ch.to_lowercase());
        } else {
            in_word = true;
            out.extend(ch.to_uppercase());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case_to_camel_case() {
        assert_eq!(to_camel_case("os_version"), "osVersion");
        assert_eq!(to_camel_case("device_type"), "deviceType");
        assert_eq!(to_camel_case("network_interfaces"), "networkInterfaces");
        assert_eq!(to_camel_case("mac_address"), "macAddress");
        assert_eq!(to_camel_case("ipv4_addresses"), "ipv4Addresses");
    }

    #[test]
    fn test_timestamp_suffix() {
        assert_eq!(to_camel_case("first_seen_ts"), "firstSeenTS");
        assert_eq!(to_camel_case("last_seen_ts"), "lastSeenTS");
        assert_eq!(to_camel_case("published_ts"), "publishedTS");
        assert_eq!(to_camel_case("ts"), "ts");
        assert_eq!(to_camel_case("hosts"), "hosts");
    }

    #[test]
    fn test_camel_case_passes_through() {
        for key in ["id", "osVersion", "firstSeenTS", "customAttributes", "runZeroID"] {
            assert_eq!(to_camel_case(key), key);
            assert_eq!(to_camel_case(&to_camel_case(key)), key);
        }
    }

    #[test]
    fn test_first_segment_case_is_kept() {
        assert_eq!(to_camel_case("OS_version"), "OSVersion");
        assert_eq!(to_camel_case("Custom_field"), "CustomField");
    }

    #[test]
    fn test_later_segments_are_title_cased() {
        assert_eq!(to_camel_case("serial_NUMBER"), "serialNumber");
        assert_eq!(to_camel_case("run_zero_id"), "runZeroId");
        assert_eq!(to_camel_case("build_v2x"), "buildV2X");
    }

    #[test]
    fn test_degenerate_keys() {
        assert_eq!(to_camel_case(""), "");
        assert_eq!(to_camel_case("_"), "");
        assert_eq!(to_camel_case("a__b"), "aB");
        assert_eq!(to_camel_case("trailing_"), "trailing");
    }
}
