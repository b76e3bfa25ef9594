//! Syntax checks for identifiers with a fixed textual format

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;

static MAC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:[0-9A-Fa-f]{2}:){5}[0-9A-Fa-f]{2}$",
        r"|^(?:[0-9A-Fa-f]{2}:){7}[0-9A-Fa-f]{2}$",
        r"|^(?:[0-9A-Fa-f]{2}-){5}[0-9A-Fa-f]{2}$",
        r"|^(?:[0-9A-Fa-f]{2}-){7}[0-9A-Fa-f]{2}$",
        r"|^(?:[0-9A-Fa-f]{4}\.){2}[0-9A-Fa-f]{4}$",
        r"|^(?:[0-9A-Fa-f]{4}\.){3}[0-9A-Fa-f]{4}$",
        r"|^(?:[0-9A-Fa-f]{4} ){3}[0-9A-Fa-f]{4}$",
    ))
    .expect("MAC address pattern is valid")
});

static CVE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^CVE-[0-9]{4}-[0-9]{4,}$").expect("CVE pattern is valid"));

static CPE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^cpe:(?:2\.3:|/).*$").expect("CPE pattern is valid"));

/// Longest accepted MAC address (EUI-64 with separators)
pub const MAX_MAC_LEN: usize = 23;

/// Check a MAC/EUI-48 or EUI-64 address in colon, dash, dot or space notation
///
/// # Errors
/// Returns [`ValidationError::InvalidFormat`] if no accepted notation matches.
pub fn check_mac_address(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.len() > MAX_MAC_LEN || !MAC_PATTERN.is_match(value) {
        return Err(ValidationError::invalid_format(
            field,
            value,
            "expected a MAC/EUI-48 or EUI-64 address such as 01:23:45:67:89:AB",
        ));
    }
    Ok(())
}

/// Check an upper-cased CVE identifier
///
/// # Errors
/// Returns [`ValidationError::InvalidFormat`] if the identifier is not `CVE-YYYY-NNNN`.
pub fn check_cve(field: &str, value: &str) -> Result<(), ValidationError> {
    if !CVE_PATTERN.is_match(value) {
        return Err(ValidationError::invalid_format(
            field,
            value,
            "expected a CVE identifier such as CVE-2021-44228",
        ));
    }
    Ok(())
}

/// Check a lower-cased CPE name (2.3 formatted string or URI binding)
///
/// # Errors
/// Returns [`ValidationError::InvalidFormat`] if the name does not start
/// with `cpe:2.3:` or `cpe:/`.
pub fn check_cpe(field: &str, value: &str) -> Result<(), ValidationError> {
    if !CPE_PATTERN.is_match(value) {
        return Err(ValidationError::invalid_format(
            field,
            value,
            "expected a CPE name starting with cpe:2.3: or cpe:/",
        ));
    }
    Ok(())
}
