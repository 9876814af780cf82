//! Validation and normalization utilities

use crate::traits::*;
use crate::types::*;

/// Normalize a MAC address to lowercase, colon-delimited form
///
/// Accepts `aa:bb:cc:dd:ee:ff`, `aa-bb-cc-dd-ee-ff`, Cisco dotted
/// `aabb.ccdd.eeff` and bare `aabbccddeeff`, in any case. Colon or hyphen
/// groups may drop a leading zero (`0:1b:...`).
pub fn normalize_mac(raw: &str) -> ReconcileResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ReconcileError::MalformedEntry(
            "MAC address cannot be empty".to_string(),
        ));
    }

    let malformed = || ReconcileError::MalformedEntry(format!("Invalid MAC address: '{}'", raw));

    let separators: Vec<char> = trimmed
        .chars()
        .filter(|c| matches!(*c, ':' | '-' | '.'))
        .collect();
    if separators.windows(2).any(|pair| pair[0] != pair[1]) {
        return Err(malformed());
    }

    let separator = separators.first().copied();
    let groups: Vec<&str> = match separator {
        Some(separator) => trimmed.split(separator).collect(),
        None => vec![trimmed],
    };

    let hex = match (separator, groups.len()) {
        (None, 1) if trimmed.len() == 12 => trimmed.to_string(),
        (Some('.'), 3) if groups.iter().all(|g| g.len() == 4) => groups.concat(),
        (Some(':' | '-'), 6) if groups.iter().all(|g| (1..=2).contains(&g.len())) => groups
            .iter()
            .map(|g| format!("{:0>2}", g))
            .collect::<String>(),
        _ => return Err(malformed()),
    };

    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(malformed());
    }

    let hex = hex.to_ascii_lowercase();
    let octets: Vec<&str> = (0..6).map(|i| &hex[i * 2..i * 2 + 2]).collect();
    Ok(octets.join(":"))
}

/// Check that an address is already in normalized form
pub fn validate_normalized_mac(address: &str) -> ReconcileResult<()> {
    if normalize_mac(address)? == address {
        Ok(())
    } else {
        Err(ReconcileError::MalformedEntry(format!(
            "MAC address '{}' is not normalized",
            address
        )))
    }
}

/// Validate that a port identifier is usable
pub fn validate_port(port: &str) -> ReconcileResult<()> {
    if port.trim().is_empty() {
        return Err(ReconcileError::MalformedEntry(
            "Port cannot be empty".to_string(),
        ));
    }

    if port.chars().any(char::is_control) {
        return Err(ReconcileError::MalformedEntry(format!(
            "Port '{}' contains control characters",
            port.escape_debug()
        )));
    }

    Ok(())
}

/// Validator requiring normalized addresses and well-formed ports
pub struct NormalizedEntryValidator;

impl EntryValidator for NormalizedEntryValidator {
    fn validate_entry(&self, entry: &CamEntry) -> ReconcileResult<()> {
        validate_normalized_mac(&entry.address)?;
        validate_port(&entry.port)?;
        if entry.port.trim() != entry.port {
            return Err(ReconcileError::MalformedEntry(format!(
                "Port '{}' for {} has surrounding whitespace",
                entry.port, entry.address
            )));
        }
        Ok(())
    }
}
