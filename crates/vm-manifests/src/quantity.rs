//! Kubernetes resource quantity parsing
//!
//! The storage editor displays attached claims in GiB regardless of the
//! unit their requests were written in, so `"10Gi"`, `"10240Mi"` and
//! `"10737418240"` all render as 10.

use crate::error::ManifestError;

const KIB: f64 = 1024.0;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Parse a quantity string into bytes.
///
/// Supports binary (`Ki`..`Pi`) and decimal (`k`..`P`) suffixes as well as
/// bare numbers. Unknown suffixes are an error rather than a silent zero.
pub fn parse_quantity(quantity: &str) -> Result<f64, ManifestError> {
    let quantity = quantity.trim();
    let split = quantity
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(quantity.len());
    let (number, suffix) = quantity.split_at(split);

    let value: f64 = number
        .parse()
        .map_err(|_| ManifestError::Quantity(quantity.to_string()))?;

    let multiplier = match suffix {
        "" => 1.0,
        "Ki" => KIB,
        "Mi" => KIB * KIB,
        "Gi" => GIB,
        "Ti" => GIB * KIB,
        "Pi" => GIB * KIB * KIB,
        "k" => 1e3,
        "M" => 1e6,
        "G" => 1e9,
        "T" => 1e12,
        "P" => 1e15,
        _ => return Err(ManifestError::Quantity(quantity.to_string())),
    };

    Ok(value * multiplier)
}

/// Parse a quantity string and express it in GiB
pub fn quantity_to_gib(quantity: &str) -> Result<f64, ManifestError> {
    Ok(parse_quantity(quantity)? / GIB)
}
