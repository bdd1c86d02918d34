//! Carbon API payload extraction.
//!
//! Provider versions disagree on key names and nesting, so every field is looked
//! up under several aliases, first at the top level and then under `statistics`.

use serde_json::Value;

use crate::error_handling::UpstreamError;
use crate::estimate::emissions::co2_per_byte;
use crate::estimate::{cleaner_than_percent, compute, round3, CarbonMetrics};

pub(crate) const SERVICE: &str = "carbon api";

const BYTES_KEYS: &[&str] = &["bytes", "transferSize", "adjustedBytes"];
const CO2_KEYS: &[&str] = &["co2", "carbon"];
const ENERGY_KEYS: &[&str] = &["energy", "energyConsumption"];
const CLEANER_KEYS: &[&str] = &["cleanerThan", "percentage"];
const GREEN_KEYS: &[&str] = &["green", "greenHosting"];

fn malformed(reason: impl Into<String>) -> UpstreamError {
    UpstreamError::Malformed {
        service: SERVICE,
        reason: reason.into(),
    }
}

fn field<'a>(root: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    let nested = root.get("statistics");
    aliases
        .iter()
        .find_map(|key| root.get(*key).filter(|v| !v.is_null()))
        .or_else(|| {
            nested.and_then(|stats| {
                aliases
                    .iter()
                    .find_map(|key| stats.get(*key).filter(|v| !v.is_null()))
            })
        })
}

fn non_negative(value: &Value, name: &str) -> Result<Option<f64>, UpstreamError> {
    match value.as_f64() {
        Some(v) if v.is_finite() && v >= 0.0 => Ok(Some(v)),
        Some(v) => Err(malformed(format!("{name} is out of range: {v}"))),
        None => Ok(None),
    }
}

/// Green flag; anything but a boolean `true` (or the string "true") is false.
fn parse_green(root: &Value) -> bool {
    match field(root, GREEN_KEYS) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// CO2 grams, either a plain number or `{grid: {grams}, renewable: {grams}}`.
fn parse_co2(root: &Value, green: bool) -> Result<Option<f64>, UpstreamError> {
    let Some(value) = field(root, CO2_KEYS) else {
        return Ok(None);
    };
    if value.is_number() {
        return non_negative(value, "co2");
    }
    let variant = if green { "renewable" } else { "grid" };
    let grams = value
        .get("grams")
        .or_else(|| value.get(variant).and_then(|v| v.get("grams")));
    match grams {
        Some(g) => non_negative(g, "co2"),
        None => Err(malformed("co2 object has no grams")),
    }
}

/// Percentile, accepting either a fraction in [0, 1] or a percentage.
fn parse_cleaner_than(root: &Value) -> Result<Option<u8>, UpstreamError> {
    let Some(value) = field(root, CLEANER_KEYS) else {
        return Ok(None);
    };
    let Some(raw) = non_negative(value, "cleanerThan")? else {
        return Ok(None);
    };
    let percent = if raw <= 1.0 { raw * 100.0 } else { raw };
    Ok(Some(percent.round().min(100.0) as u8))
}

/// Builds metrics from a carbon API response body.
///
/// Missing optional fields take engine defaults: not green, calculator output
/// for CO2/energy, table percentile. A body with neither a byte count nor a CO2
/// figure is rejected as malformed.
pub(crate) fn parse_carbon_payload(body: &Value) -> Result<CarbonMetrics, UpstreamError> {
    if !body.is_object() {
        return Err(malformed("expected a JSON object"));
    }

    let green = parse_green(body);
    let co2 = parse_co2(body, green)?;
    let bytes = match field(body, BYTES_KEYS) {
        Some(v) => non_negative(v, "bytes")?.map(|b| b.round() as u64),
        None => None,
    };

    let bytes = match (bytes, co2) {
        (Some(bytes), _) => bytes,
        (None, Some(co2)) => (co2 / co2_per_byte(green)).round() as u64,
        (None, None) => return Err(malformed("neither bytes nor co2 present")),
    };

    let computed = compute(bytes, green);
    let energy = match field(body, ENERGY_KEYS) {
        Some(v) => non_negative(v, "energy")?,
        None => None,
    };

    Ok(CarbonMetrics {
        bytes,
        green,
        co2_grams: co2.map(round3).unwrap_or(computed.co2_grams),
        energy_wh: energy.map(round3).unwrap_or(computed.energy_wh),
        cleaner_than_percent: parse_cleaner_than(body)?
            .unwrap_or_else(|| cleaner_than_percent(bytes, green)),
    })
}
