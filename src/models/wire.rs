//! Lenient decoders for fields the record service does not type consistently.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Integer(i64),
    Float(f64),
}

/// Accepts a JSON string or number as an opaque record id.
pub fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Integer(value) => value.to_string(),
        RawId::Float(value) => value.to_string(),
    })
}

/// Accepts any non-negative JSON number (`2`, `2.0`) as a whole count.
pub fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?.unwrap_or_default();
    Ok(to_whole(value) as u32)
}

/// Accepts any non-negative JSON number as a whole currency amount.
pub fn whole_amount<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?.unwrap_or_default();
    Ok(to_whole(value) as u64)
}

/// Accepts a JSON number or `null` (treated as zero).
pub fn amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?.unwrap_or_default();
    Ok(if value.is_finite() { value } else { 0.0 })
}

fn to_whole(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value.round()
    } else {
        0.0
    }
}
