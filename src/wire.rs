//! Lenient field decoders for backend JSON.
//!
//! The backend serializes database rows straight to JSON, so decimal columns
//! may arrive as strings, `COALESCE`d columns may be `null`, and identifiers
//! can be either numbers or strings depending on the table.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Row identifier kept in the form the backend sent it, so a numeric id is
/// posted back as a number and a text id as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Num(u64),
    Text(String),
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireId::Num(n) => write!(f, "{n}"),
            WireId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for WireId {
    fn from(n: u64) -> Self {
        WireId::Num(n)
    }
}

impl From<&str> for WireId {
    fn from(s: &str) -> Self {
        WireId::Text(s.to_string())
    }
}

pub fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("expected id, got {other}"))),
    }
}

pub fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Some(raw) = number_from_value(&value).map_err(D::Error::custom)? else {
        return Ok(0);
    };
    if raw.fract() != 0.0 || raw < 0.0 || raw > u32::MAX as f64 {
        return Err(D::Error::custom(format!("expected a whole count, got {raw}")));
    }
    Ok(raw as u32)
}

pub fn rate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value)
        .map_err(D::Error::custom)?
        .unwrap_or(0.0))
}

pub fn opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match number_from_value(&value).map_err(D::Error::custom)? {
        Some(raw) if raw >= 0.0 && raw.fract() == 0.0 => Ok(Some(raw as u64)),
        Some(raw) => Err(D::Error::custom(format!("expected an id, got {raw}"))),
        None => Ok(None),
    }
}

pub fn u64_value<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    opt_u64(deserializer)?.ok_or_else(|| D::Error::custom("missing numeric id"))
}

pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!("expected text, got {other}"))),
    }
}

fn number_from_value(value: &Value) -> Result<Option<f64>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| format!("number out of range: {n}")),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Some)
                .ok_or_else(|| format!("not a number: {s}"))
        }
        other => Err(format!("expected a number, got {other}")),
    }
}
