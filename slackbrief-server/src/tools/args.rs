//! Argument extraction for tool calls.

use super::ToolOutcome;
use serde_json::{Map, Value};
use thiserror::Error;

pub const MAX_LIMIT: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ArgError(String);

impl From<ArgError> for ToolOutcome {
    fn from(err: ArgError) -> Self {
        ToolOutcome::Failure(format!("Invalid arguments: {err}"))
    }
}

impl ArgError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

pub struct Args<'a> {
    map: Option<&'a Map<String, Value>>,
}

impl<'a> Args<'a> {
    /// `null` is treated as an empty object; any other non-object is rejected.
    pub fn new(value: &'a Value) -> Result<Self, ArgError> {
        match value {
            Value::Object(map) => Ok(Self { map: Some(map) }),
            Value::Null => Ok(Self { map: None }),
            other => Err(ArgError::new(format!("expected an object, got {other}"))),
        }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map
            .and_then(|map| map.get(key))
            .filter(|value| !value.is_null())
    }

    pub fn string(&self, key: &str) -> Result<&'a str, ArgError> {
        match self.get(key) {
            Some(Value::String(text)) if !text.trim().is_empty() => Ok(text.as_str()),
            Some(Value::String(_)) => Err(ArgError::new(format!("'{key}' must not be empty"))),
            Some(_) => Err(ArgError::new(format!("'{key}' must be a string"))),
            None => Err(ArgError::new(format!("missing required argument '{key}'"))),
        }
    }

    pub fn number(&self, key: &str) -> Result<f64, ArgError> {
        let value = self
            .get(key)
            .ok_or_else(|| ArgError::new(format!("missing required argument '{key}'")))?;
        let number = match value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        };
        number
            .filter(|n| n.is_finite())
            .ok_or_else(|| ArgError::new(format!("'{key}' must be a number")))
    }

    /// An optional page size clamped to `1..=MAX_LIMIT`.
    pub fn limit(&self, key: &str, default: u64) -> Result<u64, ArgError> {
        let Some(value) = self.get(key) else {
            return Ok(default);
        };
        let requested = match value {
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().filter(|n| n.fract() == 0.0).map(|n| n as i64)),
            Value::String(text) => text.trim().parse::<i64>().ok(),
            _ => None,
        }
        .ok_or_else(|| ArgError::new(format!("'{key}' must be an integer")))?;
        Ok(requested.clamp(1, MAX_LIMIT as i64) as u64)
    }
}
