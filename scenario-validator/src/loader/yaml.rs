//! General-purpose YAML backend.
//!
//! YAML is deserialized to `serde_json::Value` so both backends hand the rule
//! engine the same tree shape.

use serde_json::Value;

use crate::error::LoadError;

pub(super) fn parse(content: &str) -> Result<Value, LoadError> {
    serde_saphyr::from_str::<Value>(content).map_err(|e| LoadError::Parse {
        line: None,
        message: format!("YAML parse error: {e}"),
    })
}
