//! Document loading: raw scenario text to a `ScenarioDocument`.
//!
//! Two backends sit behind [`LoaderKind::load`]:
//! - `yaml`: general-purpose YAML via `serde-saphyr` (cargo feature `yaml`, on by default)
//! - `subset`: hand-written parser for the flat subset scenario files use
//!
//! Both produce a `serde_json::Value` tree, so the rule engine never sees which
//! one ran. A document that is blank, comments-only, or not a mapping loads as
//! `Ok(None)`, which is distinct from a parse failure.

mod subset;
#[cfg(feature = "yaml")]
mod yaml;

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::LoadError;

/// Which parser backend turns scenario text into a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum LoaderKind {
    /// Full YAML parser.
    #[cfg(feature = "yaml")]
    Yaml,
    /// Flat-subset parser: scalar fields, block scalars, inline lists, and a list of steps.
    Subset,
}

impl Default for LoaderKind {
    fn default() -> Self {
        #[cfg(feature = "yaml")]
        {
            Self::Yaml
        }
        #[cfg(not(feature = "yaml"))]
        {
            Self::Subset
        }
    }
}

impl LoaderKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            #[cfg(feature = "yaml")]
            Self::Yaml => "yaml",
            Self::Subset => "subset",
        }
    }

    /// Parse scenario text into a document.
    ///
    /// Returns `Ok(None)` when the text is well-formed but holds no mapping.
    /// A leading byte-order mark is ignored.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Parse` when the text is not well-formed for this backend.
    pub fn load(self, content: &str) -> Result<Option<ScenarioDocument>, LoadError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        if is_blank_document(content) {
            return Ok(None);
        }
        let value = match self {
            #[cfg(feature = "yaml")]
            Self::Yaml => yaml::parse(content)?,
            Self::Subset => subset::parse(content)?,
        };
        Ok(ScenarioDocument::from_value(value))
    }
}

impl fmt::Display for LoaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LoaderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            #[cfg(feature = "yaml")]
            "yaml" => Ok(Self::Yaml),
            #[cfg(not(feature = "yaml"))]
            "yaml" => Err("the yaml loader is not compiled in (enable the `yaml` feature)".to_owned()),
            "subset" => Ok(Self::Subset),
            other => Err(format!("unknown loader '{other}' (expected 'yaml' or 'subset')")),
        }
    }
}

/// Only comments, blank lines, and document markers.
fn is_blank_document(content: &str) -> bool {
    content.lines().map(str::trim).all(|line| {
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

/// The parsed form of one scenario file: its top-level fields.
///
/// Field values keep their parsed type so the rules can tell a list from a
/// scalar and a string from a number.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioDocument {
    fields: Map<String, Value>,
}

/// The `steps` field as the rule engine sees it.
#[derive(Debug, Clone, Copy)]
pub enum StepsField<'a> {
    Absent,
    List(&'a [Value]),
    NotList(&'a Value),
}

/// One entry of the `steps` list.
#[derive(Debug, Clone, Copy)]
pub enum StepEntry<'a> {
    /// A mapping from step type to argument. Scenario files use one key per entry.
    Action(&'a Map<String, Value>),
    /// Anything that is not a mapping.
    Other(&'a Value),
}

impl<'a> StepEntry<'a> {
    #[must_use]
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => Self::Action(map),
            other => Self::Other(other),
        }
    }
}

impl ScenarioDocument {
    /// Wrap a parsed value. Anything other than a mapping is not a document.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// A field's value; `None` when absent or null.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    /// A field's value rendered as text, the way the format rules compare it.
    #[must_use]
    pub fn text(&self, field: &str) -> Option<String> {
        self.get(field).map(scalar_text)
    }

    #[must_use]
    pub fn steps(&self) -> StepsField<'_> {
        match self.get("steps") {
            None => StepsField::Absent,
            Some(Value::Array(items)) => StepsField::List(items),
            Some(other) => StepsField::NotList(other),
        }
    }
}

/// String form of a scalar: strings verbatim, everything else as written.
#[must_use]
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
