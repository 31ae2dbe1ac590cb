use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

use crate::runtime::Runtime;

/// File name of a package descriptor
pub const DESCRIPTOR_FILE: &str = "package.json";

/// The fields of a `package.json` this crate understands.
///
/// Fields are kept as raw JSON values so that a malformed field (a number
/// where a string is expected, say) degrades to "missing" instead of
/// rejecting the whole document.
#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct PackageJson {
    pub name: Option<Value>,
    pub version: Option<Value>,
    pub main: Option<Value>,
    pub exports: Option<Value>,
}

impl PackageJson {
    #[tracing::instrument(skip(runtime, path))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let content = runtime.read_to_string(path)?;
        Self::parse(&content).with_context(|| format!("Unable to parse {}", path.display()))
    }

    /// Parse descriptor text. The document must be a JSON object.
    pub fn parse(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)?;
        if !value.is_object() {
            bail!("expected a JSON object at the top level");
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Declared package name, if it is a non-empty string.
    pub fn name(&self) -> Option<&str> {
        non_empty_str(self.name.as_ref())
    }

    /// Declared version, if it is a non-empty string.
    pub fn version(&self) -> Option<&str> {
        non_empty_str(self.version.as_ref())
    }

    /// Declared main specifier, if it is a non-empty string.
    pub fn main(&self) -> Option<&str> {
        non_empty_str(self.main.as_ref())
    }

    /// Declared exports, unless absent or falsy (`null`, `false`, `0`, `""`).
    pub fn exports(&self) -> Option<&Value> {
        self.exports.as_ref().filter(|v| is_truthy(v))
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
