//! Command payload formatting.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Supported output formats for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON (default)
    #[default]
    Json,

    /// YAML in the same schema as the input document
    Yaml,

    /// One-line summary for quick status checks
    Summary,

    /// Minimal output (exit code only)
    Exitcode,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
            OutputFormat::Summary => write!(f, "summary"),
            OutputFormat::Exitcode => write!(f, "exitcode"),
        }
    }
}

/// Render a command payload.
///
/// `summary` is used for [`OutputFormat::Summary`]; [`OutputFormat::Exitcode`]
/// renders nothing.
pub fn render<T: Serialize + ?Sized>(
    format: OutputFormat,
    payload: &T,
    summary: &str,
) -> Option<String> {
    match format {
        OutputFormat::Json => Some(
            serde_json::to_string_pretty(payload)
                .unwrap_or_else(|e| format!("{{\"error\": \"unrenderable: {}\"}}", e)),
        ),
        OutputFormat::Yaml => Some(
            serde_yaml::to_string(payload).unwrap_or_else(|e| format!("# unrenderable: {}\n", e)),
        ),
        OutputFormat::Summary => Some(summary.to_string()),
        OutputFormat::Exitcode => None,
    }
}

/// Convert a configuration document to JSON.
///
/// JSON has no infinities or NaN, so non-finite floats become the strings
/// `.inf`, `-.inf` and `.nan`, which the resolver reads back as numbers.
pub fn document_to_json(document: &serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;

    match document {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::Number(n) => {
            if let Some(u) = n.as_u64() {
                Value::from(u)
            } else if let Some(i) = n.as_i64() {
                Value::from(i)
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .unwrap_or_else(|| Value::String(non_finite_spelling(f).to_string()))
            }
        }
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Sequence(seq) => Value::Array(seq.iter().map(document_to_json).collect()),
        Yaml::Mapping(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let key = match k {
                        Yaml::String(s) => s.clone(),
                        other => serde_yaml::to_string(other)
                            .map(|s| s.trim_end().to_string())
                            .unwrap_or_default(),
                    };
                    (key, document_to_json(v))
                })
                .collect(),
        ),
        Yaml::Tagged(tagged) => document_to_json(&tagged.value),
    }
}

fn non_finite_spelling(f: f64) -> &'static str {
    if f.is_nan() {
        ".nan"
    } else if f > 0.0 {
        ".inf"
    } else {
        "-.inf"
    }
}
