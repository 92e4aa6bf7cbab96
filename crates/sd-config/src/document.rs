//! Document tree access.
//!
//! The resolver only needs a handful of capabilities from a parsed document,
//! captured by [`DocumentNode`]. The YAML implementation lives here together
//! with the load/parse entry points that separate I/O failures from syntax
//! failures.

use std::borrow::Cow;
use std::path::Path;

use serde_yaml::Value;

use crate::error::{ConfigError, ConfigResult};

/// Structural classification of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Explicit null (`~`, `null`, or an empty value).
    Null,
    /// A single value: boolean, number, or string.
    Scalar,
    /// Ordered list of nodes.
    Sequence,
    /// String-keyed map of nodes.
    Mapping,
}

/// Read-only view of a parsed document node.
pub trait DocumentNode {
    /// Structural kind of this node.
    fn kind(&self) -> NodeKind;

    /// Child of a mapping by key. `None` for absent keys and non-mappings.
    fn get(&self, key: &str) -> Option<&Self>;

    /// Element of a sequence by position. `None` when out of range or not a sequence.
    fn at(&self, index: usize) -> Option<&Self>;

    /// Number of elements if this is a sequence, otherwise 0.
    fn sequence_len(&self) -> usize;

    /// Entries of a mapping as `(key text, child)` pairs, in document order.
    fn entries(&self) -> Vec<(Cow<'_, str>, &Self)>;

    /// Coerce a scalar to a boolean.
    fn as_bool(&self) -> Option<bool>;

    /// Coerce a scalar to a non-negative integer.
    fn as_unsigned(&self) -> Option<u64>;

    /// Coerce a scalar to a double.
    fn as_float(&self) -> Option<f64>;

    /// Whether this node is a single scalar value.
    fn is_scalar(&self) -> bool {
        self.kind() == NodeKind::Scalar
    }
}

/// Read and parse a YAML document from disk.
///
/// Failure to read the file is a [`ConfigError::LoadError`] naming the path;
/// malformed content is a [`ConfigError::ParseError`].
pub fn load_file(path: &Path) -> ConfigResult<Value> {
    parse_str(&read_text(path)?)
}

/// Read a document's text from disk.
///
/// Only I/O failures are a [`ConfigError::LoadError`]. Bytes that are not
/// UTF-8 are a [`ConfigError::ParseError`], like any other malformed content.
pub fn read_text(path: &Path) -> ConfigResult<String> {
    let bytes = std::fs::read(path).map_err(|e| ConfigError::load(path.display().to_string(), e))?;
    String::from_utf8(bytes)
        .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))
}

/// Parse a YAML document from a string.
pub fn parse_str(text: &str) -> ConfigResult<Value> {
    serde_yaml::from_str(text).map_err(|e| ConfigError::ParseError(e.to_string()))
}

impl DocumentNode for Value {
    fn kind(&self) -> NodeKind {
        match self {
            Value::Null => NodeKind::Null,
            Value::Bool(_) | Value::Number(_) | Value::String(_) => NodeKind::Scalar,
            Value::Sequence(_) => NodeKind::Sequence,
            Value::Mapping(_) => NodeKind::Mapping,
            Value::Tagged(tagged) => tagged.value.kind(),
        }
    }

    fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Value::Mapping(map) => map
                .iter()
                .find(|(k, _)| scalar_text(k).as_deref() == Some(key))
                .map(|(_, v)| v),
            Value::Tagged(tagged) => tagged.value.get(key),
            _ => None,
        }
    }

    fn at(&self, index: usize) -> Option<&Self> {
        match self {
            Value::Sequence(seq) => seq.get(index),
            Value::Tagged(tagged) => tagged.value.at(index),
            _ => None,
        }
    }

    fn sequence_len(&self) -> usize {
        match self {
            Value::Sequence(seq) => seq.len(),
            Value::Tagged(tagged) => tagged.value.sequence_len(),
            _ => 0,
        }
    }

    fn entries(&self) -> Vec<(Cow<'_, str>, &Self)> {
        match self {
            Value::Mapping(map) => map
                .iter()
                .filter_map(|(k, v)| scalar_text(k).map(|text| (text, v)))
                .collect(),
            Value::Tagged(tagged) => tagged.value.entries(),
            _ => Vec::new(),
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::String(s) => parse_bool_token(s),
            Value::Tagged(tagged) => tagged.value.as_bool(),
            _ => None,
        }
    }

    fn as_unsigned(&self) -> Option<u64> {
        match self {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => parse_unsigned_text(s),
            Value::Tagged(tagged) => tagged.value.as_unsigned(),
            _ => None,
        }
    }

    fn as_float(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => parse_float_text(s),
            Value::Tagged(tagged) => tagged.value.as_float(),
            _ => None,
        }
    }
}

/// Text of a scalar used as a mapping key.
fn scalar_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        _ => None,
    }
}

/// YAML 1.1 boolean spellings.
pub(crate) fn parse_bool_token(text: &str) -> Option<bool> {
    match text.trim() {
        "y" | "Y" | "yes" | "Yes" | "YES" | "true" | "True" | "TRUE" | "on" | "On" | "ON" => {
            Some(true)
        }
        "n" | "N" | "no" | "No" | "NO" | "false" | "False" | "FALSE" | "off" | "Off" | "OFF" => {
            Some(false)
        }
        _ => None,
    }
}

pub(crate) fn parse_unsigned_text(text: &str) -> Option<u64> {
    let text = text.trim();
    let text = text.strip_prefix('+').unwrap_or(text);
    if let Some(hex) = text.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok()
    } else if let Some(oct) = text.strip_prefix("0o") {
        u64::from_str_radix(oct, 8).ok()
    } else {
        text.parse().ok()
    }
}

pub(crate) fn parse_float_text(text: &str) -> Option<f64> {
    let text = text.trim();
    match text {
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => Some(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => Some(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => Some(f64::NAN),
        // Rust accepts "inf"/"nan" spellings that YAML does not.
        _ if text.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') => None,
        _ => text.parse().ok(),
    }
}
