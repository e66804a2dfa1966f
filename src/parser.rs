use crate::error::ParseError;
use crate::tree::{ConfigTree, Mapping, Scalar};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Textual formats a configuration document may be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    #[default]
    Yaml,
    Toml,
    Json,
}

impl Format {
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(Format::Yaml),
            "toml" => Some(Format::Toml),
            "json" => Some(Format::Json),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Format> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Format::from_extension)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Yaml => "YAML",
            Format::Toml => "TOML",
            Format::Json => "JSON",
        };
        f.write_str(name)
    }
}

/// 1-based position in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Parse `text` into a configuration tree.
///
/// The parser does not interpret keys; a YAML document with no content
/// yields an empty mapping.
pub fn parse_document(text: &str, format: Format) -> Result<Arc<ConfigTree>, ParseError> {
    debug!(%format, len = text.len(), "parsing configuration document");
    let tree = match format {
        Format::Yaml => parse_yaml(text)?,
        Format::Toml => toml::from_str::<ConfigTree>(text).map_err(|e| ParseError {
            format,
            message: e.message().to_string(),
            location: e.span().map(|span| offset_to_location(text, span.start)),
        })?,
        Format::Json => serde_json::from_str::<ConfigTree>(text).map_err(|e| ParseError {
            format,
            message: json_message(&e),
            location: (e.line() > 0).then(|| Location {
                line: e.line(),
                column: e.column().max(1),
            }),
        })?,
    };
    Ok(Arc::new(tree))
}

fn parse_yaml(text: &str) -> Result<ConfigTree, ParseError> {
    if is_blank_yaml(text) {
        return Ok(ConfigTree::empty_mapping());
    }
    let yaml_error = |message: String, location: Option<Location>| ParseError {
        format: Format::Yaml,
        message,
        location,
    };

    let mut value: serde_yaml::Value = serde_yaml::from_str(text).map_err(|e| {
        let location = e.location().map(|l| Location {
            line: l.line(),
            column: l.column(),
        });
        yaml_error(strip_location_suffix(&e.to_string()), location)
    })?;
    value
        .apply_merge()
        .map_err(|e| yaml_error(format!("invalid merge key: {e}"), None))?;
    yaml_to_tree(value).map_err(|message| yaml_error(message, None))
}

/// Convert a parsed YAML value, dropping tags and stringifying scalar keys.
fn yaml_to_tree(value: serde_yaml::Value) -> Result<ConfigTree, String> {
    use serde_yaml::Value;

    let tree: ConfigTree = match value {
        Value::Null => Scalar::Null.into(),
        Value::Bool(b) => Scalar::Bool(b).into(),
        Value::Number(n) => number_to_scalar(&n)?.into(),
        Value::String(s) => Scalar::String(s).into(),
        Value::Tagged(tagged) => yaml_to_tree(tagged.value)?,
        Value::Sequence(items) => ConfigTree::Sequence(
            items
                .into_iter()
                .map(|item| yaml_to_tree(item).map(Arc::new))
                .collect::<Result<_, _>>()?,
        ),
        Value::Mapping(entries) => {
            let mut map = Mapping::new();
            for (key, value) in entries {
                let key = yaml_key(key)?;
                if map.contains_key(&key) {
                    return Err(format!("duplicate key `{key}`"));
                }
                map.insert(key, yaml_to_tree(value)?);
            }
            ConfigTree::Mapping(map)
        }
    };
    Ok(tree)
}

fn yaml_key(key: serde_yaml::Value) -> Result<String, String> {
    use serde_yaml::Value;

    match key {
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok("null".to_string()),
        Value::Tagged(tagged) => yaml_key(tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => {
            Err("mapping keys must be scalars".to_string())
        }
    }
}

fn number_to_scalar(n: &serde_yaml::Number) -> Result<Scalar, String> {
    if let Some(i) = n.as_i64() {
        Ok(Scalar::Integer(i))
    } else if let Some(x) = n.as_f64().filter(|_| n.is_f64()) {
        Ok(Scalar::Float(x))
    } else {
        Err(out_of_range(n))
    }
}

/// Message shared by every format for integers that do not fit in an `i64`.
pub(crate) fn out_of_range(value: impl fmt::Display) -> String {
    format!("integer {value} is out of range for a 64-bit signed integer")
}

fn is_blank_yaml(text: &str) -> bool {
    text.lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#') || line == "---")
}

// serde_yaml and serde_json append " at line X column Y" to their messages;
// the location is reported separately.
fn strip_location_suffix(message: &str) -> String {
    match message.rfind(" at line ") {
        Some(idx) => message[..idx].to_string(),
        None => message.to_string(),
    }
}

fn json_message(err: &serde_json::Error) -> String {
    strip_location_suffix(&err.to_string())
}

fn offset_to_location(text: &str, offset: usize) -> Location {
    let offset = offset.min(text.len());
    let before = &text.as_bytes()[..offset];
    let line = before.iter().filter(|b| **b == b'\n').count() + 1;
    let line_start = before
        .iter()
        .rposition(|b| *b == b'\n')
        .map(|i| i + 1)
        .unwrap_or(0);
    Location {
        line,
        column: offset - line_start + 1,
    }
}
