use crate::tree::ConfigTree;
use anyhow::{Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
    Toml,
}

/// Serialize a tree back to text, keeping mapping keys in tree order.
pub fn render(tree: &ConfigTree, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(tree).context("failed to render YAML"),
        OutputFormat::Json => serde_json::to_string_pretty(tree)
            .map(|mut out| {
                out.push('\n');
                out
            })
            .context("failed to render JSON"),
        OutputFormat::Toml => toml::to_string(tree).context("failed to render TOML"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Format, parse_document};

    #[test]
    fn yaml_round_trip_keeps_key_order() {
        let tree = parse_document("zeta: 1\nalpha:\n  b: true\n  a: x\n", Format::Yaml).unwrap();
        let out = render(&tree, OutputFormat::Yaml).unwrap();
        assert_eq!(out, "zeta: 1\nalpha:\n  b: true\n  a: x\n");
    }

    #[test]
    fn json_output_is_pretty() {
        let tree = parse_document("a:\n  - 1\n  - 2\n", Format::Yaml).unwrap();
        let out = render(&tree, OutputFormat::Json).unwrap();
        assert_eq!(out, "{\n  \"a\": [\n    1,\n    2\n  ]\n}\n");
    }

    #[test]
    fn toml_rejects_null_values() {
        let tree = parse_document("a: null\n", Format::Yaml).unwrap();
        assert!(render(&tree, OutputFormat::Toml).is_err());
    }
}
