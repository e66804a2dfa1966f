use crate::parser::{Format, Location};
use crate::tree::NodeKind;
use thiserror::Error;

/// The source text is not a well-formed document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "failed to parse {format} document{}: {message}",
    .location.map(|l| format!(" at {l}")).unwrap_or_default()
)]
pub struct ParseError {
    pub format: Format,
    pub message: String,
    pub location: Option<Location>,
}

impl ParseError {
    pub fn line(&self) -> Option<usize> {
        self.location.map(|l| l.line)
    }

    pub fn column(&self) -> Option<usize> {
        self.location.map(|l| l.column)
    }
}

/// The `overrides` section is not shaped as environment name -> mapping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("`overrides` must be a mapping of environment names to fragments, found a {found}")]
    OverridesNotMapping { found: NodeKind },

    #[error("override fragment for environment '{environment}' must be a mapping, found a {found}")]
    FragmentNotMapping { environment: String, found: NodeKind },
}

/// Any failure that aborts a resolution before merge work begins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
