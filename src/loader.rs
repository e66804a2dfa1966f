use crate::parser::Format;
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Well-known document names, tried in order.
pub const DOCUMENT_CANDIDATES: &[&str] = &[
    "metadata.yaml",
    "metadata.yml",
    "metadata.toml",
    "metadata.json",
];

/// A project's configuration document read from disk.
pub struct ProjectLoader {
    path: PathBuf,
    format: Format,
    source: String,
}

impl ProjectLoader {
    /// Locate and read the configuration document in `project_dir`.
    pub fn new(project_dir: &Path) -> Result<Self> {
        let path = DOCUMENT_CANDIDATES
            .iter()
            .map(|name| project_dir.join(name))
            .find(|path| path.is_file());
        match path {
            Some(path) => Self::from_file(&path),
            None => bail!(
                "no configuration document found in {} (looked for {})",
                project_dir.display(),
                DOCUMENT_CANDIDATES.join(", ")
            ),
        }
    }

    /// Read an explicit document path; the format follows the extension and
    /// defaults to YAML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let format = Format::from_path(path).unwrap_or_default();
        debug!(path = %path.display(), %format, "loaded configuration document");
        Ok(Self {
            path: path.to_path_buf(),
            format,
            source,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}
