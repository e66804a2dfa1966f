use crate::error::SchemaError;
use crate::tree::ConfigTree;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::debug;

/// Reserved top-level key holding per-environment override fragments.
pub const OVERRIDES_KEY: &str = "overrides";

/// Environment name -> override fragment, built once per base document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideRegistry {
    fragments: IndexMap<String, Arc<ConfigTree>>,
}

impl OverrideRegistry {
    /// Split `root` into the base tree (without the `overrides` key) and the
    /// registry of fragments declared under it.
    ///
    /// A root without an `overrides` key, or one that is not a mapping at all,
    /// is returned as-is together with an empty registry.
    pub fn extract(
        root: &Arc<ConfigTree>,
    ) -> Result<(Arc<ConfigTree>, OverrideRegistry), SchemaError> {
        let ConfigTree::Mapping(map) = root.as_ref() else {
            return Ok((Arc::clone(root), OverrideRegistry::default()));
        };
        let Some(section) = map.get(OVERRIDES_KEY) else {
            return Ok((Arc::clone(root), OverrideRegistry::default()));
        };

        let ConfigTree::Mapping(envs) = section.as_ref() else {
            return Err(SchemaError::OverridesNotMapping {
                found: section.kind(),
            });
        };

        let mut fragments = IndexMap::with_capacity(envs.len());
        for (environment, fragment) in envs.iter() {
            if !matches!(fragment.as_ref(), ConfigTree::Mapping(_)) {
                return Err(SchemaError::FragmentNotMapping {
                    environment: environment.to_string(),
                    found: fragment.kind(),
                });
            }
            fragments.insert(environment.to_string(), Arc::clone(fragment));
        }
        debug!(environments = fragments.len(), "extracted override fragments");

        let base = Arc::new(ConfigTree::Mapping(map.without(OVERRIDES_KEY)));
        Ok((base, OverrideRegistry { fragments }))
    }

    pub fn get(&self, environment: &str) -> Option<&Arc<ConfigTree>> {
        self.fragments.get(environment)
    }

    /// Environment names in document order.
    pub fn environments(&self) -> impl Iterator<Item = &str> {
        self.fragments.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}
