use crate::overrides::OverrideRegistry;
use crate::tree::ConfigTree;
use std::sync::Arc;
use tracing::debug;

/// Treat empty and whitespace-only identifiers as unset.
pub fn normalize_environment(environment: Option<&str>) -> Option<&str> {
    environment.filter(|env| !env.trim().is_empty())
}

/// Pick the override fragment for `environment`.
///
/// Matching is exact and case-sensitive. An unset or unknown identifier
/// selects no fragment, which is not an error.
pub fn select_fragment<'a>(
    registry: &'a OverrideRegistry,
    environment: Option<&str>,
) -> Option<&'a Arc<ConfigTree>> {
    let env = normalize_environment(environment)?;
    let fragment = registry.get(env);
    if fragment.is_none() {
        debug!(environment = env, "no override fragment for environment");
    }
    fragment
}
