//! Resolution pipeline and the snapshot cache that owns its results.
//!
//! `resolve_document` runs parse -> override extraction -> environment
//! selection -> merge. All fatal errors surface before merging starts, so a
//! caller either gets a complete snapshot or an error. `ConfigService` keeps
//! one immutable snapshot per (format, source, environment) and hands out
//! shared references to it.

use crate::environment::{normalize_environment, select_fragment};
use crate::error::ResolveError;
use crate::hash::source_fingerprint;
use crate::merge::merge_fragment;
use crate::overrides::OverrideRegistry;
use crate::parser::{Format, parse_document};
use crate::tree::ConfigTree;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

/// One fully merged configuration for one environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    tree: Arc<ConfigTree>,
    environment: Option<String>,
    override_applied: bool,
    environments: Vec<String>,
    fingerprint: String,
}

impl ResolvedConfig {
    pub fn tree(&self) -> &ConfigTree {
        &self.tree
    }

    /// Shared handle to the resolved tree.
    pub fn tree_arc(&self) -> Arc<ConfigTree> {
        Arc::clone(&self.tree)
    }

    pub fn get(&self, path: &str) -> Option<&ConfigTree> {
        self.tree.get(path)
    }

    /// The environment identifier that was requested, if it was set.
    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    /// Whether an override fragment matched the requested environment.
    pub fn override_applied(&self) -> bool {
        self.override_applied
    }

    /// Environment names declared under `overrides`, in document order.
    pub fn environments(&self) -> &[String] {
        &self.environments
    }

    /// SHA-256 of the source text this snapshot was resolved from.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Decode the resolved document into a typed structure.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        let value = serde_json::to_value(self.tree.as_ref())?;
        serde_json::from_value(value)
    }
}

/// Resolve `source` for `environment` without caching.
pub fn resolve_document(
    source: &str,
    format: Format,
    environment: Option<&str>,
) -> Result<ResolvedConfig, ResolveError> {
    let root = parse_document(source, format)?;
    let (base, registry) = OverrideRegistry::extract(&root)?;

    let environment = normalize_environment(environment);
    let fragment = select_fragment(&registry, environment);
    debug!(
        environment = environment.unwrap_or("<unset>"),
        applied = fragment.is_some(),
        "merging override fragment"
    );
    let tree = merge_fragment(&base, fragment);

    Ok(ResolvedConfig {
        tree,
        environment: environment.map(str::to_string),
        override_applied: fragment.is_some(),
        environments: registry.environments().map(str::to_string).collect(),
        fingerprint: source_fingerprint(source),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    format: Format,
    fingerprint: String,
    environment: Option<String>,
}

/// Caches resolved snapshots and tracks the most recently published one.
///
/// Snapshots are immutable; resolving a changed source produces a new one and
/// leaves every previously returned snapshot untouched. Only snapshots of the
/// latest source per format stay cached.
#[derive(Debug, Default)]
pub struct ConfigService {
    snapshots: RwLock<HashMap<CacheKey, Arc<ResolvedConfig>>>,
    current: RwLock<Option<Arc<ResolvedConfig>>>,
}

impl ConfigService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide service instance.
    pub fn global() -> &'static ConfigService {
        static GLOBAL: OnceLock<ConfigService> = OnceLock::new();
        GLOBAL.get_or_init(ConfigService::new)
    }

    /// Resolve a YAML document for `environment`.
    pub fn resolve(
        &self,
        source: &str,
        environment: Option<&str>,
    ) -> Result<Arc<ResolvedConfig>, ResolveError> {
        self.resolve_as(source, Format::Yaml, environment)
    }

    /// Resolve `source` in the given format, reusing a cached snapshot when the
    /// same source and environment were resolved before.
    pub fn resolve_as(
        &self,
        source: &str,
        format: Format,
        environment: Option<&str>,
    ) -> Result<Arc<ResolvedConfig>, ResolveError> {
        let key = CacheKey {
            format,
            fingerprint: source_fingerprint(source),
            environment: normalize_environment(environment).map(str::to_string),
        };

        let cached = self.snapshots.read().get(&key).cloned();
        let snapshot = match cached {
            Some(snapshot) => {
                debug!(fingerprint = %key.fingerprint, "reusing cached configuration snapshot");
                snapshot
            }
            None => {
                let resolved = Arc::new(resolve_document(source, format, environment)?);
                let mut snapshots = self.snapshots.write();
                // A new source for this format supersedes earlier ones.
                let evicted = snapshots.len();
                snapshots.retain(|k, _| k.format != key.format || k.fingerprint == key.fingerprint);
                let evicted = evicted - snapshots.len();
                if evicted > 0 {
                    debug!(evicted, "evicted snapshots of superseded sources");
                }
                // Another thread may have resolved the same key meanwhile.
                let snapshot = Arc::clone(snapshots.entry(key).or_insert(resolved));
                info!(
                    environment = snapshot.environment().unwrap_or("<unset>"),
                    override_applied = snapshot.override_applied(),
                    "published configuration snapshot"
                );
                snapshot
            }
        };

        *self.current.write() = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// The most recently resolved snapshot.
    pub fn current(&self) -> Option<Arc<ResolvedConfig>> {
        self.current.read().clone()
    }

    /// Drop all cached snapshots. Snapshots already handed out stay valid.
    pub fn invalidate(&self) {
        self.snapshots.write().clear();
        *self.current.write() = None;
    }

    pub fn cached_len(&self) -> usize {
        self.snapshots.read().len()
    }
}
