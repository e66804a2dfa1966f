use crate::tree::{ConfigTree, Mapping};
use std::sync::Arc;
use tracing::warn;

/// Deep-merge `overlay` on top of `base`. Neither input is modified.
///
/// Mappings are merged key by key; every other pairing (scalars, sequences,
/// or mismatched kinds) is replaced wholesale by the overlay value. Result
/// keys keep base order, followed by overlay-only keys in overlay order.
/// Subtrees the overlay does not touch are shared with `base`.
pub fn merge(base: &Arc<ConfigTree>, overlay: &Arc<ConfigTree>) -> Arc<ConfigTree> {
    merge_at(base, overlay, &mut Vec::new())
}

/// Like [`merge`], but an absent overlay returns `base` itself.
pub fn merge_fragment(base: &Arc<ConfigTree>, overlay: Option<&Arc<ConfigTree>>) -> Arc<ConfigTree> {
    match overlay {
        Some(overlay) => merge(base, overlay),
        None => Arc::clone(base),
    }
}

fn merge_at<'a>(
    base: &'a Arc<ConfigTree>,
    overlay: &'a Arc<ConfigTree>,
    path: &mut Vec<&'a str>,
) -> Arc<ConfigTree> {
    match (base.as_ref(), overlay.as_ref()) {
        (ConfigTree::Mapping(base_map), ConfigTree::Mapping(overlay_map)) => {
            Arc::new(ConfigTree::Mapping(merge_mappings(base_map, overlay_map, path)))
        }
        (base_node, overlay_node) => {
            if base_node.kind() != overlay_node.kind() {
                warn!(
                    path = %path.join("."),
                    base = %base_node.kind(),
                    overlay = %overlay_node.kind(),
                    "override replaces value of a different kind"
                );
            }
            Arc::clone(overlay)
        }
    }
}

fn merge_mappings<'a>(
    base: &'a Mapping,
    overlay: &'a Mapping,
    path: &mut Vec<&'a str>,
) -> Mapping {
    let mut merged: Mapping = base
        .iter()
        .map(|(key, base_val)| {
            let value = match overlay.get(key) {
                Some(overlay_val) => {
                    path.push(key);
                    let value = merge_at(base_val, overlay_val, path);
                    path.pop();
                    value
                }
                None => Arc::clone(base_val),
            };
            (key.to_string(), value)
        })
        .collect();

    for (key, overlay_val) in overlay.iter() {
        if !base.contains_key(key) {
            merged.insert(key, Arc::clone(overlay_val));
        }
    }

    merged
}
