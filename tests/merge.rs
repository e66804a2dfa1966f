use envlayer::merge::{merge, merge_fragment};
use envlayer::parser::{Format, parse_document};
use envlayer::tree::ConfigTree;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn yaml(text: &str) -> Arc<ConfigTree> {
    parse_document(text, Format::Yaml).unwrap()
}

fn keys(tree: &ConfigTree) -> Vec<&str> {
    tree.as_mapping().unwrap().keys().collect()
}

#[test]
fn merge_with_empty_fragment_equals_base() {
    let base = yaml("a: 1\nb:\n  c: [1, 2]\n");
    let result = merge(&base, &yaml("{}"));
    assert_eq!(*result, *base);
}

#[test]
fn absent_fragment_returns_base_itself() {
    let base = yaml("a: 1\n");
    let result = merge_fragment(&base, None);
    assert!(Arc::ptr_eq(&result, &base));
}

#[test]
fn nested_override_preserves_siblings() {
    let base = yaml(
        r#"
A:
  x:
    deep: 1
    keep: 2
  y: untouched
B: 10
C:
  d: e
"#,
    );
    let overlay = yaml("A:\n  x:\n    deep: 99\n");
    let result = merge(&base, &overlay);

    assert_eq!(result.get("A.x.deep").and_then(ConfigTree::as_i64), Some(99));
    assert_eq!(result.get("A.x.keep").and_then(ConfigTree::as_i64), Some(2));
    assert_eq!(result.get("A.y").and_then(ConfigTree::as_str), Some("untouched"));
    assert_eq!(result.get("B"), base.get("B"));
    assert_eq!(result.get("C"), base.get("C"));
}

#[test]
fn untouched_subtrees_are_shared_with_base() {
    let base = yaml("A:\n  x: 1\nB:\n  y: 2\n");
    let overlay = yaml("A:\n  x: 5\n");
    let result = merge(&base, &overlay);

    let base_b = base.as_mapping().unwrap().get("B").unwrap();
    let result_b = result.as_mapping().unwrap().get("B").unwrap();
    assert!(Arc::ptr_eq(base_b, result_b));
}

#[test]
fn mapping_replaced_by_scalar_drops_sub_keys() {
    let base = yaml("x:\n  a: 1\n  b: 2\n");
    let overlay = yaml("x: off\n");
    let result = merge(&base, &overlay);
    assert_eq!(result.get("x").and_then(ConfigTree::as_str), Some("off"));
    assert!(result.get("x.a").is_none());
}

#[test]
fn scalar_replaced_by_mapping() {
    let base = yaml("x: 1\n");
    let overlay = yaml("x:\n  nested: true\n");
    let result = merge(&base, &overlay);
    assert_eq!(result.get("x.nested").and_then(ConfigTree::as_bool), Some(true));
}

#[test]
fn sequences_are_replaced_wholesale() {
    let base = yaml("list: [a, b, c]\n");
    let overlay = yaml("list: [z]\n");
    let result = merge(&base, &overlay);
    let items = result.get("list").unwrap().as_sequence().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].as_str(), Some("z"));
}

#[test]
fn explicit_null_replaces_value() {
    let base = yaml("a:\n  b: 1\n");
    let overlay = yaml("a: null\n");
    let result = merge(&base, &overlay);
    assert!(result.get("a").unwrap().is_null());
}

#[test]
fn override_only_keys_are_added_at_any_depth() {
    let base = yaml("features:\n  polars: true\n");
    let overlay = yaml("features:\n  global_hooks: true\nnew_branch:\n  group:\n    flag: 1\n");
    let result = merge(&base, &overlay);
    assert_eq!(
        result.get("features.global_hooks").and_then(ConfigTree::as_bool),
        Some(true)
    );
    assert_eq!(result.get("new_branch.group.flag").and_then(ConfigTree::as_i64), Some(1));
    assert_eq!(result.get("features.polars").and_then(ConfigTree::as_bool), Some(true));
}

#[test]
fn result_keys_follow_base_then_override_order() {
    let base = yaml("b: 1\na: 2\nc: 3\n");
    let overlay = yaml("z: 0\nc: 30\ny: 0\na: 20\n");
    let result = merge(&base, &overlay);
    assert_eq!(keys(&result), vec!["b", "a", "c", "z", "y"]);
}

#[test]
fn merge_does_not_modify_inputs() {
    let base = yaml("a:\n  b: 1\n");
    let overlay = yaml("a:\n  b: 2\n  c: 3\n");
    let base_before = (*base).clone();
    let overlay_before = (*overlay).clone();

    let _ = merge(&base, &overlay);

    assert_eq!(*base, base_before);
    assert_eq!(*overlay, overlay_before);
}
