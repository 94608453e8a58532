//! End-to-end lookups against the checked-in hierarchy fixture
//!
//! `test-fixtures/hierarchy/` holds the same hierarchy in both base
//! configuration layouts: `hiera.yaml` (version 3, yaml + json backends) and
//! `hiera5.yaml` (version 5, yaml only). Behaviour that does not depend on
//! the json backend must be identical under both.

use hiera_core::{
    ConfigVersion, Context, Error, LookupOptions, MergePolicy, Resolver, ResolverOptions,
};
use hiera_test_utils::fixtures::{hierarchy_dir, hierarchy_file};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

const V3: &str = "hiera.yaml";
const V5: &str = "hiera5.yaml";

fn open(config: &str) -> Resolver {
    let options = ResolverOptions::new().with_var("name", "test");
    Resolver::open_with(hierarchy_file(config), options).unwrap()
}

fn get(resolver: &Resolver, key: &str) -> Value {
    resolver
        .get_with(key, &LookupOptions::new().throw_on_missing(true))
        .unwrap_or_else(|e| panic!("lookup of {key} failed: {e}"))
        .unwrap()
}

#[rstest]
#[case(V3, ConfigVersion::V3)]
#[case(V5, ConfigVersion::V5)]
fn test_layout_is_detected(#[case] config: &str, #[case] version: ConfigVersion) {
    let resolver = open(config);
    assert_eq!(resolver.version(), version);
    assert_eq!(resolver.hierarchy().len(), 5);
    assert_eq!(
        resolver.base_dir(),
        &hiera_fs::NormalizedPath::new(hierarchy_dir())
    );
}

#[rstest]
fn test_lookups(
    #[values(V3, V5)] config: &str,
    #[values(
        ("test_basic_get", json!("test_basic_get_works")),
        ("test_hierarchy_get", json!("level1")),
        ("test_hierarchy_get_2", json!("test_hierarchy_get_2_level2")),
        ("test_override", json!("b")),
        ("test_alias", json!("test_alias_works")),
        ("test_complex_alias", json!({"key1": "value1"})),
        ("test_literal", json!("hi")),
        ("test_scope", json!("test")),
        ("test_scope_ns", json!("test")),
        ("test_hiera", json!("test_alias_works")),
        ("test_interpolate", json!("this is interpolated: test")),
        ("test_interpolate_ns", json!("this is interpolated: test")),
        ("test_resolve_hash", json!({"a": "test", "b": 1, "c": "hi"})),
        ("test_resolve_array", json!(["test", 1, "hi"])),
        ("test_empty_hash", json!({})),
        ("test_empty_list", json!([])),
        ("test_false", json!(false)),
        ("test_null", Value::Null),
        ("node_name", json!("test")),
        ("network_interface", json!("eth0")),
        ("deep_fragment", json!("found"))
    )]
    case: (&str, Value),
) {
    let (key, expected) = case;
    assert_eq!(get(&open(config), key), expected);
}

#[rstest]
fn test_merges(
    #[values(V3, V5)] config: &str,
    #[values(
        ("test_basic_merge", MergePolicy::list(), json!(["a", "b"])),
        ("test_array_merge_a", MergePolicy::list(), json!(["a", "b", "c"])),
        ("test_array_merge_b", MergePolicy::list(), json!(["a", "b", "c", "d"])),
        ("test_array_merge_b", MergePolicy::set(), json!(["a", "b", "c", "d"])),
        ("test_hash_merge_a", MergePolicy::dict(), json!({"a": 1, "b": 2})),
        ("test_hash_merge_b", MergePolicy::dict(), json!({"a": 1, "b": 1})),
        ("test_interpolated_hash_merge", MergePolicy::dict(), json!({"a": "override-a-hi", "b": "default-b-hi"}))
    )]
    case: (&str, MergePolicy, Value),
) {
    let (key, policy, expected) = case;
    let resolver = open(config);
    let value = resolver
        .get_with(key, &LookupOptions::new().merge(policy))
        .unwrap();
    assert_eq!(value, Some(expected));
}

#[rstest]
fn test_alias_misuse_fails(#[values(V3, V5)] config: &str) {
    let err = open(config).get("test_alias_invalid").unwrap_err();
    assert!(matches!(err, Error::InvalidFunctionCall { .. }));
}

#[rstest]
fn test_call_context_changes_scope(#[values(V3, V5)] config: &str) {
    let resolver = open(config);
    let options = LookupOptions::new().set("name", "wat");
    assert_eq!(
        resolver.get_with("node_name", &options).unwrap(),
        Some(json!("wat"))
    );
    assert_eq!(
        resolver.get_with("test_hierarchy_get", &options).unwrap(),
        Some(json!("common"))
    );
    assert_eq!(resolver.get_with("test_basic_get", &options).unwrap(), None);
}

#[rstest]
fn test_override_level_takes_precedence(#[values(V3, V5)] config: &str) {
    let resolver = open(config);
    let edge = resolver.scoped(Context::new().with("name", "edge"));
    assert_eq!(edge.get("test_basic_get").unwrap(), Some(json!("overridden_for_edge")));
    assert_eq!(edge.get("node_name").unwrap(), Some(json!("edge")));
}

#[rstest]
fn test_missing_key_defaults(#[values(V3, V5)] config: &str) {
    let resolver = open(config);
    assert_eq!(
        resolver
            .get_with("missing", &LookupOptions::new().with_default(42))
            .unwrap(),
        Some(json!(42))
    );
    assert!(!resolver.has("missing", &Context::new()).unwrap());
    assert!(resolver.has("test_basic_get", &Context::new()).unwrap());
}

#[test]
fn test_json_backend_only_in_version_3() {
    let v3 = open(V3);
    let v5 = open(V5);

    assert_eq!(get(&v3, "json_only_key"), json!("from json"));
    assert_eq!(v5.get("json_only_key").unwrap(), None);

    assert_eq!(get(&v3, "storage_driver"), json!("overlay2"));
    assert_eq!(v5.get("storage_driver").unwrap(), None);
}

#[test]
fn test_yaml_backend_precedes_json() {
    assert_eq!(get(&open(V3), "common_key"), json!("from yaml"));
}

#[rstest]
fn test_directory_fragments_load_in_name_order(#[values(V3, V5)] config: &str) {
    // nested/deep.yaml then network.yaml in the yaml pass; storage.json
    // only loads in the json pass and README.txt in neither.
    assert_eq!(get(&open(config), "shared_fragment"), json!("network"));
}

#[rstest]
fn test_file_level_outranks_later_fragments(#[values(V3, V5)] config: &str) {
    assert_eq!(get(&open(config), "test_hierarchy_get"), json!("level1"));
}

#[test]
fn test_list_merge_over_fragments_reads_each_file_once() {
    let options = LookupOptions::new().merge(MergePolicy::list());
    assert_eq!(
        open(V3).get_with("fragment_servers", &options).unwrap(),
        Some(json!(["net", "store"]))
    );
}

#[test]
fn test_warm_cache_covers_base_context() {
    let resolver = open(V3);
    // level1, level2, nested/deep.yaml and network.yaml, storage.json
    // from the json pass, common.yaml, common.json
    assert_eq!(resolver.cache().len(), 7);
}

#[test]
fn test_get_nested_through_fixture() {
    let resolver = open(V5);
    assert_eq!(resolver.get_nested("test_complex_alias.key1").unwrap(), Some(json!("value1")));
    assert_eq!(resolver.get_nested("test_resolve_hash.b").unwrap(), Some(json!(1)));
}
