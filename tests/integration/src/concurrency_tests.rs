//! Concurrent lookups against one shared resolver
//!
//! A `Resolver` is shared behind an `Arc`; every thread sees the same
//! results and the cache holds one entry per file no matter how many
//! threads raced to load it.

use hiera_core::{Context, LookupOptions, MergePolicy, Resolver, ResolverOptions};
use hiera_test_utils::TestHierarchy;
use hiera_test_utils::fixtures::hierarchy_file;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_concurrent_lookups_agree() {
    let options = ResolverOptions::new().with_var("name", "test");
    let resolver = Arc::new(Resolver::open_with(hierarchy_file("hiera.yaml"), options).unwrap());

    let num_threads = 8;
    let barrier = Arc::new(Barrier::new(num_threads));

    let handles: Vec<_> = (0..num_threads)
        .map(|_| {
            let resolver = Arc::clone(&resolver);
            let barrier = Arc::clone(&barrier);

            thread::spawn(move || {
                barrier.wait();

                for _ in 0..25 {
                    assert_eq!(
                        resolver.get("test_complex_alias").unwrap(),
                        Some(json!({"key1": "value1"}))
                    );
                    assert_eq!(
                        resolver
                            .get_with("test_array_merge_b", &LookupOptions::new().merge(MergePolicy::list()))
                            .unwrap(),
                        Some(json!(["a", "b", "c", "d"]))
                    );
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread should not panic");
    }
}

#[test]
fn test_concurrent_first_loads_share_one_entry() {
    let hiera = TestHierarchy::v3(&["yaml"], &["nodes/%{name}", "common"]);
    let num_threads = 6;
    for i in 0..num_threads {
        hiera.write_data(&format!("nodes/node{i}.yaml"), &format!("id: {i}\n"));
    }
    hiera.write_data("common.yaml", "id: -1\nname: \"%{scope('name')}\"\n");

    // Only common.yaml is warmed; the node files are loaded under contention.
    let resolver = Arc::new(Resolver::open(hiera.config_path()).unwrap());
    assert_eq!(resolver.cache().len(), 1);

    let barrier = Arc::new(Barrier::new(num_threads * 2));
    let handles: Vec<_> = (0..num_threads * 2)
        .map(|t| {
            let resolver = Arc::clone(&resolver);
            let barrier = Arc::clone(&barrier);
            let node = t % num_threads;

            thread::spawn(move || {
                barrier.wait();
                let scoped = resolver.scoped(Context::new().with("name", format!("node{node}")));
                assert_eq!(scoped.get("id").unwrap(), Some(json!(node)));
                assert_eq!(scoped.get("name").unwrap(), Some(json!(format!("node{node}"))));
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread should not panic");
    }

    assert_eq!(resolver.cache().len(), num_threads + 1);
}
