//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache against a plain `HashMap` model.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use std::thread::sleep;
use std::time::Duration;

use crate::cache::TtlCache;

// == Test Configuration ==
const TEST_TTL: Duration = Duration::from_secs(300);

// == Strategies ==
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9_]{1,16}"
}

fn value_strategy() -> impl Strategy<Value = i64> {
    any::<i64>()
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: i64 },
    Get { key: String },
    Pop { key: String },
    Remove { key: String },
    Update { key: String, delta: i64 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Pop { key }),
        key_strategy().prop_map(|key| CacheOp::Remove { key }),
        (key_strategy(), -100i64..100).prop_map(|(key, delta)| CacheOp::Update { key, delta }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Without expiry, the cache behaves exactly like a map.
    #[test]
    fn prop_matches_map_model(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let cache = TtlCache::<String, i64>::detached(TEST_TTL);
        let mut model: HashMap<String, i64> = HashMap::new();

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    cache.set(key.clone(), value);
                    model.insert(key, value);
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(cache.get(&key), model.get(&key).copied());
                }
                CacheOp::Pop { key } => {
                    prop_assert_eq!(cache.pop(&key), model.remove(&key));
                }
                CacheOp::Remove { key } => {
                    cache.remove(&key);
                    model.remove(&key);
                }
                CacheOp::Update { key, delta } => {
                    let applied = cache.update(&key, |v| v.wrapping_add(delta));
                    let expected = match model.get_mut(&key) {
                        Some(v) => {
                            *v = v.wrapping_add(delta);
                            true
                        }
                        None => false,
                    };
                    prop_assert_eq!(applied, expected);
                }
            }
        }

        prop_assert_eq!(cache.len(), model.len());
        let mut all = cache.all();
        let mut expected: Vec<i64> = model.values().copied().collect();
        all.sort_unstable();
        expected.sort_unstable();
        prop_assert_eq!(all, expected);
    }

    // Storing then reading before expiry returns the stored value.
    #[test]
    fn prop_set_then_get(key in key_strategy(), value in value_strategy()) {
        let cache = TtlCache::<String, i64>::detached(TEST_TTL);

        cache.set(key.clone(), value);

        prop_assert_eq!(cache.get(&key), Some(value));
    }

    // The last write to a key wins and leaves a single entry.
    #[test]
    fn prop_last_write_wins(
        key in key_strategy(),
        values in prop::collection::vec(value_strategy(), 1..10)
    ) {
        let cache = TtlCache::<String, i64>::detached(TEST_TTL);

        for value in &values {
            cache.set(key.clone(), *value);
        }

        prop_assert_eq!(cache.get(&key), values.last().copied());
        prop_assert_eq!(cache.len(), 1);
    }

    // A popped key is gone for subsequent reads.
    #[test]
    fn prop_pop_removes(key in key_strategy(), value in value_strategy()) {
        let cache = TtlCache::<String, i64>::detached(TEST_TTL);
        cache.set(key.clone(), value);

        prop_assert_eq!(cache.pop(&key), Some(value));
        prop_assert_eq!(cache.get(&key), None);
        prop_assert_eq!(cache.pop(&key), None);
    }

    // `len` counts distinct keys.
    #[test]
    fn prop_len_counts_unique_keys(keys in prop::collection::vec(key_strategy(), 0..40)) {
        let cache = TtlCache::<String, i64>::detached(TEST_TTL);

        for (i, key) in keys.iter().enumerate() {
            cache.set(key.clone(), i as i64);
        }

        let unique: HashSet<&String> = keys.iter().collect();
        prop_assert_eq!(cache.len(), unique.len());

        let listed: HashSet<String> = cache.entries().map(|(k, _)| k).collect();
        prop_assert_eq!(listed.len(), unique.len());
    }

    // `update` touches only its own key.
    #[test]
    fn prop_update_preserves_other_keys(
        keys in prop::collection::hash_set(key_strategy(), 2..10),
        delta in -100i64..100
    ) {
        let cache = TtlCache::<String, i64>::detached(TEST_TTL);
        let keys: Vec<String> = keys.into_iter().collect();
        for key in &keys {
            cache.set(key.clone(), 0);
        }

        prop_assert!(cache.update(&keys[0], |v| v + delta));

        prop_assert_eq!(cache.get(&keys[0]), Some(delta));
        for key in &keys[1..] {
            prop_assert_eq!(cache.get(key), Some(0));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(10))]

    // Expired entries are never returned; reading one deletes it.
    #[test]
    fn prop_expired_entries_are_hidden(
        keys in prop::collection::hash_set(key_strategy(), 1..10)
    ) {
        let cache = TtlCache::<String, i64>::detached(TEST_TTL);

        for key in &keys {
            cache.set_with_ttl(key.clone(), 1, Duration::from_millis(5));
        }
        cache.set("LIVE".to_string(), 2);

        sleep(Duration::from_millis(15));

        for key in &keys {
            prop_assert_eq!(cache.get(key), None);
        }
        // `get` already deleted the stale entries it touched
        prop_assert_eq!(cache.cleanup_expired(), 0);
        prop_assert_eq!(cache.len(), 1);
    }
}
