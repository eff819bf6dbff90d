//! Property-Based Tests for Cache Module
//!
//! Uses proptest to verify the engine's observable guarantees.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::Cache;
use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::policy::NopPolicy;

// == Strategies ==
/// Generates cache keys
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,64}".prop_map(|s| s)
}

/// Generates cache values
fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,256}".prop_map(|s| s)
}

/// Generates a sequence of cache operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: String, value: String },
    Get { key: String },
    Remove { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    // Small key space so operations collide
    let key = "[a-d]";
    prop_oneof![
        (key, value_strategy()).prop_map(|(key, value)| CacheOp::Put { key, value }),
        key.prop_map(|key| CacheOp::Get { key }),
        key.prop_map(|key| CacheOp::Remove { key }),
    ]
}

fn new_cache() -> Cache<String> {
    Cache::in_memory(NopPolicy, CacheConfig::default()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Round trip: a stored value is read back unchanged.
    #[test]
    fn prop_roundtrip_storage(key in key_strategy(), value in value_strategy()) {
        tokio_test::block_on(async {
            let cache = new_cache();

            cache.put(key.clone(), value.clone()).await.unwrap();

            let retrieved = cache.get(&key).await.unwrap();
            prop_assert_eq!(retrieved, value, "Round-trip value mismatch");
            Ok(())
        })?;
    }

    // Overwrite returns the prior value and leaves the new one in place.
    #[test]
    fn prop_overwrite_returns_prior(
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy()
    ) {
        tokio_test::block_on(async {
            let cache = new_cache();

            prop_assert_eq!(cache.put(key.clone(), value1.clone()).await.unwrap(), None);
            let previous = cache.put(key.clone(), value2.clone()).await.unwrap();

            prop_assert_eq!(previous, Some(value1), "Overwrite should return prior value");
            prop_assert_eq!(cache.get(&key).await.unwrap(), value2);
            prop_assert_eq!(cache.len(), 1, "Should have exactly one entry after overwrite");
            Ok(())
        })?;
    }

    // Default on miss: the default is returned and then stays cached.
    #[test]
    fn prop_default_on_miss(key in key_strategy(), default in value_strategy()) {
        tokio_test::block_on(async {
            let cache = new_cache();

            prop_assert_eq!(cache.get_or_put(&key, default.clone()).await.unwrap(), default.clone());
            prop_assert_eq!(cache.get(&key).await.unwrap(), default);
            Ok(())
        })?;
    }

    // Removal is terminal: the key reads and removes as not found afterwards.
    #[test]
    fn prop_removal_is_terminal(key in key_strategy(), value in value_strategy()) {
        tokio_test::block_on(async {
            let cache = new_cache();

            cache.put(key.clone(), value.clone()).await.unwrap();
            prop_assert_eq!(cache.remove(&key).await.unwrap(), value);

            prop_assert_eq!(cache.get(&key).await, Err(CacheError::NotFound(key.clone())));
            prop_assert_eq!(cache.remove(&key).await, Err(CacheError::NotFound(key.clone())));
            Ok(())
        })?;
    }

    // Counter consistency: N puts, M removes, then clear converge to N, N-M, 0.
    #[test]
    fn prop_live_count_converges(
        keys in prop::collection::hash_set(key_strategy(), 1..40),
        remove_ratio in 0.0f64..1.0
    ) {
        tokio_test::block_on(async {
            let cache = new_cache();
            let keys: Vec<String> = keys.into_iter().collect();
            let n = keys.len();
            let m = ((n as f64) * remove_ratio) as usize;

            for key in &keys {
                cache.put(key.clone(), "v".to_string()).await.unwrap();
            }
            prop_assert_eq!(cache.settled_count().await.unwrap(), n as i64);

            for key in keys.iter().take(m) {
                cache.remove(key).await.unwrap();
            }
            prop_assert_eq!(cache.settled_count().await.unwrap(), (n - m) as i64);
            prop_assert_eq!(cache.len(), n - m);

            cache.clear().await.unwrap();
            prop_assert_eq!(cache.settled_count().await.unwrap(), 0);
            Ok(())
        })?;
    }

    // The engine agrees with a plain map model for any operation sequence,
    // and hit/miss statistics match what callers observed.
    #[test]
    fn prop_matches_map_model(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        tokio_test::block_on(async {
            let cache = new_cache();
            let mut model: HashMap<String, String> = HashMap::new();
            let mut expected_hits: u64 = 0;
            let mut expected_misses: u64 = 0;

            for op in ops {
                match op {
                    CacheOp::Put { key, value } => {
                        let previous = cache.put(key.clone(), value.clone()).await.unwrap();
                        prop_assert_eq!(previous, model.insert(key, value));
                    }
                    CacheOp::Get { key } => {
                        match cache.get(&key).await {
                            Ok(value) => {
                                expected_hits += 1;
                                prop_assert_eq!(Some(&value), model.get(&key));
                            }
                            Err(e) => {
                                expected_misses += 1;
                                prop_assert!(e.is_not_found());
                                prop_assert!(!model.contains_key(&key));
                            }
                        }
                    }
                    CacheOp::Remove { key } => {
                        let result = cache.remove(&key).await.ok();
                        prop_assert_eq!(result, model.remove(&key));
                    }
                }
            }

            prop_assert_eq!(cache.settled_count().await.unwrap(), model.len() as i64);
            let stats = cache.stats();
            prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
            prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
            Ok(())
        })?;
    }
}

// == Property Test for Concurrent Operation Correctness ==
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    // Concurrent puts, gets and removes on distinct keys never disturb each
    // other's entries.
    #[test]
    fn prop_concurrent_distinct_keys(
        entries in prop::collection::hash_map(key_strategy(), value_strategy(), 2..30)
    ) {
        tokio_test::block_on(async {
            let cache = Arc::new(new_cache());
            let mut handles = vec![];

            for (i, (key, value)) in entries.clone().into_iter().enumerate() {
                let cache = Arc::clone(&cache);
                handles.push(tokio::spawn(async move {
                    cache.put(key.clone(), value.clone()).await?;
                    let read = cache.get(&key).await?;
                    if read != value {
                        return Err(CacheError::Internal(format!("lost update for '{}'", key)));
                    }
                    // Every other key is removed again
                    if i % 2 == 1 {
                        cache.remove(&key).await?;
                    }
                    Ok::<_, CacheError>(())
                }));
            }

            for handle in handles {
                let result = handle.await.expect("Task should not panic");
                prop_assert!(result.is_ok(), "Concurrent operation failed: {:?}", result);
            }

            let kept = entries.len() - entries.len() / 2;
            prop_assert_eq!(cache.len(), kept);
            prop_assert_eq!(cache.settled_count().await.unwrap(), kept as i64);
            Ok(())
        })?;
    }
}
