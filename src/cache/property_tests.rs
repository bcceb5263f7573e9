//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the engine against a simple in-memory model.

use std::collections::HashMap;
use std::sync::Arc;

use proptest::prelude::*;
use serde_json::Value;

use crate::cache::{CacheEngine, ManualClock, SqliteStore, Store};
use crate::config::{CacheConfig, DEFAULT_TTL_SECS};

// == Test Configuration ==
const T0: i64 = 1_700_000_000;

fn lazy_engine() -> (CacheEngine, ManualClock, Arc<SqliteStore>) {
    let clock = ManualClock::new(T0);
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let config = CacheConfig {
        expire_on_get: true,
        ..CacheConfig::default()
    };
    let engine = CacheEngine::with_store(&config, store.clone(), Arc::new(clock.clone())).unwrap();
    (engine, clock, store)
}

// == Strategies ==
/// Generates valid cache keys
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:]{1,64}".prop_map(|s| s)
}

/// Small key space so operation sequences collide on the same keys
fn colliding_key_strategy() -> impl Strategy<Value = String> {
    "[a-c]{1,2}".prop_map(|s| s)
}

/// Scalars, strings and nested arrays/objects of those.
///
/// Floats are left out: decimal text does not promise bit-exact round trips.
fn json_value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 <>/_-]{0,32}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z_]{1,8}", inner, 0..6)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

#[derive(Debug, Clone)]
enum CacheOp {
    Put {
        key: String,
        value: Value,
        ttl: Option<u64>,
    },
    Get {
        key: String,
    },
    Delete {
        key: String,
    },
    Advance {
        secs: i64,
    },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (
            colliding_key_strategy(),
            json_value_strategy(),
            prop::option::of(0u64..20)
        )
            .prop_map(|(key, value, ttl)| CacheOp::Put { key, value, ttl }),
        colliding_key_strategy().prop_map(|key| CacheOp::Get { key }),
        colliding_key_strategy().prop_map(|key| CacheOp::Delete { key }),
        (0i64..10).prop_map(|secs| CacheOp::Advance { secs }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Storing a value and reading it back before expiration returns an
    // equal value.
    #[test]
    fn prop_roundtrip_storage(key in key_strategy(), value in json_value_strategy()) {
        let (engine, _, _) = lazy_engine();

        engine.put(&key, &value, None).unwrap();

        let retrieved = engine.get(&key).unwrap();
        prop_assert_eq!(retrieved, Some(value), "Round-trip value mismatch");
    }

    // After del, get returns nothing regardless of prior state.
    #[test]
    fn prop_delete_removes_entry(
        key in key_strategy(),
        value in prop::option::of(json_value_strategy())
    ) {
        let (engine, _, _) = lazy_engine();

        if let Some(value) = value {
            engine.put(&key, &value, None).unwrap();
        }

        engine.del(&key).unwrap();

        prop_assert!(engine.get(&key).unwrap().is_none(), "Key should not exist after delete");
    }

    // Two puts on one key leave exactly one row holding the second value.
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        value1 in json_value_strategy(),
        value2 in json_value_strategy(),
        ttl in 1u64..1_000
    ) {
        let (engine, _, store) = lazy_engine();

        engine.put(&key, &value1, Some(ttl)).unwrap();
        engine.put(&key, &value2, Some(ttl)).unwrap();

        prop_assert_eq!(engine.get(&key).unwrap(), Some(value2), "Overwrite should return new value");
        prop_assert_eq!(store.len().unwrap(), 1, "Should have exactly one row after overwrite");
    }

    // An entry with TTL t is readable at t-1 seconds and gone at t+1.
    #[test]
    fn prop_ttl_expiration_behavior(
        key in key_strategy(),
        value in json_value_strategy(),
        ttl in 2u64..10_000
    ) {
        let (engine, clock, _) = lazy_engine();

        engine.put(&key, &value, Some(ttl)).unwrap();

        clock.set(T0 + ttl as i64 - 1);
        prop_assert_eq!(engine.get(&key).unwrap(), Some(value), "Entry should exist before TTL expires");

        clock.set(T0 + ttl as i64 + 1);
        prop_assert!(engine.get(&key).unwrap().is_none(), "Entry should not be found after TTL expires");
    }

    // Any interleaving of operations and clock movement agrees with a
    // plain map of (value, deadline).
    #[test]
    fn prop_engine_matches_model(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let (engine, clock, _) = lazy_engine();
        let mut model: HashMap<String, (Value, i64)> = HashMap::new();
        let mut now = T0;
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Put { key, value, ttl } => {
                    engine.put(&key, &value, ttl).unwrap();
                    let ttl = match ttl {
                        Some(ttl) if ttl > 0 => ttl,
                        _ => DEFAULT_TTL_SECS,
                    };
                    model.insert(key, (value, now + ttl as i64));
                }
                CacheOp::Get { key } => {
                    let expected = model
                        .get(&key)
                        .filter(|(_, expires_at)| *expires_at > now)
                        .map(|(value, _)| value.clone());
                    if expected.is_some() {
                        expected_hits += 1;
                    } else {
                        expected_misses += 1;
                    }
                    prop_assert_eq!(engine.get(&key).unwrap(), expected);
                }
                CacheOp::Delete { key } => {
                    engine.del(&key).unwrap();
                    model.remove(&key);
                }
                CacheOp::Advance { secs } => {
                    clock.advance(secs);
                    now += secs;
                }
            }
        }

        let stats = engine.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
    }

    // A sweep removes exactly the rows whose deadline has passed.
    #[test]
    fn prop_sweep_removes_only_expired(
        ttls in prop::collection::vec(1u64..100, 1..30),
        elapsed in 0i64..120
    ) {
        let (engine, clock, store) = lazy_engine();

        for (i, ttl) in ttls.iter().enumerate() {
            engine.put(&format!("key_{}", i), &(i as i64), Some(*ttl)).unwrap();
        }

        clock.advance(elapsed);
        let expected_removed = ttls.iter().filter(|ttl| **ttl as i64 <= elapsed).count();

        prop_assert_eq!(engine.sweep().unwrap(), expected_removed);
        prop_assert_eq!(store.len().unwrap(), ttls.len() - expected_removed);
    }
}
