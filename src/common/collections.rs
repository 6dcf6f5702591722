//! Collection aliases used throughout the crate. Hash maps use the fx
//! hasher; keys are small ids, not attacker-controlled.

pub use std::collections::{BTreeMap, BTreeSet, hash_map};

pub type HashMap<K, V> = rustc_hash::FxHashMap<K, V>;
pub type HashSet<T> = rustc_hash::FxHashSet<T>;
