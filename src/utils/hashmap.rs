//! Hash-maps with a fixed hasher state.
//!
//! The iteration order of these maps only depends on the inserted keys, never on a
//! per-process random seed, so two runs over the same input visit cells in the same order.

use core::hash::Hash;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use hashbrown::hash_map::Entry;

/// Hashmap using [`hashbrown::HashMap`] with a fixed [`foldhash`] state.
pub type HashMap<K, V> = hashbrown::hash_map::HashMap<K, V, foldhash::fast::FixedState>;
/// Hashset using [`hashbrown::HashSet`] with a fixed [`foldhash`] state.
pub type HashSet<K> = hashbrown::hash_set::HashSet<K, foldhash::fast::FixedState>;

/// Serializes the entries of a hash-map as a sequence of `(key, value)` pairs sorted by key.
///
/// Two maps holding the same entries always produce the same output, whatever their capacity
/// or insertion history.
pub fn serialize_sorted_entries<S, K, V>(map: &HashMap<K, V>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    K: Serialize + Ord,
    V: Serialize,
{
    let mut entries: Vec<(&K, &V)> = map.iter().collect();
    entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
    s.collect_seq(entries)
}

/// Rebuilds a hash-map from a sequence of `(key, value)` pairs.
pub fn deserialize_entries<'de, D, K, V>(d: D) -> Result<HashMap<K, V>, D::Error>
where
    D: Deserializer<'de>,
    K: Deserialize<'de> + Eq + Hash,
    V: Deserialize<'de>,
{
    let entries: Vec<(K, V)> = Vec::deserialize(d)?;
    Ok(entries.into_iter().collect())
}
