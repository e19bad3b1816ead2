//! Construction-time configuration: the rehash policy and the table builder.

use crate::error::Result;
use crate::hash_table::HashTable;
use crate::strategy::{
    content_eq, content_hash, pointer_eq, pointer_hash, Address, HashFn, KeyCompare, ReleaseFn,
    Strategies, ValueCompare,
};
use core::hash::Hash;

/// Load-factor thresholds driving automatic rehashes.
///
/// The load factor is `len / bucket_count`. After an insert pushes it above
/// `upper_threshold`, or a removal drops it below `lower_threshold`, the
/// table resizes to the bucket count that best matches `ideal_ratio`. A
/// threshold of `0.0` disables that direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RehashPolicy {
    ideal_ratio: f32,
    lower_threshold: f32,
    upper_threshold: f32,
}

impl RehashPolicy {
    pub const DEFAULT_IDEAL_RATIO: f32 = 3.0;
    pub const DEFAULT_LOWER_THRESHOLD: f32 = 0.0;
    pub const DEFAULT_UPPER_THRESHOLD: f32 = 15.0;

    /// Panics unless `ideal_ratio > 0`, `0 <= lower_threshold < ideal_ratio`
    /// and `upper_threshold` is either `0` or greater than `ideal_ratio`.
    pub fn new(ideal_ratio: f32, lower_threshold: f32, upper_threshold: f32) -> Self {
        assert!(
            ideal_ratio > 0.0 && ideal_ratio.is_finite(),
            "ideal ratio must be positive and finite, got {ideal_ratio}"
        );
        assert!(
            lower_threshold >= 0.0 && lower_threshold < ideal_ratio,
            "lower threshold must be in [0, ideal ratio), got {lower_threshold}"
        );
        assert!(
            upper_threshold == 0.0 || upper_threshold > ideal_ratio,
            "upper threshold must be 0 or above the ideal ratio, got {upper_threshold}"
        );
        Self {
            ideal_ratio,
            lower_threshold,
            upper_threshold,
        }
    }

    pub fn ideal_ratio(&self) -> f32 {
        self.ideal_ratio
    }

    pub fn lower_threshold(&self) -> f32 {
        self.lower_threshold
    }

    pub fn upper_threshold(&self) -> f32 {
        self.upper_threshold
    }

    pub(crate) fn should_grow(&self, len: usize, bucket_count: usize) -> bool {
        self.upper_threshold > 0.0 && load_factor(len, bucket_count) > self.upper_threshold
    }

    pub(crate) fn should_shrink(&self, len: usize, bucket_count: usize) -> bool {
        self.lower_threshold > 0.0 && load_factor(len, bucket_count) < self.lower_threshold
    }
}

impl Default for RehashPolicy {
    fn default() -> Self {
        Self {
            ideal_ratio: Self::DEFAULT_IDEAL_RATIO,
            lower_threshold: Self::DEFAULT_LOWER_THRESHOLD,
            upper_threshold: Self::DEFAULT_UPPER_THRESHOLD,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn load_factor(len: usize, bucket_count: usize) -> f32 {
    len as f32 / bucket_count as f32
}

/// Builder for [`HashTable`].
///
/// ```
/// use chained_hashtable::{HashTableBuilder, RehashPolicy};
///
/// let mut table = HashTableBuilder::<String, u32>::by_content(7)
///     .rehash_policy(RehashPolicy::new(1.0, 0.0, 2.0))
///     .build()
///     .unwrap();
/// table.put("a".to_string(), 1).unwrap();
/// assert_eq!(table.get(&"a".to_string()), Some(&1));
/// ```
pub struct HashTableBuilder<K, V> {
    initial_buckets: usize,
    strategies: Strategies<K, V>,
    policy: RehashPolicy,
}

impl<K, V> HashTableBuilder<K, V>
where
    K: Address + 'static,
    V: Address + 'static,
{
    /// Identity comparison and address hashing for both keys and values.
    ///
    /// Putting a handle that is already stored releases nothing: the
    /// incoming duplicate is dropped and the stored handle kept.
    pub fn new(initial_buckets: usize) -> Self {
        let mut builder =
            Self::with_strategies(initial_buckets, pointer_eq(), pointer_eq(), pointer_hash());
        builder
            .strategies
            .set_identity(Some(pointer_eq()), Some(pointer_eq()));
        builder
    }
}

impl<K, V> HashTableBuilder<K, V>
where
    K: Eq + Hash + 'static,
    V: PartialEq + 'static,
{
    /// Content comparison (`Eq`/`PartialEq`) and content hashing (`Hash`).
    pub fn by_content(initial_buckets: usize) -> Self {
        Self::with_strategies(initial_buckets, content_eq(), content_eq(), content_hash())
    }
}

impl<K, V> HashTableBuilder<K, V> {
    /// Panics if `initial_buckets` is zero.
    pub fn with_strategies(
        initial_buckets: usize,
        key_eq: KeyCompare<K>,
        value_eq: ValueCompare<V>,
        hash: HashFn<K>,
    ) -> Self {
        assert!(initial_buckets > 0, "a table needs at least one bucket");
        Self {
            initial_buckets,
            strategies: Strategies::new(key_eq, value_eq, hash),
            policy: RehashPolicy::default(),
        }
    }

    pub fn key_compare(mut self, key_eq: KeyCompare<K>) -> Self {
        self.strategies.key_eq = key_eq;
        self
    }

    pub fn value_compare(mut self, value_eq: ValueCompare<V>) -> Self {
        self.strategies.value_eq = value_eq;
        self
    }

    pub fn hash_function(mut self, hash: HashFn<K>) -> Self {
        self.strategies.hash = hash;
        self
    }

    /// Hooks that receive keys and values the table lets go of. Without
    /// them released items are dropped.
    pub fn release_functions(
        mut self,
        release_key: Option<ReleaseFn<K>>,
        release_value: Option<ReleaseFn<V>>,
    ) -> Self {
        self.strategies.set_release(release_key, release_value);
        self
    }

    pub fn rehash_policy(mut self, policy: RehashPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Allocates the bucket array.
    pub fn build(self) -> Result<HashTable<K, V>> {
        HashTable::from_parts(self.initial_buckets, self.strategies, self.policy)
    }
}
