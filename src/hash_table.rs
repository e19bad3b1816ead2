//! HashTable: separately chained table with strategy-driven lookups and
//! load-factor driven resizing.

use crate::chain::{bucket_index, Chains};
use crate::config::{HashTableBuilder, RehashPolicy};
use crate::error::{Error, Result};
use crate::reentrancy::DebugReentrancy;
use crate::sizing::{ideal_bucket_count, POST_CLEAR_BUCKETS};
use crate::strategy::{Address, HashFn, KeyCompare, ReleaseFn, Strategies, ValueCompare};
use core::fmt;
use core::hash::Hash;
use slotmap::DefaultKey;

/// A key → value map resolving collisions by chaining.
///
/// Keys are compared and hashed only through the table's strategies, so
/// the same type can be keyed by identity or by content depending on how
/// the table was built. Keys and values are owned by the table; whatever it
/// lets go of (overwritten, removed, cleared, or still stored on drop) is
/// passed to the release hooks if any are set.
pub struct HashTable<K, V> {
    pub(crate) chains: Chains<K, V>,
    strategies: Strategies<K, V>,
    policy: RehashPolicy,
    pub(crate) reentrancy: DebugReentrancy,
}

impl<K, V> HashTable<K, V>
where
    K: Address + 'static,
    V: Address + 'static,
{
    /// Table keyed by identity with `bucket_count` buckets and the default
    /// rehash policy. Panics if `bucket_count` is zero.
    pub fn new(bucket_count: usize) -> Result<Self> {
        HashTableBuilder::new(bucket_count).build()
    }
}

impl<K, V> HashTable<K, V>
where
    K: Eq + Hash + 'static,
    V: PartialEq + 'static,
{
    /// Table keyed by content. Panics if `bucket_count` is zero.
    pub fn by_content(bucket_count: usize) -> Result<Self> {
        HashTableBuilder::by_content(bucket_count).build()
    }
}

/// Resizes to `target` buckets unless already there. Allocation failure is
/// absorbed: the table keeps its current array, only its load factor
/// suffers.
fn resize<K, V>(chains: &mut Chains<K, V>, hash: &dyn Fn(&K) -> u64, target: usize) {
    let from = chains.bucket_count();
    if target == from {
        return;
    }
    match chains.redistribute(target, hash) {
        Ok(()) => log::trace!(
            "rehashed {} entries from {from} to {target} buckets",
            chains.len()
        ),
        Err(_) => log::warn!("could not allocate {target} buckets, staying at {from}"),
    }
}

impl<K, V> HashTable<K, V> {
    pub(crate) fn from_parts(
        bucket_count: usize,
        strategies: Strategies<K, V>,
        policy: RehashPolicy,
    ) -> Result<Self> {
        assert!(bucket_count > 0, "a table needs at least one bucket");
        Ok(Self {
            chains: Chains::with_buckets(bucket_count)?,
            strategies,
            policy,
            reentrancy: DebugReentrancy::new(),
        })
    }

    #[inline]
    fn bucket_of(&self, key: &K) -> usize {
        bucket_index((self.strategies.hash)(key), self.chains.bucket_count())
    }

    #[inline]
    fn ideal_target(&self) -> usize {
        ideal_bucket_count(self.chains.len(), self.policy.ideal_ratio())
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.len() == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.chains.bucket_count()
    }

    /// Inserts or overwrites.
    ///
    /// If a stored key compares equal to `key`, both stored key and value
    /// are replaced and the old ones released; the size is unchanged. A
    /// replaced item that is the very handle now stored (identity tables
    /// only) is dropped without reaching the hooks. Otherwise a new entry
    /// heads its bucket's chain and the upper rehash threshold is checked.
    ///
    /// Fails with [`Error::Allocation`] if no entry can be allocated; the
    /// table is then unchanged and `key`/`value` go to the release hooks.
    pub fn put(&mut self, key: K, value: V) -> Result<()> {
        let (released, outcome) = {
            let _busy = self.reentrancy.enter();
            let bucket = self.bucket_of(&key);
            match self.chains.find(bucket, &key, &*self.strategies.key_eq) {
                Some(slot) => {
                    let (old_key, old_value) = self.chains.replace(slot, key, value);
                    (self.displaced(slot, old_key, old_value), Ok(()))
                }
                None => match self.chains.push_front(bucket, key, value) {
                    Ok(_) => {
                        if self
                            .policy
                            .should_grow(self.chains.len(), self.chains.bucket_count())
                        {
                            let target = self.ideal_target();
                            resize(&mut self.chains, &*self.strategies.hash, target);
                        }
                        ((None, None), Ok(()))
                    }
                    Err((key, value)) => {
                        log::warn!("entry arena exhausted at {} entries", self.chains.len());
                        ((Some(key), Some(value)), Err(Error::Allocation))
                    }
                },
            }
        };

        let (old_key, old_value) = released;
        if let Some(old_key) = old_key {
            self.strategies.release_key(old_key);
        }
        if let Some(old_value) = old_value {
            self.strategies.release_value(old_value);
        }
        outcome
    }

    /// Filters an overwritten pair down to what must be released. Items that
    /// are the same handle as the one now stored are dropped here.
    fn displaced(&self, slot: DefaultKey, old_key: K, old_value: V) -> (Option<K>, Option<V>) {
        let Some(stored) = self.chains.entry(slot) else {
            return (Some(old_key), Some(old_value));
        };
        let key = (!self.strategies.is_same_key(&old_key, &stored.key)).then_some(old_key);
        let value =
            (!self.strategies.is_same_value(&old_value, &stored.value)).then_some(old_value);
        (key, value)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let _busy = self.reentrancy.enter();
        let slot = self
            .chains
            .find(self.bucket_of(key), key, &*self.strategies.key_eq)?;
        self.chains.entry(slot).map(|e| &e.value)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let _busy = self.reentrancy.enter();
        let slot = self
            .chains
            .find(self.bucket_of(key), key, &*self.strategies.key_eq)?;
        self.chains.entry_mut(slot).map(|e| &mut e.value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Linear scan of every chain with the value comparator.
    pub fn contains_value(&self, value: &V) -> bool {
        let _busy = self.reentrancy.enter();
        self.chains.any_value(value, &*self.strategies.value_eq)
    }

    /// Unlinks the entry for `key` and hands its key and value back to the
    /// caller; release hooks are not invoked. Checks the lower rehash
    /// threshold afterwards.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let _busy = self.reentrancy.enter();
        let bucket = self.bucket_of(key);
        let removed = self
            .chains
            .unlink(bucket, key, &*self.strategies.key_eq)?;
        if self
            .policy
            .should_shrink(self.chains.len(), self.chains.bucket_count())
        {
            let target = self.ideal_target();
            resize(&mut self.chains, &*self.strategies.hash, target);
        }
        Some(removed)
    }

    /// Removes `key` and releases its key and value. Returns whether an
    /// entry was removed; a missing key is a no-op.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.remove_entry(key) {
            Some((old_key, old_value)) => {
                self.strategies.release_key(old_key);
                self.strategies.release_value(old_value);
                true
            }
            None => false,
        }
    }

    /// Releases every entry and shrinks the array to
    /// [`POST_CLEAR_BUCKETS`].
    pub fn remove_all(&mut self) {
        let _busy = self.reentrancy.enter();
        let cleared = self.chains.len();
        for (key, value) in self.chains.drain() {
            self.strategies.release_key(key);
            self.strategies.release_value(value);
        }
        resize(&mut self.chains, &*self.strategies.hash, POST_CLEAR_BUCKETS);
        log::debug!("cleared {cleared} entries");
    }

    /// Resizes to `bucket_count` buckets, or to the ideal count for the
    /// current size when `bucket_count` is zero. A request for the current
    /// count is a no-op; if the new array cannot be allocated the table
    /// stays as it is.
    pub fn rehash(&mut self, bucket_count: usize) {
        let _busy = self.reentrancy.enter();
        let target = if bucket_count == 0 {
            self.ideal_target()
        } else {
            bucket_count
        };
        resize(&mut self.chains, &*self.strategies.hash, target);
    }

    pub fn set_key_comparison(&mut self, key_eq: KeyCompare<K>) {
        let _busy = self.reentrancy.enter();
        self.strategies.key_eq = key_eq;
    }

    pub fn set_value_comparison(&mut self, value_eq: ValueCompare<V>) {
        let _busy = self.reentrancy.enter();
        self.strategies.value_eq = value_eq;
    }

    /// Installs a new hash function and moves every entry to the bucket it
    /// hashes to under it. The bucket count is unchanged.
    pub fn set_hash_function(&mut self, hash: HashFn<K>) {
        let _busy = self.reentrancy.enter();
        self.strategies.hash = hash;
        self.chains.reindex(&*self.strategies.hash);
    }

    /// Replaces both release hooks; `None` means released items are dropped.
    pub fn set_release_functions(
        &mut self,
        release_key: Option<ReleaseFn<K>>,
        release_value: Option<ReleaseFn<V>>,
    ) {
        let _busy = self.reentrancy.enter();
        self.strategies.set_release(release_key, release_value);
    }

    pub fn rehash_policy(&self) -> RehashPolicy {
        self.policy
    }

    /// Takes effect at the next insert or removal.
    pub fn set_rehash_policy(&mut self, policy: RehashPolicy) {
        log::debug!("rehash policy set to {policy:?}");
        self.policy = policy;
    }
}

impl<K, V> Drop for HashTable<K, V> {
    fn drop(&mut self) {
        if !self.strategies.has_release() {
            return;
        }
        for (key, value) in self.chains.drain() {
            self.strategies.release_key(key);
            self.strategies.release_value(value);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for HashTable<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
