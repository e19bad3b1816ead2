//! Bucket array and collision chains.
//!
//! Entries live in a generational arena; a bucket holds the arena key of
//! its chain head and every entry links to the next one. Relinking arena
//! keys is all a rehash does, so keys and values never move in memory
//! while the table resizes.
//!
//! `Chains` knows nothing about strategies; callers pass the comparator or
//! hash function they want applied.

use crate::error::{Error, Result};
use core::sync::atomic::{AtomicU64, Ordering::Relaxed};
use slotmap::{DefaultKey, SlotMap};

static NEXT_TABLE_ID: AtomicU64 = AtomicU64::new(0);

/// Arena key of the next entry in a chain, `None` at the end.
pub(crate) type Link = Option<DefaultKey>;

/// The arena addresses entries with 32-bit indices.
const MAX_ENTRIES: usize = (u32::MAX - 1) as usize;

#[derive(Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) next: Link,
}

pub(crate) struct Chains<K, V> {
    buckets: Vec<Link>,
    slots: SlotMap<DefaultKey, Entry<K, V>>,
    // Unique per instance; cursors from another table are rejected by it.
    id: u64,
    // Bumped by every structural change; cursors compare against it.
    generation: u64,
    max_entries: usize,
}

#[inline]
pub(crate) fn bucket_index(hash: u64, bucket_count: usize) -> usize {
    // The remainder is below `bucket_count`, so it fits back into usize.
    (hash % bucket_count as u64) as usize
}

fn alloc_buckets(count: usize) -> Result<Vec<Link>> {
    let mut buckets = Vec::new();
    buckets
        .try_reserve_exact(count)
        .map_err(|_| Error::Allocation)?;
    buckets.resize(count, None);
    Ok(buckets)
}

impl<K, V> Chains<K, V> {
    pub(crate) fn with_buckets(count: usize) -> Result<Self> {
        debug_assert!(count > 0);
        Ok(Self {
            buckets: alloc_buckets(count)?,
            slots: SlotMap::new(),
            id: NEXT_TABLE_ID.fetch_add(1, Relaxed),
            generation: 0,
            max_entries: MAX_ENTRIES,
        })
    }

    /// Lowers the entry limit so exhaustion can be reached in tests.
    #[cfg(test)]
    pub(crate) fn limit_entries(&mut self, max_entries: usize) {
        self.max_entries = max_entries.min(MAX_ENTRIES);
    }

    #[inline]
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    fn bump(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    #[inline]
    pub(crate) fn head(&self, bucket: usize) -> Link {
        self.buckets.get(bucket).copied().flatten()
    }

    #[inline]
    pub(crate) fn entry(&self, slot: DefaultKey) -> Option<&Entry<K, V>> {
        self.slots.get(slot)
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self, slot: DefaultKey) -> Option<&mut Entry<K, V>> {
        self.slots.get_mut(slot)
    }

    /// Walks the chain of `bucket` and returns the first entry whose key
    /// `eq` accepts.
    pub(crate) fn find(&self, bucket: usize, key: &K, eq: &dyn Fn(&K, &K) -> bool) -> Link {
        let mut link = self.head(bucket);
        while let Some(slot) = link {
            let entry = &self.slots[slot];
            if eq(key, &entry.key) {
                return Some(slot);
            }
            link = entry.next;
        }
        None
    }

    /// Whether any entry in any chain holds a value `eq` accepts.
    pub(crate) fn any_value(&self, value: &V, eq: &dyn Fn(&V, &V) -> bool) -> bool {
        self.buckets.iter().any(|&head| {
            let mut link = head;
            while let Some(slot) = link {
                let entry = &self.slots[slot];
                if eq(value, &entry.value) {
                    return true;
                }
                link = entry.next;
            }
            false
        })
    }

    /// Swaps key and value of a live entry, returning the previous pair.
    pub(crate) fn replace(&mut self, slot: DefaultKey, key: K, value: V) -> (K, V) {
        let entry = &mut self.slots[slot];
        let old_key = core::mem::replace(&mut entry.key, key);
        let old_value = core::mem::replace(&mut entry.value, value);
        self.bump();
        (old_key, old_value)
    }

    /// Allocates an entry and makes it the head of `bucket`'s chain.
    ///
    /// On failure nothing is modified and the pair is handed back.
    pub(crate) fn push_front(
        &mut self,
        bucket: usize,
        key: K,
        value: V,
    ) -> core::result::Result<DefaultKey, (K, V)> {
        if self.slots.len() >= self.max_entries {
            return Err((key, value));
        }
        let next = self.head(bucket);
        let slot = self.slots.insert(Entry { key, value, next });
        self.buckets[bucket] = Some(slot);
        self.bump();
        Ok(slot)
    }

    /// Unlinks the entry matching `key` from `bucket`'s chain and frees it.
    pub(crate) fn unlink(
        &mut self,
        bucket: usize,
        key: &K,
        eq: &dyn Fn(&K, &K) -> bool,
    ) -> Option<(K, V)> {
        let mut prev: Link = None;
        let mut link = self.head(bucket);
        while let Some(slot) = link {
            let entry = &self.slots[slot];
            if eq(key, &entry.key) {
                let next = entry.next;
                match prev {
                    Some(p) => self.slots[p].next = next,
                    None => self.buckets[bucket] = next,
                }
                let removed = self.slots.remove(slot)?;
                self.bump();
                return Some((removed.key, removed.value));
            }
            prev = link;
            link = entry.next;
        }
        None
    }

    /// Moves every entry into a fresh array of `target` buckets, placing
    /// each at `hash(key) % target`. Entries are relinked, not reallocated.
    ///
    /// If the new array cannot be allocated the chains are left untouched.
    pub(crate) fn redistribute(&mut self, target: usize, hash: &dyn Fn(&K) -> u64) -> Result<()> {
        debug_assert!(target > 0);
        let fresh = alloc_buckets(target)?;
        let old = core::mem::replace(&mut self.buckets, fresh);
        for head in old {
            let mut link = head;
            while let Some(slot) = link {
                let entry = &mut self.slots[slot];
                link = entry.next;
                let index = bucket_index(hash(&entry.key), target);
                entry.next = self.buckets[index];
                self.buckets[index] = Some(slot);
            }
        }
        self.bump();
        Ok(())
    }

    /// Re-places every entry under `hash` without changing the bucket
    /// count. Needs no allocation: all chains are first threaded onto one
    /// list, then dealt back out.
    pub(crate) fn reindex(&mut self, hash: &dyn Fn(&K) -> u64) {
        let count = self.buckets.len();
        let mut pending: Link = None;
        for bucket in self.buckets.iter_mut() {
            let mut link = bucket.take();
            while let Some(slot) = link {
                let entry = &mut self.slots[slot];
                link = entry.next;
                entry.next = pending;
                pending = Some(slot);
            }
        }
        while let Some(slot) = pending {
            let entry = &mut self.slots[slot];
            pending = entry.next;
            let index = bucket_index(hash(&entry.key), count);
            entry.next = self.buckets[index];
            self.buckets[index] = Some(slot);
        }
        self.bump();
    }

    /// Empties every chain, yielding the owned pairs. The bucket count is
    /// unchanged.
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = (K, V)> + '_ {
        self.buckets.iter_mut().for_each(|b| *b = None);
        self.bump();
        self.slots.drain().map(|(_, e)| (e.key, e.value))
    }

    /// First entry at or after `bucket`, starting with `link` in that
    /// bucket and continuing with the heads of the following buckets.
    pub(crate) fn seek(&self, mut bucket: usize, mut link: Link) -> Option<(usize, DefaultKey)> {
        loop {
            if let Some(slot) = link {
                return Some((bucket, slot));
            }
            bucket += 1;
            link = *self.buckets.get(bucket)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eq(a: &u64, b: &u64) -> bool {
        a == b
    }

    fn identity(k: &u64) -> u64 {
        *k
    }

    fn chain_keys(c: &Chains<u64, &'static str>, bucket: usize) -> Vec<u64> {
        let mut out = Vec::new();
        let mut link = c.head(bucket);
        while let Some(slot) = link {
            let e = c.entry(slot).unwrap();
            out.push(e.key);
            link = e.next;
        }
        out
    }

    /// Invariant: new entries become the chain head (most recent first).
    #[test]
    fn push_front_prepends() {
        let mut c: Chains<u64, &str> = Chains::with_buckets(3).unwrap();
        for k in [0, 3, 6] {
            c.push_front(bucket_index(k, 3), k, "v").unwrap();
        }
        assert_eq!(chain_keys(&c, 0), vec![6, 3, 0]);
        assert_eq!(c.len(), 3);
        assert!(c.head(1).is_none());
    }

    /// Invariant: unlinking patches the predecessor for inner entries and the
    /// bucket head for the first entry.
    #[test]
    fn unlink_head_middle_and_tail() {
        let mut c: Chains<u64, &str> = Chains::with_buckets(1).unwrap();
        for k in [1, 2, 3, 4] {
            c.push_front(0, k, "v").unwrap();
        }
        assert_eq!(c.unlink(0, &3, &eq), Some((3, "v")));
        assert_eq!(chain_keys(&c, 0), vec![4, 2, 1]);
        assert_eq!(c.unlink(0, &4, &eq), Some((4, "v")));
        assert_eq!(chain_keys(&c, 0), vec![2, 1]);
        assert_eq!(c.unlink(0, &1, &eq), Some((1, "v")));
        assert_eq!(chain_keys(&c, 0), vec![2]);
        assert_eq!(c.unlink(0, &9, &eq), None);
        assert_eq!(c.len(), 1);
    }

    /// Invariant: after redistribution every entry sits in
    /// `hash(key) % new_count`, and no entry is lost.
    #[test]
    fn redistribute_places_by_new_count() {
        let mut c: Chains<u64, &str> = Chains::with_buckets(2).unwrap();
        for k in 0..20 {
            c.push_front(bucket_index(k, 2), k, "v").unwrap();
        }
        c.redistribute(7, &identity).unwrap();
        assert_eq!(c.bucket_count(), 7);
        assert_eq!(c.len(), 20);
        let mut total = 0;
        for b in 0..7 {
            for k in chain_keys(&c, b) {
                assert_eq!(bucket_index(k, 7), b);
                total += 1;
            }
        }
        assert_eq!(total, 20);
    }

    /// Invariant: arena keys survive redistribution, so entries are moved by
    /// relinking rather than reallocated.
    #[test]
    fn redistribute_keeps_arena_slots() {
        let mut c: Chains<u64, &str> = Chains::with_buckets(1).unwrap();
        let slot = c.push_front(0, 42, "answer").unwrap();
        c.redistribute(11, &identity).unwrap();
        assert_eq!(c.find(bucket_index(42, 11), &42, &eq), Some(slot));
        assert_eq!(c.entry(slot).map(|e| e.value), Some("answer"));
    }

    #[test]
    fn generation_tracks_structural_changes() {
        let mut c: Chains<u64, &str> = Chains::with_buckets(5).unwrap();
        let g0 = c.generation();
        let slot = c.push_front(0, 5, "a").unwrap();
        let g1 = c.generation();
        assert_ne!(g0, g1);
        let _ = c.replace(slot, 5, "b");
        let g2 = c.generation();
        assert_ne!(g1, g2);
        assert!(c.find(0, &5, &eq).is_some());
        assert_eq!(c.generation(), g2, "lookups must not bump the generation");
        c.redistribute(3, &identity).unwrap();
        assert_ne!(c.generation(), g2);
    }

    #[test]
    fn reindex_follows_new_hash() {
        let mut c: Chains<u64, &str> = Chains::with_buckets(5).unwrap();
        for k in 0..12 {
            c.push_front(bucket_index(k, 5), k, "v").unwrap();
        }
        let doubled = |k: &u64| k * 2;
        c.reindex(&doubled);
        assert_eq!(c.bucket_count(), 5);
        assert_eq!(c.len(), 12);
        for b in 0..5 {
            for k in chain_keys(&c, b) {
                assert_eq!(bucket_index(k * 2, 5), b);
            }
        }
    }

    /// Invariant: at the entry limit push_front hands the pair back and
    /// leaves chains and generation as they were.
    #[test]
    fn push_front_at_limit_returns_pair() {
        let mut c: Chains<u64, &str> = Chains::with_buckets(3).unwrap();
        c.limit_entries(1);
        c.push_front(0, 0, "kept").unwrap();
        let g = c.generation();
        assert_eq!(c.push_front(1, 1, "rejected"), Err((1, "rejected")));
        assert_eq!(c.len(), 1);
        assert!(c.head(1).is_none());
        assert_eq!(c.generation(), g);
    }

    #[test]
    fn every_instance_gets_its_own_id() {
        let a: Chains<u64, &str> = Chains::with_buckets(1).unwrap();
        let b: Chains<u64, &str> = Chains::with_buckets(1).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn drain_empties_all_buckets() {
        let mut c: Chains<u64, &str> = Chains::with_buckets(4).unwrap();
        for k in 0..9 {
            c.push_front(bucket_index(k, 4), k, "v").unwrap();
        }
        let mut drained: Vec<u64> = c.drain().map(|(k, _)| k).collect();
        drained.sort_unstable();
        assert_eq!(drained, (0..9).collect::<Vec<_>>());
        assert_eq!(c.len(), 0);
        assert_eq!(c.bucket_count(), 4);
        assert!(c.seek(0, c.head(0)).is_none());
    }

    #[test]
    fn seek_skips_empty_buckets() {
        let mut c: Chains<u64, &str> = Chains::with_buckets(6).unwrap();
        let s = c.push_front(4, 4, "v").unwrap();
        assert_eq!(c.seek(0, c.head(0)), Some((4, s)));
        assert_eq!(c.seek(4, None), None);
    }

    #[test]
    fn any_value_scans_every_chain() {
        let mut c: Chains<u64, &str> = Chains::with_buckets(3).unwrap();
        c.push_front(2, 2, "two").unwrap();
        c.push_front(0, 0, "zero").unwrap();
        let veq = |a: &&'static str, b: &&'static str| a == b;
        assert!(c.any_value(&"two", &veq));
        assert!(!c.any_value(&"three", &veq));
    }
}
