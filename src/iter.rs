//! Traversal: the explicit cursor protocol and a borrowing iterator.
//!
//! Both walk buckets in ascending index order and each chain from its head,
//! so within a bucket the most recently inserted entry comes first. The
//! order is not insertion order and changes with every put, remove or
//! rehash.

use crate::chain::Chains;
use crate::hash_table::HashTable;
use core::iter::FusedIterator;
use slotmap::DefaultKey;

/// Position of one entry in a specific table's bucket array.
///
/// A cursor does not borrow the table. It is only valid until the table's
/// next structural change (put, remove, rehash, clear, hash-function
/// change); advancing a cursor past that point, or in another table,
/// panics.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Cursor {
    table: u64,
    bucket: usize,
    slot: DefaultKey,
    generation: u64,
}

impl Cursor {
    /// Index of the bucket the cursor is in.
    pub fn bucket(&self) -> usize {
        self.bucket
    }
}

impl<K, V> HashTable<K, V> {
    fn position(&self, bucket: usize, slot: DefaultKey) -> Option<(Cursor, &K, &V)> {
        let entry = self.chains.entry(slot)?;
        let cursor = Cursor {
            table: self.chains.id(),
            bucket,
            slot,
            generation: self.chains.generation(),
        };
        Some((cursor, &entry.key, &entry.value))
    }

    /// Cursor at the head of the first non-empty bucket, with that entry's
    /// key and value. `None` if the table is empty.
    pub fn first(&self) -> Option<(Cursor, &K, &V)> {
        let _busy = self.reentrancy.enter();
        let (bucket, slot) = self.chains.seek(0, self.chains.head(0))?;
        self.position(bucket, slot)
    }

    /// Advances `cursor` to the next entry of its chain, or to the head of
    /// the next non-empty bucket. `None` once every bucket is exhausted.
    ///
    /// Panics if the table changed structurally since `cursor` was produced
    /// or if `cursor` came from another table.
    pub fn next(&self, cursor: Cursor) -> Option<(Cursor, &K, &V)> {
        let _busy = self.reentrancy.enter();
        assert_eq!(
            cursor.table,
            self.chains.id(),
            "cursor does not belong to this table"
        );
        assert_eq!(
            cursor.generation,
            self.chains.generation(),
            "cursor used after its table was modified"
        );
        let Some(entry) = self.chains.entry(cursor.slot) else {
            panic!("cursor does not belong to this table");
        };
        let (bucket, slot) = self.chains.seek(cursor.bucket, entry.next)?;
        self.position(bucket, slot)
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            chains: &self.chains,
            at: self.chains.seek(0, self.chains.head(0)),
            remaining: self.chains.len(),
        }
    }
}

/// Iterator over `(&K, &V)` in bucket order.
pub struct Iter<'a, K, V> {
    chains: &'a Chains<K, V>,
    at: Option<(usize, DefaultKey)>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let (bucket, slot) = self.at?;
        let entry = self.chains.entry(slot)?;
        self.at = self.chains.seek(bucket, entry.next);
        self.remaining = self.remaining.saturating_sub(1);
        Some((&entry.key, &entry.value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<'a, K, V> IntoIterator for &'a HashTable<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
