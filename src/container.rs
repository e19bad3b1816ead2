//! Container facade: one operation set for every container kind.
//!
//! Callers that should not care which concrete container they hold keep a
//! [`ContainerHandle`] and go through [`Container`]. Dispatch is resolved by
//! the concrete type behind the box; there is no shared operation table.

use crate::error::{Error, Result};
use crate::hash_table::HashTable;
use crate::iter::Cursor;
use crate::strategy::{HashFn, KeyCompare, ReleaseFn, ValueCompare};

/// Concrete kinds a [`ContainerHandle`] may wrap.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum ContainerKind {
    HashTable,
}

/// Owned, type-erased container.
pub type ContainerHandle<K, V> = Box<dyn Container<K, V>>;

/// Operations every container kind exposes.
///
/// Semantics follow [`HashTable`]'s inherent methods of the same name;
/// `size` is `len` and `clear` is `remove_all`.
pub trait Container<K, V> {
    fn kind(&self) -> ContainerKind;

    /// Duplicates the container. No current kind supports this; callers get
    /// [`Error::Unsupported`] and must not rely on cloning.
    fn try_clone(&self) -> Result<ContainerHandle<K, V>>;

    /// Destroys the container, releasing every entry.
    fn release(self: Box<Self>);

    fn clear(&mut self);

    fn contains_key(&self, key: &K) -> bool;

    fn contains_value(&self, value: &V) -> bool;

    fn put(&mut self, key: K, value: V) -> Result<()>;

    fn get(&self, key: &K) -> Option<&V>;

    fn remove(&mut self, key: &K) -> bool;

    fn is_empty(&self) -> bool;

    fn size(&self) -> usize;

    fn bucket_count(&self) -> usize;

    fn rehash(&mut self, bucket_count: usize);

    fn first(&self) -> Option<(Cursor, &K, &V)>;

    fn next(&self, cursor: Cursor) -> Option<(Cursor, &K, &V)>;

    fn set_key_comparison(&mut self, key_eq: KeyCompare<K>);

    fn set_value_comparison(&mut self, value_eq: ValueCompare<V>);

    fn set_hash_function(&mut self, hash: HashFn<K>);

    fn set_release_functions(
        &mut self,
        release_key: Option<ReleaseFn<K>>,
        release_value: Option<ReleaseFn<V>>,
    );
}

impl<K, V> Container<K, V> for HashTable<K, V> {
    fn kind(&self) -> ContainerKind {
        ContainerKind::HashTable
    }

    fn try_clone(&self) -> Result<ContainerHandle<K, V>> {
        Err(Error::Unsupported { operation: "clone" })
    }

    fn release(self: Box<Self>) {
        drop(self);
    }

    fn clear(&mut self) {
        HashTable::remove_all(self);
    }

    fn contains_key(&self, key: &K) -> bool {
        HashTable::contains_key(self, key)
    }

    fn contains_value(&self, value: &V) -> bool {
        HashTable::contains_value(self, value)
    }

    fn put(&mut self, key: K, value: V) -> Result<()> {
        HashTable::put(self, key, value)
    }

    fn get(&self, key: &K) -> Option<&V> {
        HashTable::get(self, key)
    }

    fn remove(&mut self, key: &K) -> bool {
        HashTable::remove(self, key)
    }

    fn is_empty(&self) -> bool {
        HashTable::is_empty(self)
    }

    fn size(&self) -> usize {
        HashTable::len(self)
    }

    fn bucket_count(&self) -> usize {
        HashTable::bucket_count(self)
    }

    fn rehash(&mut self, bucket_count: usize) {
        HashTable::rehash(self, bucket_count);
    }

    fn first(&self) -> Option<(Cursor, &K, &V)> {
        HashTable::first(self)
    }

    fn next(&self, cursor: Cursor) -> Option<(Cursor, &K, &V)> {
        HashTable::next(self, cursor)
    }

    fn set_key_comparison(&mut self, key_eq: KeyCompare<K>) {
        HashTable::set_key_comparison(self, key_eq);
    }

    fn set_value_comparison(&mut self, value_eq: ValueCompare<V>) {
        HashTable::set_value_comparison(self, value_eq);
    }

    fn set_hash_function(&mut self, hash: HashFn<K>) {
        HashTable::set_hash_function(self, hash);
    }

    fn set_release_functions(
        &mut self,
        release_key: Option<ReleaseFn<K>>,
        release_value: Option<ReleaseFn<V>>,
    ) {
        HashTable::set_release_functions(self, release_key, release_value);
    }
}
