//! Construction of type-erased containers.

use crate::config::HashTableBuilder;
use crate::container::{ContainerHandle, ContainerKind};
use crate::error::Result;
use crate::hash_table::HashTable;
use crate::strategy::Address;

/// Hash table with identity strategies behind a [`ContainerHandle`].
/// Panics if `bucket_count` is zero.
pub fn new_hash_table<K, V>(bucket_count: usize) -> Result<ContainerHandle<K, V>>
where
    K: Address + 'static,
    V: Address + 'static,
{
    Ok(Box::new(HashTable::new(bucket_count)?))
}

/// Hash table configured by `builder` behind a [`ContainerHandle`].
pub fn new_hash_table_with<K, V>(builder: HashTableBuilder<K, V>) -> Result<ContainerHandle<K, V>>
where
    K: 'static,
    V: 'static,
{
    Ok(Box::new(builder.build()?))
}

/// Container of the requested kind with default strategies.
pub fn new_container<K, V>(kind: ContainerKind, bucket_count: usize) -> Result<ContainerHandle<K, V>>
where
    K: Address + 'static,
    V: Address + 'static,
{
    match kind {
        ContainerKind::HashTable => new_hash_table(bucket_count),
    }
}
