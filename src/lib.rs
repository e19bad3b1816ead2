//! chained-hashtable: a single-threaded, separately chained hash table with
//! pluggable comparison, hashing and release strategies, usable directly or
//! through a type-erased container facade.
//!
//! ```
//! use chained_hashtable::HashTable;
//!
//! let mut t: HashTable<String, u32> = HashTable::by_content(7).unwrap();
//! t.put("a".to_string(), 1).unwrap();
//! t.put("b".to_string(), 2).unwrap();
//! t.put("a".to_string(), 3).unwrap();
//! assert_eq!(t.len(), 2);
//! assert_eq!(t.get(&"a".to_string()), Some(&3));
//! ```
//!
//! Internal Design:
//!
//! Summary
//! - Layers, leaves first:
//!   - `sizing`: pure functions choosing a probable-prime bucket count for
//!     a target element-to-bucket ratio.
//!   - `chain`: the bucket array and its chains. Entries live in a
//!     generational arena; buckets hold chain heads and entries link to
//!     their successor. Knows nothing about strategies.
//!   - `HashTable`: applies the strategies and the rehash policy on top of
//!     the chains.
//!   - `iter`: index-based cursors and a borrowing iterator.
//!   - `Container`: the facade trait; `factory` builds boxed handles.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` (strategies are plain boxed closures,
//!   the reentrancy flag is a `Cell`). No locks, no atomics.
//! - Keys and values are compared and hashed only through strategies. The
//!   defaults treat them as opaque handles (address identity, address
//!   hash); content-keyed tables install `Eq`/`Hash` strategies.
//! - Unique keys: `put` on an existing key overwrites key and value.
//! - Bucket placement: every entry sits in `hash(key) % bucket_count` under
//!   the current hash function and bucket count. Rehash and hash-function
//!   changes restore this before returning.
//!
//! Ownership
//! - The table owns keys and values. Anything it lets go of (overwritten,
//!   removed, cleared, or still stored when the table drops) goes to the
//!   release hooks if set, otherwise it is dropped. To leave ownership with
//!   the caller, store non-owning handles (`&'static T`, `Rc<T>` clones).
//! - `remove_entry` hands the pair back to the caller instead.
//! - Identity tables (`HashTable::new`) never release a handle that stays
//!   stored: putting the stored key or value again drops only the incoming
//!   duplicate.
//!
//! Failure model
//! - Allocation failure while creating a table or adding an entry returns
//!   `Error::Allocation` and leaves the table unchanged; a rejected entry's
//!   key and value go to the release hooks.
//! - Allocation failure while resizing is absorbed: the table keeps its
//!   current bucket array and stays fully valid.
//! - Contract violations (zero buckets, thresholds out of order, stale
//!   cursors) panic.
//! - Missing keys are ordinary results (`None`, `false`).
//! - `Container::try_clone` always reports `Error::Unsupported`.
//!
//! Reentrancy
//! - Every public table operation opens a debug-only busy section. A
//!   strategy callback that re-enters the same table panics in debug
//!   builds instead of observing half-relinked chains.
//!
//! Cursors
//! - A `Cursor` records the table's id, the bucket, the arena key and the
//!   generation, and does not borrow the table. Every structural change
//!   bumps the generation; advancing a stale cursor, or one from another
//!   table, panics rather than reading unrelated entries.

mod chain;
mod config;
mod container;
mod error;
mod factory;
mod hash_table;
mod iter;
mod reentrancy;
pub mod sizing;
pub mod strategy;

#[cfg(test)]
mod hash_table_proptest;

// Public surface
pub use config::{HashTableBuilder, RehashPolicy};
pub use container::{Container, ContainerHandle, ContainerKind};
pub use error::{Error, Result};
pub use factory::{new_container, new_hash_table, new_hash_table_with};
pub use hash_table::HashTable;
pub use iter::{Cursor, Iter};
