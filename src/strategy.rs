//! Comparison, hashing and release strategies.
//!
//! A table never assumes anything about its keys and values beyond what its
//! strategies tell it. The defaults treat keys and values as opaque handles:
//! two handles are equal iff they point at the same place, and the hash is
//! derived from that address. Tables keyed by content (strings, integers)
//! swap in [`content_eq`] and [`content_hash`].

use core::hash::{BuildHasher, Hash};
use core::ptr::NonNull;
use hashbrown::hash_map::DefaultHashBuilder;
use std::rc::Rc;
use std::sync::Arc;

/// Key equality; `true` means the two keys are the same key.
pub type KeyCompare<K> = Box<dyn Fn(&K, &K) -> bool>;

/// Value equality, used by `contains_value`.
pub type ValueCompare<V> = Box<dyn Fn(&V, &V) -> bool>;

/// Hash function; the bucket index is `hash(key) % bucket_count`.
pub type HashFn<K> = Box<dyn Fn(&K) -> u64>;

/// Receives a key or value the table no longer holds.
pub type ReleaseFn<T> = Box<dyn FnMut(T)>;

/// A pointer-like handle with a stable address.
///
/// The address must not change while the handle is stored in a table, so
/// moving the handle itself (e.g. on rehash) is fine but the referent must
/// stay put. Dropping a `&'static T` or an `Rc<T>` clone never frees the
/// referent, which makes these the non-owning way to store keys.
pub trait Address {
    fn address(&self) -> usize;
}

impl<T: ?Sized> Address for &T {
    #[inline]
    fn address(&self) -> usize {
        (*self as *const T).cast::<()>() as usize
    }
}

impl<T: ?Sized> Address for Box<T> {
    #[inline]
    fn address(&self) -> usize {
        (&**self as *const T).cast::<()>() as usize
    }
}

impl<T: ?Sized> Address for Rc<T> {
    #[inline]
    fn address(&self) -> usize {
        Rc::as_ptr(self).cast::<()>() as usize
    }
}

impl<T: ?Sized> Address for Arc<T> {
    #[inline]
    fn address(&self) -> usize {
        Arc::as_ptr(self).cast::<()>() as usize
    }
}

impl<T: ?Sized> Address for NonNull<T> {
    #[inline]
    fn address(&self) -> usize {
        self.as_ptr().cast::<()>() as usize
    }
}

/// Identity comparison: equal iff both handles share an address.
pub fn pointer_eq<T: Address + 'static>() -> Box<dyn Fn(&T, &T) -> bool> {
    Box::new(|a: &T, b: &T| a.address() == b.address())
}

/// Address-derived hash. The low four bits are dropped since heap
/// addresses are aligned and would otherwise cluster into few buckets.
pub fn pointer_hash<K: Address + 'static>() -> HashFn<K> {
    Box::new(|k: &K| (k.address() >> 4) as u64)
}

/// Equality by content via `PartialEq`.
pub fn content_eq<T: PartialEq + 'static>() -> Box<dyn Fn(&T, &T) -> bool> {
    Box::new(|a: &T, b: &T| a == b)
}

/// Hash by content via `Hash`, using hashbrown's default hasher. The builder
/// is captured by the returned function, so equal content hashes equally for
/// as long as the function is installed.
pub fn content_hash<K: Hash + 'static>() -> HashFn<K> {
    let state = DefaultHashBuilder::default();
    Box::new(move |k: &K| state.hash_one(k))
}

/// The complete strategy set of a table.
pub(crate) struct Strategies<K, V> {
    pub(crate) key_eq: KeyCompare<K>,
    pub(crate) value_eq: ValueCompare<V>,
    pub(crate) hash: HashFn<K>,
    // Handle identity; an overwrite with the stored handle releases nothing.
    same_key: Option<KeyCompare<K>>,
    same_value: Option<ValueCompare<V>>,
    release_key: Option<ReleaseFn<K>>,
    release_value: Option<ReleaseFn<V>>,
}

impl<K, V> Strategies<K, V> {
    pub(crate) fn new(key_eq: KeyCompare<K>, value_eq: ValueCompare<V>, hash: HashFn<K>) -> Self {
        Self {
            key_eq,
            value_eq,
            hash,
            same_key: None,
            same_value: None,
            release_key: None,
            release_value: None,
        }
    }

    pub(crate) fn set_identity(
        &mut self,
        same_key: Option<KeyCompare<K>>,
        same_value: Option<ValueCompare<V>>,
    ) {
        self.same_key = same_key;
        self.same_value = same_value;
    }

    /// Whether `a` and `b` are the same handle, not merely equal keys.
    pub(crate) fn is_same_key(&self, a: &K, b: &K) -> bool {
        self.same_key.as_ref().is_some_and(|same| same(a, b))
    }

    pub(crate) fn is_same_value(&self, a: &V, b: &V) -> bool {
        self.same_value.as_ref().is_some_and(|same| same(a, b))
    }

    pub(crate) fn set_release(
        &mut self,
        release_key: Option<ReleaseFn<K>>,
        release_value: Option<ReleaseFn<V>>,
    ) {
        self.release_key = release_key;
        self.release_value = release_value;
    }

    pub(crate) fn has_release(&self) -> bool {
        self.release_key.is_some() || self.release_value.is_some()
    }

    /// Hands a key the table no longer holds to its hook, or drops it.
    pub(crate) fn release_key(&mut self, key: K) {
        match self.release_key.as_mut() {
            Some(f) => f(key),
            None => drop(key),
        }
    }

    pub(crate) fn release_value(&mut self, value: V) {
        match self.release_value.as_mut() {
            Some(f) => f(value),
            None => drop(value),
        }
    }
}
