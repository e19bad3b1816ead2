//! Debug-only reentrancy guard.
//!
//! Every public table operation may call into user strategies (comparators,
//! the hash function). A strategy that reaches back into the same table
//! while chains are being walked or relinked would observe a half-updated
//! bucket array, so the table marks itself busy for the duration of each
//! operation. In debug builds a nested entry panics; in release builds the
//! guard compiles to nothing.

#[cfg(debug_assertions)]
use core::cell::Cell;
use core::marker::PhantomData;

/// Busy flag embedded in a table. Public operations open a section with
/// `let _busy = self.reentrancy.enter();`.
#[derive(Debug)]
pub(crate) struct DebugReentrancy {
    #[cfg(debug_assertions)]
    busy: Cell<bool>,
    // Tables are single-threaded; keep the flag !Send + !Sync.
    _nosend: PhantomData<*mut ()>,
}

impl DebugReentrancy {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            busy: Cell::new(false),
            _nosend: PhantomData,
        }
    }

    /// Marks the table busy until the returned guard drops.
    ///
    /// Panics in debug builds if the table is already busy.
    #[inline]
    pub(crate) fn enter(&self) -> Busy<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.busy.replace(true),
                "table re-entered from one of its own strategy callbacks"
            );
            Busy { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            Busy { _z: PhantomData }
        }
    }
}

impl Default for DebugReentrancy {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII section returned by [`DebugReentrancy::enter`].
pub(crate) struct Busy<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            debug_assert!(self.owner.busy.get());
            self.owner.busy.set(false);
        }
    }
}
