/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

The reference-identity map. Keys are runtime
object identities (pointer addresses of `Rc`/`Arc` allocations), never
structural equality, so two distinct-but-equal values are never conflated
and a single shared allocation is never copied twice.

*/

use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

/// A key identifying an `Rc`/`Arc` allocation by its address rather than by
/// the value it points to.
///
/// Two [`RefKey`]s compare equal iff they were derived from the same
/// allocation, regardless of whether the pointees are structurally equal —
/// this is pointer-identity semantics: keys are references
/// compared by pointer identity, never by structural equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RefKey(usize);

impl RefKey {
    /// Builds a key from an `Rc`'s backing allocation.
    pub fn of_rc<T: ?Sized>(rc: &Rc<T>) -> Self {
        RefKey(Rc::as_ptr(rc) as *const () as usize)
    }

    /// Builds a key from an `Arc`'s backing allocation.
    pub fn of_arc<T: ?Sized>(arc: &Arc<T>) -> Self {
        RefKey(Arc::as_ptr(arc) as *const () as usize)
    }
}

/// Maps original allocations to their copies, for the duration of a single
/// top-level [`crate::copy`] call.
///
/// Invariant: at most one copy is ever recorded per original; once
/// recorded, the mapping is stable for the remainder of the call.
#[derive(Default)]
pub struct IdentityMap {
    entries: HashMap<RefKey, Rc<dyn Any>>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a previously recorded copy for `key`, if any.
    pub fn get(&self, key: RefKey) -> Option<&Rc<dyn Any>> {
        self.entries.get(&key)
    }

    /// Records the copy for `key`. Must be called at most once per key
    /// within a call; callers register identity *before* recursing into the
    /// pointee so that re-entrant lookups during a cycle observe the
    /// (possibly still-being-populated) copy.
    pub fn insert(&mut self, key: RefKey, copy: Rc<dyn Any>) {
        debug_assert!(
            !self.entries.contains_key(&key),
            "identity map invariant violated: {key:?} copied twice in one call"
        );
        self.entries.insert(key, copy);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// The `Arc` analogue of [`IdentityMap`], kept as a separate map (rather
/// than unifying storage) because an `Arc<dyn Any>` must additionally be
/// `Send + Sync` to be useful across threads, a bound `Rc<dyn Any>` cannot
/// satisfy.
#[derive(Default)]
pub struct ArcIdentityMap {
    entries: HashMap<RefKey, Arc<dyn Any + Send + Sync>>,
}

impl ArcIdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: RefKey) -> Option<&Arc<dyn Any + Send + Sync>> {
        self.entries.get(&key)
    }

    pub fn insert(&mut self, key: RefKey, copy: Arc<dyn Any + Send + Sync>) {
        debug_assert!(
            !self.entries.contains_key(&key),
            "identity map invariant violated: {key:?} copied twice in one call"
        );
        self.entries.insert(key, copy);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_allocations_get_distinct_keys() {
        let a = Rc::new(1_i32);
        let b = Rc::new(1_i32);
        assert_ne!(RefKey::of_rc(&a), RefKey::of_rc(&b));
    }

    #[test]
    fn same_allocation_round_trips_through_clone() {
        let a = Rc::new(1_i32);
        let a2 = Rc::clone(&a);
        assert_eq!(RefKey::of_rc(&a), RefKey::of_rc(&a2));
    }

    #[test]
    fn insert_then_get_returns_same_allocation() {
        let mut map = IdentityMap::new();
        let original = Rc::new(42_i32);
        let copy: Rc<dyn Any> = Rc::new(43_i32);
        map.insert(RefKey::of_rc(&original), Rc::clone(&copy));
        let found = map.get(RefKey::of_rc(&original)).unwrap();
        assert_eq!(*found.clone().downcast::<i32>().unwrap(), 43);
    }

    #[test]
    #[should_panic(expected = "copied twice")]
    fn double_insert_violates_invariant() {
        let mut map = IdentityMap::new();
        let original = Rc::new(42_i32);
        map.insert(RefKey::of_rc(&original), Rc::new(1_i32) as Rc<dyn Any>);
        map.insert(RefKey::of_rc(&original), Rc::new(2_i32) as Rc<dyn Any>);
    }
}
