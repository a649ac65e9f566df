/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

The copy context. Wraps the identity maps and is the unit of state threaded
through a single top-level [`crate::copy`] call.

*/

use crate::identity::{ArcIdentityMap, IdentityMap, RefKey};
use std::any::Any;
use std::rc::Rc;
use std::sync::Arc;

/// Per-call state for a deep copy.
///
/// A `CopyContext` is created empty, accumulates `original -> copy` entries
/// as a single top-level copy proceeds, and is cleared when released back to
/// a [`crate::pool::ContextPool`] (or simply dropped, for a one-off caller-
/// owned context). It is not [`Sync`]: at most one thread may
/// use a given context at a time, which we additionally enforce by
/// threading it through as `&mut CopyContext` everywhere, so the borrow
/// checker rejects any attempt at concurrent use.
#[derive(Default)]
pub struct CopyContext {
    rc_identities: IdentityMap,
    arc_identities: ArcIdentityMap,
}

impl CopyContext {
    /// Creates a fresh, empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a previously recorded `Rc` copy.
    pub fn get_rc(&self, key: RefKey) -> Option<&Rc<dyn Any>> {
        self.rc_identities.get(key)
    }

    /// Records an `Rc` copy. See [`IdentityMap::insert`] for the ordering
    /// requirement (register before recursing).
    pub fn insert_rc(&mut self, key: RefKey, copy: Rc<dyn Any>) {
        self.rc_identities.insert(key, copy);
    }

    /// Looks up a previously recorded `Arc` copy.
    pub fn get_arc(&self, key: RefKey) -> Option<&Arc<dyn Any + Send + Sync>> {
        self.arc_identities.get(key)
    }

    /// Records an `Arc` copy.
    pub fn insert_arc(&mut self, key: RefKey, copy: Arc<dyn Any + Send + Sync>) {
        self.arc_identities.insert(key, copy);
    }

    /// Total number of distinct shared allocations copied so far in this
    /// call, across both `Rc` and `Arc` identities. Mostly useful for tests
    /// and diagnostics.
    pub fn identities_recorded(&self) -> usize {
        self.rc_identities.len() + self.arc_identities.len()
    }

    /// Resets the context to empty, ready for reuse by a new top-level
    /// call. Called by [`crate::pool::ContextPool::release`] and by the
    /// drop guard in [`crate::copy`].
    pub fn reset(&mut self) {
        self.rc_identities.clear();
        self.arc_identities.clear();
    }
}
