/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

The copy policy. Classifies every type the engine encounters as
[`Policy::Immutable`], [`Policy::ShallowCopyable`], or [`Policy::Mutable`].

For any type known at compile time, classification is a plain associated
constant resolved at monomorphization — no runtime lookup, no cache. A
runtime-memoized [`PolicyCache`] is provided for the dynamic (`dyn Any`)
path, where a type is only known by its [`std::any::TypeId`] at the point
classification is needed.

*/

use crate::context::CopyContext;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

/// The tri-valued classification label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Instances are aliased, never copied.
    Immutable,
    /// Instances may be byte-wise duplicated without recursing into fields.
    ShallowCopyable,
    /// Instances must be deep-copied field-by-field (or element-by-element).
    Mutable,
}

/// Implemented by every type the engine knows how to classify.
///
/// You should not implement this trait by hand for your own types — derive
/// it with `#[derive(DeepCopy)]`, which computes [`CopyPolicy::POLICY`] from
/// the classification rules automatically, or override it
/// with `#[deep_copy(immutable)]`/`#[deep_copy(shallow)]` (the forced
/// classification and `ShallowCopyable` escape hatches).
pub trait CopyPolicy {
    /// This type's classification.
    const POLICY: Policy;

    /// Convenience: `true` iff [`Self::POLICY`] is [`Policy::Immutable`].
    const IS_IMMUTABLE: bool = matches!(Self::POLICY, Policy::Immutable);

    /// Convenience: `true` iff instances may be byte-wise/structurally
    /// duplicated without recursing — i.e. `Immutable` or `ShallowCopyable`.
    const IS_SHALLOW: bool = matches!(
        Self::POLICY,
        Policy::Immutable | Policy::ShallowCopyable
    );
}

/// Unsafe marker trait a user implements on a *foreign* type (one they do
/// not own and so cannot `#[derive(DeepCopy)]` onto) to assert it is safe to
/// alias indefinitely — a user-supplied immutable marker.
///
/// # Safety
///
/// The implementer must guarantee that no caller ever observes a mutation
/// of a value through one alias after the engine has aliased it elsewhere;
/// the engine takes this assertion on faith.
pub unsafe trait ImmutableType {}

impl<T: ImmutableType> CopyPolicy for T {
    const POLICY: Policy = Policy::Immutable;
}

/// Runtime-memoized classification for types only known by [`TypeId`] —
/// the dynamic counterpart to the compile-time [`CopyPolicy::POLICY`]
/// constant, used by the trait-object (`dyn Any`) copy path.
///
/// Classification itself is always computed the same way regardless of
/// caching, idempotently; the cache only avoids
/// recomputing it. Concurrent readers proceed without blocking each other;
/// concurrent first-writers of the same entry are tolerated (last write
/// wins, since both writes compute the same value).
pub struct PolicyCache {
    entries: RwLock<HashMap<TypeId, Policy>>,
}

impl PolicyCache {
    fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the cached policy for `T`, computing and memoizing it on
    /// first request.
    pub fn classify<T: CopyPolicy + 'static>(&self) -> Policy {
        let id = TypeId::of::<T>();
        if let Some(policy) = self.entries.read().unwrap().get(&id) {
            return *policy;
        }
        let policy = T::POLICY;
        self.entries.write().unwrap().insert(id, policy);
        policy
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The process-wide policy cache backing the dynamic dispatch path.
pub fn global_policy_cache() -> &'static PolicyCache {
    static CACHE: OnceLock<PolicyCache> = OnceLock::new();
    CACHE.get_or_init(PolicyCache::new)
}

/// Copies a single field during derive-generated struct/enum reconstruction.
///
/// This is deliberately *not* specialized on `T::POLICY`: `T::deep_copy`
/// already encodes the right behavior for its own policy (an `Immutable`
/// type's `deep_copy` is a plain clone, a `Mutable` type's recurses), so the
/// derive macro can call this uniformly on every field regardless of that
/// field's classification, invoking the dispatcher uniformly, without
/// needing a helper-trait specialization
/// trick at the field level. That trick is still needed, and used, one
/// layer down in [`crate::array`], where a single `Vec<T>`/`[T; N]` impl
/// must pick different code for `Copy` versus non-`Copy` element types.
pub fn copy_field<T: crate::DeepCopy>(field: &T, ctx: &mut CopyContext) -> T {
    field.deep_copy(ctx)
}
