/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![deny(unconditional_recursion)]

/*!

# deep-copy

A deep-copy engine for arbitrary in-memory object graphs that preserves
reference-sharing topology: two fields that alias the same allocation
before a copy still alias the same (freshly allocated) copy afterward, and
a cyclic structure copies to an isomorphic cycle rather than diverging or
panicking.

```
use deep_copy::DeepCopy;
use std::rc::Rc;

#[derive(deep_copy::DeepCopy, Debug, PartialEq)]
struct Node {
    value: i32,
    next: Option<Rc<Node>>,
}

let shared = Rc::new(Node { value: 1, next: None });
let original = Node { value: 0, next: Some(Rc::clone(&shared)) };
let copy = deep_copy::copy(&original);
assert_eq!(copy.value, original.value);
```

## How copying decides what to do

Every type the engine touches is classified into one of three policies
(see [`policy::Policy`]):

- **Immutable** — instances are aliased, never duplicated. Most of Rust's
  plain value types fall here automatically, since an owned `i32` or
  `String` is never itself the *sharing* mechanism — sharing in Rust is
  always explicit, via `Rc`/`Arc`.
- **ShallowCopyable** — instances may be duplicated by a flat clone,
  without recursing into fields, because every field is itself Immutable.
- **Mutable** — instances must be deep-copied field by field (or
  element by element), because at least one field may itself need to be
  newly allocated and potentially aliased again downstream.

`#[derive(DeepCopy)]` computes this classification for your own types at
compile time, as a plain associated constant ([`policy::CopyPolicy::POLICY`]) —
there is no runtime overhead for types whose full structure is known
statically. `Rc<T>`/`Arc<T>` (optionally wrapping a `RefCell`/`Mutex`/
`RwLock` for the mutable-cycle case) are where sharing becomes visible:
copying one consults a [`CopyContext`]'s identity map, keyed by the
allocation's address rather than the value it holds, so a second alias of
the same allocation encountered later in the same call reuses the first
copy instead of allocating a new one.

## Features

| Feature | Default | Effect |
|---|---|---|
| `std` | yes | Pulls in `alloc`; without it the crate is `no_std` but still needs a global allocator. |
| `derive` | yes | Re-exports `#[derive(DeepCopy)]` from `deep-copy-derive`. |
| `uuid`, `decimal`, `semver`, `url`, `time` | no | Seeds the corresponding foreign type as `Immutable` (see [`impls`]). |

*/

pub mod array;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod identity;
pub mod impls;
pub mod policy;
pub mod pool;
pub mod registry;

pub use context::CopyContext;
pub use dispatch::{copy_dyn, DynDeepCopy};
pub use error::{DeepCopyError, Result};
pub use identity::{ArcIdentityMap, IdentityMap, RefKey};
pub use policy::{CopyPolicy, Policy};
pub use pool::{global_pool, ContextPool, PooledContext};
pub use registry::{global_registry, CopierRegistry};

#[cfg(feature = "derive")]
pub use deep_copy_derive::DeepCopy;

/// Core capability of the engine: a type that knows how to produce a deep
/// copy of itself given a [`CopyContext`] to record and look up shared
/// allocations in.
///
/// Implement this by deriving it (`#[derive(DeepCopy)]`), not by hand —
/// the derive macro also computes the [`CopyPolicy`] impl this trait's
/// blanket machinery (field copying, array specialization) relies on.
/// `deep-copy` itself implements it for every type named in [`impls`].
pub trait DeepCopy: CopyPolicy + Sized {
    /// Produces a deep copy of `self`, recording any newly allocated
    /// shared value in `ctx` before recursing into it so a later alias of
    /// the same allocation, including one reached through a cycle, is
    /// resolved to the same copy rather than a fresh one.
    fn deep_copy(&self, ctx: &mut CopyContext) -> Self;
}

/// Deep-copies `value`, using a context leased from the process-wide
/// [`pool::global_pool`] for the duration of the call.
///
/// This is the entry point most callers want: a single self-contained
/// call that needs no setup, suitable for one-off copies or for a loop
/// that copies many independent object graphs (the pool amortizes the
/// identity map's allocation across calls; see [`pool::ContextPool`]).
pub fn copy<T: DeepCopy>(value: &T) -> T {
    let mut guard = PooledContext::lease(global_pool());
    value.deep_copy(guard.get_mut())
}

/// Deep-copies `value` using a caller-supplied context.
///
/// Use this when several related top-level values must share one
/// identity map — for instance, copying a list of graph roots that may
/// themselves share substructure with each other — so that sharing
/// across the *set* of values, not just within one, is preserved.
pub fn copy_with<T: DeepCopy>(value: &T, ctx: &mut CopyContext) -> T {
    value.deep_copy(ctx)
}

/// A value-level escape hatch that forces the `Immutable` classification,
/// for a foreign type you cannot annotate with `#[deep_copy(immutable)]`
/// or for a local value you want aliased regardless of how its own type
/// is classified.
///
/// Wrapping a value in `Immutable` asserts, the same way
/// [`policy::ImmutableType`] does for a whole type, that it is safe to
/// alias indefinitely: no caller will observe a mutation performed
/// through one alias via another. The wrapper is transparent to reads
/// (`Deref`) but only ever cloned, never recursed into, when copied.
#[derive(Debug)]
pub struct Immutable<T>(T);

impl<T> Immutable<T> {
    /// Wraps `value`, asserting it is safe to treat as immutable for the
    /// purposes of deep-copying.
    pub fn new(value: T) -> Self {
        Immutable(value)
    }

    /// Unwraps back to the underlying value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Immutable<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: Clone> Clone for Immutable<T> {
    fn clone(&self) -> Self {
        Immutable(self.0.clone())
    }
}

impl<T> CopyPolicy for Immutable<T> {
    const POLICY: Policy = Policy::Immutable;
}

impl<T: Clone> DeepCopy for Immutable<T> {
    fn deep_copy(&self, _ctx: &mut CopyContext) -> Self {
        self.clone()
    }
}

/// Re-exports the pieces most callers need: the [`DeepCopy`] trait and
/// derive macro, the free functions, and the policy machinery.
pub mod prelude {
    pub use crate::{copy, copy_with, CopyContext, CopyPolicy, DeepCopy, Immutable, Policy};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Leaf(i32);

    impl CopyPolicy for Leaf {
        const POLICY: Policy = Policy::Mutable;
    }

    impl DeepCopy for Leaf {
        fn deep_copy(&self, _ctx: &mut CopyContext) -> Self {
            Leaf(self.0)
        }
    }

    #[test]
    fn copy_entry_point_uses_a_pooled_context() {
        let original = Leaf(5);
        let pool_len_before = global_pool().len();
        let value = copy(&original);
        assert_eq!(value, original);
        assert_eq!(global_pool().len(), pool_len_before + 1);
    }

    #[test]
    fn copy_with_shares_one_context_across_calls() {
        let mut ctx = CopyContext::new();
        let a = copy_with(&Leaf(1), &mut ctx);
        let b = copy_with(&Leaf(2), &mut ctx);
        assert_eq!((a, b), (Leaf(1), Leaf(2)));
    }

    #[test]
    fn immutable_wrapper_is_always_immutable_policy() {
        assert_eq!(Immutable::<Leaf>::POLICY, Policy::Immutable);
        let mut ctx = CopyContext::new();
        let wrapped = Immutable::new(Leaf(9));
        let copy = wrapped.deep_copy(&mut ctx);
        assert_eq!(copy.0, 9);
    }
}
