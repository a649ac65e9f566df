/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

`Rc<T>`/`Arc<T>` (reference-like) and `Box<T>` (unique ownership,
never shared).

`Box<T>` is never entered into the identity map: it is uniquely owned, so
two `Box<T>` fields can never alias the same allocation, and its policy is
simply inherited from `T`, the same as a plain struct field.

When `T::IS_IMMUTABLE`, `Rc<T>`/`Arc<T>` are themselves classified
`Immutable`, and `deep_copy` aliases the handle with a plain `Clone::clone`
instead of ever consulting the identity map — an `Immutable` value is never
copied, per its own contract.

Otherwise, `Rc<T>`/`Arc<T>` consult the identity map by allocation address. The
generic impls here recurse into the payload *before* allocating and
registering the copy, which is correct — and simpler than allocate-then-
populate — for every acyclic sharing pattern, and `Rc<T>`/`Arc<T>` without
an interior-mutability wrapper cannot form a cycle in the first place (nothing
can mutate them into pointing back at themselves). `RefCell<T>`/`Mutex<T>`/
`RwLock<T>` are always classified `Mutable` regardless of `T`, which makes
`Rc<RefCell<T>>`/`Arc<Mutex<T>>`/`Arc<RwLock<T>>` `Mutable` automatically
through the generic `Rc`/`Arc` rule, without a separate overlapping impl.

A type with a genuine cycle — a node whose payload recursively contains an
`Rc<RefCell<Self>>` edge back to itself — cannot be copied by the generic
recurse-then-register impl (the recursive call would need the very `Rc` it
is still computing). [`deep_copy_cyclic`]/[`deep_copy_cyclic_arc`] implement
an allocate-placeholder-then-populate algorithm for that
case; a self-referential type implements `DeepCopy` by hand and delegates to
one of them instead of relying on `#[derive(DeepCopy)]`'s uniform
field-copy order.

*/

use crate::array::{ArrayElement, Element};
use crate::context::CopyContext;
use crate::error::{DeepCopyError, Result};
use crate::identity::RefKey;
use crate::policy::{CopyPolicy, Policy};
use crate::DeepCopy;
use std::any::Any;
use std::cell::RefCell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;
use std::sync::{Arc, Mutex, RwLock};

impl<T: CopyPolicy> CopyPolicy for Box<T> {
    const POLICY: Policy = T::POLICY;
}

impl<T: DeepCopy> DeepCopy for Box<T> {
    fn deep_copy(&self, ctx: &mut CopyContext) -> Self {
        Box::new(self.as_ref().deep_copy(ctx))
    }
}

impl<T: DeepCopy> ArrayElement for Box<T> {
    type Kind = Element;
}

impl<T: DeepCopy + 'static> CopyPolicy for Rc<T> {
    const POLICY: Policy = if T::IS_IMMUTABLE {
        Policy::Immutable
    } else {
        Policy::Mutable
    };
}

impl<T: DeepCopy + 'static> DeepCopy for Rc<T> {
    fn deep_copy(&self, ctx: &mut CopyContext) -> Self {
        if T::IS_IMMUTABLE {
            return self.clone();
        }
        let key = RefKey::of_rc(self);
        if let Some(existing) = ctx.get_rc(key) {
            match existing.clone().downcast::<T>() {
                Ok(typed) => return typed,
                Err(_) => debug_assert!(
                    false,
                    "identity map entry for {key:?} had the wrong concrete type"
                ),
            }
        }
        let copy = Rc::new(self.as_ref().deep_copy(ctx));
        ctx.insert_rc(key, copy.clone() as Rc<dyn Any>);
        copy
    }
}

impl<T: DeepCopy + 'static> ArrayElement for Rc<T> {
    type Kind = Element;
}

impl<T: DeepCopy + Send + Sync + 'static> CopyPolicy for Arc<T> {
    const POLICY: Policy = if T::IS_IMMUTABLE {
        Policy::Immutable
    } else {
        Policy::Mutable
    };
}

impl<T: DeepCopy + Send + Sync + 'static> DeepCopy for Arc<T> {
    fn deep_copy(&self, ctx: &mut CopyContext) -> Self {
        if T::IS_IMMUTABLE {
            return self.clone();
        }
        let key = RefKey::of_arc(self);
        if let Some(existing) = ctx.get_arc(key) {
            match existing.clone().downcast::<T>() {
                Ok(typed) => return typed,
                Err(_) => debug_assert!(
                    false,
                    "identity map entry for {key:?} had the wrong concrete type"
                ),
            }
        }
        let copy = Arc::new(self.as_ref().deep_copy(ctx));
        ctx.insert_arc(key, copy.clone() as Arc<dyn Any + Send + Sync>);
        copy
    }
}

impl<T: DeepCopy + Send + Sync + 'static> ArrayElement for Arc<T> {
    type Kind = Element;
}

impl<T: CopyPolicy> CopyPolicy for RefCell<T> {
    const POLICY: Policy = Policy::Mutable;
}

impl<T: DeepCopy> DeepCopy for RefCell<T> {
    fn deep_copy(&self, ctx: &mut CopyContext) -> Self {
        RefCell::new(self.borrow().deep_copy(ctx))
    }
}

impl<T: DeepCopy> ArrayElement for RefCell<T> {
    type Kind = Element;
}

impl<T: CopyPolicy> CopyPolicy for Mutex<T> {
    const POLICY: Policy = Policy::Mutable;
}

impl<T: DeepCopy> DeepCopy for Mutex<T> {
    fn deep_copy(&self, ctx: &mut CopyContext) -> Self {
        let guard = self.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Mutex::new(guard.deep_copy(ctx))
    }
}

impl<T: DeepCopy> ArrayElement for Mutex<T> {
    type Kind = Element;
}

impl<T: CopyPolicy> CopyPolicy for RwLock<T> {
    const POLICY: Policy = Policy::Mutable;
}

impl<T: DeepCopy> DeepCopy for RwLock<T> {
    fn deep_copy(&self, ctx: &mut CopyContext) -> Self {
        let guard = self.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        RwLock::new(guard.deep_copy(ctx))
    }
}

impl<T: DeepCopy> ArrayElement for RwLock<T> {
    type Kind = Element;
}

/// Deep-copies a node that may participate in a cycle through
/// `Rc<RefCell<Self>>`. See the module docs for why this cannot be a
/// blanket `DeepCopy` impl.
///
/// Fallible: the placeholder allocated before recursing is built from
/// `T::default()`, which is caller-supplied code that may panic; a caught
/// panic becomes [`DeepCopyError::ConstructionFailure`] instead of
/// unwinding through the copy.
pub fn deep_copy_cyclic<T>(original: &Rc<RefCell<T>>, ctx: &mut CopyContext) -> Result<Rc<RefCell<T>>>
where
    T: DeepCopy + Default + 'static,
{
    let key = RefKey::of_rc(original);
    if let Some(existing) = ctx.get_rc(key) {
        return existing.clone().downcast::<RefCell<T>>().map_err(|_| {
            DeepCopyError::InvariantViolation {
                detail: format!("identity map entry for {key:?} had the wrong concrete type"),
            }
        });
    }
    let placeholder = Rc::new(RefCell::new(construct_default::<T>()?));
    ctx.insert_rc(key, placeholder.clone() as Rc<dyn Any>);
    let populated = original.borrow().deep_copy(ctx);
    *placeholder.borrow_mut() = populated;
    Ok(placeholder)
}

/// `Arc<Mutex<Self>>` analogue of [`deep_copy_cyclic`], for cycles shared
/// across threads.
pub fn deep_copy_cyclic_arc<T>(original: &Arc<Mutex<T>>, ctx: &mut CopyContext) -> Result<Arc<Mutex<T>>>
where
    T: DeepCopy + Default + Send + Sync + 'static,
{
    let key = RefKey::of_arc(original);
    if let Some(existing) = ctx.get_arc(key) {
        return existing.clone().downcast::<Mutex<T>>().map_err(|_| {
            DeepCopyError::InvariantViolation {
                detail: format!("identity map entry for {key:?} had the wrong concrete type"),
            }
        });
    }
    let placeholder = Arc::new(Mutex::new(construct_default::<T>()?));
    ctx.insert_arc(key, placeholder.clone() as Arc<dyn Any + Send + Sync>);
    let populated = original
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .deep_copy(ctx);
    *placeholder.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = populated;
    Ok(placeholder)
}

/// Runs `T::default()` under `catch_unwind`, turning a panicking `Default`
/// impl into a [`DeepCopyError::ConstructionFailure`] instead of letting it
/// unwind through the copy.
fn construct_default<T: Default>() -> Result<T> {
    catch_unwind(AssertUnwindSafe(T::default)).map_err(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic payload was not a string".to_string());
        DeepCopyError::ConstructionFailure {
            type_name: std::any::type_name::<T>(),
            reason,
        }
    })
}
