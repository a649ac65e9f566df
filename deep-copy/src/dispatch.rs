/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Runtime-type dispatch: the dispatcher chooses the copier based on the
runtime type of the referent, not the declared type of the reference.

A field declared as `Rc<dyn Shape>` only knows, at compile time, that its
pointee implements `Shape`; the concrete type behind the trait object (a
`Circle`, a `Square`, ...) is only known at runtime. [`DynDeepCopy`] is the
same "virtual clone" idiom the `dyn-clone` crate uses for `Clone`: every
type that implements [`crate::DeepCopy`] automatically implements
`DynDeepCopy`, and a `dyn DynDeepCopy` trait object's vtable entry for
`dyn_deep_copy` already points at the right monomorphized copier for
whatever concrete type was erased into it. No [`std::any::TypeId`] lookup
is needed for this path at all — that machinery
([`crate::registry::CopierRegistry`]) is reserved for values erased all the
way to `dyn Any`, past any trait that could carry a vtable method.

*/

use crate::context::CopyContext;
use crate::DeepCopy;
use std::any::Any;

/// Object-safe counterpart to [`DeepCopy`], implemented automatically for
/// every `T: DeepCopy + Any`.
///
/// Blanket-implemented rather than derived: a manual impl would have to be
/// repeated for every concrete type a trait object might erase, exactly the
/// duplication a blanket impl over the existing `DeepCopy` impl avoids.
pub trait DynDeepCopy: Any {
    /// Copies the value behind this trait object, returning a new trait
    /// object of the same concrete runtime type.
    fn dyn_deep_copy(&self, ctx: &mut CopyContext) -> Box<dyn DynDeepCopy>;

    /// Upcast for callers that need to fall through to the `dyn Any` /
    /// [`crate::registry::CopierRegistry`] path.
    fn as_any(&self) -> &dyn Any;
}

impl<T> DynDeepCopy for T
where
    T: DeepCopy + Any,
{
    fn dyn_deep_copy(&self, ctx: &mut CopyContext) -> Box<dyn DynDeepCopy> {
        Box::new(self.deep_copy(ctx))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Copies a trait object through its vtable. This is the dynamic-dispatch
/// analogue of calling `value.deep_copy(ctx)` directly on a statically
/// known type.
pub fn copy_dyn(value: &dyn DynDeepCopy, ctx: &mut CopyContext) -> Box<dyn DynDeepCopy> {
    value.dyn_deep_copy(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{CopyPolicy, Policy};

    #[derive(Clone)]
    struct Widget(i32);

    impl CopyPolicy for Widget {
        const POLICY: Policy = Policy::Mutable;
    }

    impl DeepCopy for Widget {
        fn deep_copy(&self, _ctx: &mut CopyContext) -> Self {
            Widget(self.0)
        }
    }

    #[test]
    fn dyn_dispatch_reaches_the_concrete_impl() {
        let mut ctx = CopyContext::new();
        let original: Box<dyn DynDeepCopy> = Box::new(Widget(9));
        let copy = copy_dyn(original.as_ref(), &mut ctx);
        let widget = copy.as_any().downcast_ref::<Widget>().unwrap();
        assert_eq!(widget.0, 9);
    }
}
