/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

The memoized per-type copier factory, dynamic counterpart to the static path.

For a field whose declared type is a trait object of a known trait (e.g.
`Rc<dyn Shape>`), [`crate::dispatch::DynDeepCopy`]'s vtable *is* the
per-type copier — no registry is needed, the runtime type is dispatched to
automatically. A `CopierRegistry` is only needed for the less common case
of copying a value that has been erased all the way to `dyn Any` (no trait
left to dispatch through), where the concrete type must be recovered by an
explicit, [`std::any::TypeId`]-keyed registration performed ahead of time —
the same technique `erased-serde`-style crates use to let serialization
cross a `dyn Any` boundary.

*/

use crate::context::CopyContext;
use crate::error::DeepCopyError;
use crate::DeepCopy;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

type ErasedCopier = Box<dyn Fn(&dyn Any, &mut CopyContext) -> Box<dyn Any> + Send + Sync>;

struct Entry {
    copier: ErasedCopier,
    type_name: &'static str,
}

/// A `TypeId`-keyed, memoized table of erased copiers.
///
/// Registration is explicit (`register::<T>()`) rather than automatic,
/// because Rust has no way to enumerate "every type that might reach this
/// registry" at link time without a crate like `inventory` — requiring an
/// explicit call keeps the dependency surface the same as the rest of the
/// engine, and lets this extension point remain a runtime operation even
/// though the compile-time [`crate::policy::CopyPolicy::POLICY`] path
/// cannot be.
pub struct CopierRegistry {
    entries: RwLock<HashMap<TypeId, Entry>>,
}

impl CopierRegistry {
    fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Registers `T` as copyable through this registry. Idempotent: calling
    /// it twice for the same `T` is harmless, and concurrent registration
    /// of the same entry is tolerated.
    pub fn register<T: DeepCopy + 'static>(&self) {
        let id = TypeId::of::<T>();
        if self.entries.read().unwrap().contains_key(&id) {
            return;
        }
        let entry = Entry {
            copier: Box::new(|value: &dyn Any, ctx: &mut CopyContext| {
                let typed: &T = value
                    .downcast_ref::<T>()
                    .expect("CopierRegistry: TypeId matched a copier for a different type");
                Box::new(typed.deep_copy(ctx)) as Box<dyn Any>
            }),
            type_name: core::any::type_name::<T>(),
        };
        self.entries.write().unwrap().entry(id).or_insert(entry);
    }

    /// Copies `value` using its registered copier, or fails with
    /// [`DeepCopyError::UnsupportedType`] if none was registered.
    pub fn copy(&self, value: &dyn Any, ctx: &mut CopyContext) -> Result<Box<dyn Any>, DeepCopyError> {
        let guard = self.entries.read().unwrap();
        match guard.get(&value.type_id()) {
            Some(entry) => Ok((entry.copier)(value, ctx)),
            None => Err(DeepCopyError::UnsupportedType {
                type_name: "<unregistered dyn Any>",
            }),
        }
    }

    /// Whether `T` has a registered copier.
    pub fn is_registered<T: 'static>(&self) -> bool {
        self.entries.read().unwrap().contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }
}

/// The process-wide registry backing the `dyn Any` copy path.
pub fn global_registry() -> &'static CopierRegistry {
    static REGISTRY: OnceLock<CopierRegistry> = OnceLock::new();
    REGISTRY.get_or_init(CopierRegistry::new)
}
