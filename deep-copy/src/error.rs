/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Errors that can happen during a copy.
The `DeepCopy::deep_copy` trait method itself cannot fail: classification is
total, allocation of plain structs cannot be refused, and every field's
concrete type is known ahead of time, so an unsupported type becomes a
compile error rather than a runtime one there. [`UnsupportedType`] only
arises on the dynamic (`dyn Any`/`dyn DynDeepCopy`) path, where a trait
object's runtime type may not have registered a copier. [`ConstructionFailure`]
and [`InvariantViolation`] arise on the cyclic-structure path
([`crate::impls::deep_copy_cyclic`]/`deep_copy_cyclic_arc`), which is
fallible because it constructs a placeholder via `Default::default()` before
the real value is known.

[`UnsupportedType`]: DeepCopyError::UnsupportedType
[`ConstructionFailure`]: DeepCopyError::ConstructionFailure
[`InvariantViolation`]: DeepCopyError::InvariantViolation

*/

/// Errors surfaced by the dynamic copy path.
#[derive(thiserror::Error, Debug)]
pub enum DeepCopyError {
    /// The dynamic dispatcher was asked to copy a trait object whose
    /// concrete runtime type has no registered copier (see
    /// [`crate::registry::CopierRegistry`]) and is not `'static` + known by
    /// `#[derive(DeepCopy)]`.
    #[error("no copier registered for type {type_name}")]
    UnsupportedType {
        /// `core::any::type_name` of the offending runtime type.
        type_name: &'static str,
    },

    /// A `Default::default()` call used as the uninitialized-instance
    /// constructor of last resort, for `Rc<RefCell<T>>`-style
    /// cyclic nodes, panicked.
    #[error("constructing a placeholder instance of {type_name} failed: {reason}")]
    ConstructionFailure {
        /// `core::any::type_name` of the type whose `Default` impl failed.
        type_name: &'static str,
        /// The panic payload, downcast to a displayable string where
        /// possible.
        reason: String,
    },

    /// An internal invariant was violated — treated as a bug in the engine
    /// rather than a caller error, but surfaced rather than panicking so a
    /// long-running host process is not brought down by it.
    #[error("internal invariant violated: {detail}")]
    InvariantViolation {
        /// What was expected to hold and did not.
        detail: String,
    },
}

pub type Result<T> = core::result::Result<T, DeepCopyError>;
