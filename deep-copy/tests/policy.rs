/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Classification behavior, exercised one case at a time.

use deep_copy::{CopyPolicy, DeepCopy, Policy};
use std::cell::RefCell;
use std::rc::Rc;

// The fixed seed set.
#[test]
fn seed_set_is_immutable() {
    assert_eq!(i32::POLICY, Policy::Immutable);
    assert_eq!(bool::POLICY, Policy::Immutable);
    assert_eq!(String::POLICY, Policy::Immutable);
    assert_eq!(std::time::Duration::POLICY, Policy::Immutable);
}

// The user-supplied `#[deep_copy(immutable)]` marker.
#[derive(deep_copy::DeepCopy, Clone, Debug, PartialEq)]
#[deep_copy(immutable)]
struct ForcedImmutable {
    mutable_looking: Vec<i32>,
}

#[test]
fn immutable_marker_forces_immutable_regardless_of_fields() {
    assert_eq!(ForcedImmutable::POLICY, Policy::Immutable);
}

// Enums with no mutable-field-carrying variant are Immutable.
#[derive(deep_copy::DeepCopy, Clone, Debug, PartialEq)]
enum Plain {
    A,
    B(i32),
    C { x: bool },
}

#[test]
fn enum_with_only_immutable_payloads_is_immutable() {
    // no variant carries a Mutable field, so the enum as a whole is aliased
    // rather than shallow-copied: enums have no field storage of their own
    // to byte-duplicate.
    assert_eq!(Plain::POLICY, Policy::Immutable);
}

#[derive(deep_copy::DeepCopy, Clone, Debug, PartialEq)]
enum WithMutablePayload {
    A,
    B(Vec<i32>),
}

#[test]
fn enum_with_a_mutable_payload_is_mutable() {
    assert_eq!(WithMutablePayload::POLICY, Policy::Mutable);
}

// Array types are Mutable unconditionally, even over Immutable
// elements (the container itself is still owned storage to duplicate). The
// block-copy optimization for all-Immutable elements lives in the array
// copier, not in this classification.
#[test]
fn arrays_are_mutable_even_over_immutable_elements() {
    assert_eq!(Vec::<i32>::POLICY, Policy::Mutable);
    assert_eq!(<[i32; 4]>::POLICY, Policy::Mutable);
    assert_eq!(Vec::<Vec<i32>>::POLICY, Policy::Mutable);
    assert_eq!(Vec::<Rc<RefCell<i32>>>::POLICY, Policy::Mutable);
}

// Composite-by-value, all-Immutable fields => ShallowCopyable.
#[derive(deep_copy::DeepCopy, Clone, Debug, PartialEq)]
struct AllImmutableFields {
    a: i32,
    b: String,
}

#[derive(deep_copy::DeepCopy, Clone, Debug, PartialEq)]
struct OneMutableField {
    a: i32,
    b: Vec<i32>,
}

#[test]
fn shallow_iff_every_field_is_immutable() {
    assert_eq!(AllImmutableFields::POLICY, Policy::ShallowCopyable);
    assert_eq!(OneMutableField::POLICY, Policy::Mutable);
}

// Rc<T>/Arc<T> inherit Immutable only when T is itself Immutable
// and there is no interior mutability reachable; RefCell/Mutex/RwLock force
// Mutable regardless of payload.
#[test]
fn rc_is_immutable_only_over_immutable_non_cyclic_payloads() {
    assert_eq!(Rc::<i32>::POLICY, Policy::Immutable);
    assert_eq!(Rc::<RefCell<i32>>::POLICY, Policy::Mutable);
    assert_eq!(Rc::<Vec<i32>>::POLICY, Policy::Mutable);
}

// Generic templates inherit the template's classification from
// their type arguments, rather than a single hardcoded classification.
#[test]
fn option_and_tuple_are_conditional_on_type_arguments() {
    assert_eq!(Option::<i32>::POLICY, Policy::Immutable);
    assert_eq!(Option::<Vec<i32>>::POLICY, Policy::Mutable);
    assert_eq!(<(i32, bool)>::POLICY, Policy::ShallowCopyable);
    assert_eq!(<(i32, Vec<i32>)>::POLICY, Policy::Mutable);
}

// `#[deep_copy(shallow)]` escape hatch: forces ShallowCopyable even when a
// field would otherwise make the type Mutable by the plain computation.
#[derive(deep_copy::DeepCopy, Clone, Debug, PartialEq)]
#[deep_copy(shallow)]
struct ForcedShallow {
    value: i32,
    // would otherwise make the computed policy Mutable; the marker must
    // override that, in both the POLICY const and the generated body.
    would_be_mutable: Vec<i32>,
}

#[test]
fn shallow_marker_overrides_the_computed_policy() {
    assert_eq!(ForcedShallow::POLICY, Policy::ShallowCopyable);
}

#[test]
fn shallow_marker_clones_instead_of_recursing_into_fields() {
    let mut ctx = deep_copy::CopyContext::new();
    let original = ForcedShallow {
        value: 1,
        would_be_mutable: vec![1, 2, 3],
    };

    let copy = original.deep_copy(&mut ctx);

    assert_eq!(copy, original);
    assert_eq!(ctx.identities_recorded(), 0);
}
