/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! `Cell<T>`: the `Copy`-only sibling of `RefCell<T>`. Always `Mutable` —
//! it is interior mutability, so the "no interior mutability reachable"
//! condition for classifying a reference-like type `Immutable` never holds
//! for it, same as `RefCell`/`Mutex`/`RwLock` (see [`crate::impls::smart_ptr`]).

use crate::array::{ArrayElement, Element};
use crate::policy::{CopyPolicy, Policy};
use crate::{CopyContext, DeepCopy};
use std::cell::Cell;

impl<T: CopyPolicy> CopyPolicy for Cell<T> {
    const POLICY: Policy = Policy::Mutable;
}

impl<T: Copy + DeepCopy> DeepCopy for Cell<T> {
    fn deep_copy(&self, ctx: &mut CopyContext) -> Self {
        Cell::new(self.get().deep_copy(ctx))
    }
}

impl<T: Copy + DeepCopy> ArrayElement for Cell<T> {
    type Kind = Element;
}
