/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! `Option<T>`, `Result<T, E>` and `PhantomData<T>`: generic
//! templates whose classification is computed from their type arguments'
//! policy rather than hardcoded.

use crate::array::{ArrayElement, Element};
use crate::policy::{CopyPolicy, Policy};
use crate::{CopyContext, DeepCopy};
use std::marker::PhantomData;

impl<T: CopyPolicy> CopyPolicy for Option<T> {
    const POLICY: Policy = T::POLICY;
}

impl<T: DeepCopy> DeepCopy for Option<T> {
    fn deep_copy(&self, ctx: &mut CopyContext) -> Self {
        self.as_ref().map(|value| value.deep_copy(ctx))
    }
}

impl<T: DeepCopy> ArrayElement for Option<T> {
    type Kind = Element;
}

impl<T: CopyPolicy, E: CopyPolicy> CopyPolicy for Result<T, E> {
    const POLICY: Policy = if T::IS_IMMUTABLE && E::IS_IMMUTABLE {
        Policy::Immutable
    } else if T::IS_SHALLOW && E::IS_SHALLOW {
        Policy::ShallowCopyable
    } else {
        Policy::Mutable
    };
}

impl<T: DeepCopy, E: DeepCopy> DeepCopy for Result<T, E> {
    fn deep_copy(&self, ctx: &mut CopyContext) -> Self {
        match self {
            Ok(value) => Ok(value.deep_copy(ctx)),
            Err(error) => Err(error.deep_copy(ctx)),
        }
    }
}

impl<T: DeepCopy, E: DeepCopy> ArrayElement for Result<T, E> {
    type Kind = Element;
}

impl<T> CopyPolicy for PhantomData<T> {
    const POLICY: Policy = Policy::Immutable;
}

impl<T> DeepCopy for PhantomData<T> {
    fn deep_copy(&self, _ctx: &mut CopyContext) -> Self {
        PhantomData
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_inherits_payload_policy() {
        assert_eq!(Option::<i32>::POLICY, Policy::Immutable);
    }

    #[test]
    fn none_round_trips_without_allocating_identities() {
        let mut ctx = CopyContext::new();
        let original: Option<i32> = None;
        assert_eq!(original.deep_copy(&mut ctx), None);
        assert_eq!(ctx.identities_recorded(), 0);
    }

    #[test]
    fn result_combines_ok_and_err_policies() {
        assert_eq!(Result::<i32, bool>::POLICY, Policy::Immutable);
    }
}
