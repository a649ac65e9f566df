/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Tuples: composite-by-value, classification inherited from the
//! element types' policies.

use crate::array::{ArrayElement, Element};
use crate::policy::{CopyPolicy, Policy};
use crate::{CopyContext, DeepCopy};

macro_rules! tuple_impls {
    ($(($($name:ident => $idx:tt),+)),+ $(,)?) => {
        $(
            impl<$($name: CopyPolicy),+> CopyPolicy for ($($name,)+) {
                const POLICY: Policy =
                    if true $(&& <$name as CopyPolicy>::IS_IMMUTABLE)+ {
                        Policy::ShallowCopyable
                    } else {
                        Policy::Mutable
                    };
            }

            impl<$($name: DeepCopy),+> DeepCopy for ($($name,)+) {
                fn deep_copy(&self, ctx: &mut CopyContext) -> Self {
                    ( $( crate::policy::copy_field(&self.$idx, ctx), )+ )
                }
            }

            impl<$($name: DeepCopy),+> ArrayElement for ($($name,)+) {
                type Kind = Element;
            }
        )+
    };
}

tuple_impls! {
    (A0 => 0),
    (A0 => 0, A1 => 1),
    (A0 => 0, A1 => 1, A2 => 2),
    (A0 => 0, A1 => 1, A2 => 2, A3 => 3),
    (A0 => 0, A1 => 1, A2 => 2, A3 => 3, A4 => 4),
    (A0 => 0, A1 => 1, A2 => 2, A3 => 3, A4 => 4, A5 => 5),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_immutable_tuple_is_shallow_copyable() {
        assert_eq!(<(i32, bool)>::POLICY, Policy::ShallowCopyable);
    }

    #[test]
    fn tuple_copies_each_element() {
        let mut ctx = CopyContext::new();
        let original = (1_i32, "a".to_string(), true);
        let copy = original.clone().deep_copy(&mut ctx);
        assert_eq!(original, copy);
    }
}
