/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Map and set containers. Unlike `Vec`/`[T; N]`/`Box<[T]>`/`VecDeque<T>`,
//! these are classified as composite-by-value: `ShallowCopyable` when every
//! key and value is `Immutable`, `Mutable` otherwise.

use crate::array::{ArrayElement, Element};
use crate::policy::{CopyPolicy, Policy};
use crate::{CopyContext, DeepCopy};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;

impl<K: CopyPolicy, V: CopyPolicy> CopyPolicy for HashMap<K, V> {
    const POLICY: Policy = if K::IS_IMMUTABLE && V::IS_IMMUTABLE {
        Policy::ShallowCopyable
    } else {
        Policy::Mutable
    };
}

impl<K: DeepCopy + Eq + Hash, V: DeepCopy> DeepCopy for HashMap<K, V> {
    fn deep_copy(&self, ctx: &mut CopyContext) -> Self {
        self.iter()
            .map(|(key, value)| (key.deep_copy(ctx), value.deep_copy(ctx)))
            .collect()
    }
}

impl<K: DeepCopy + Eq + Hash, V: DeepCopy> ArrayElement for HashMap<K, V> {
    type Kind = Element;
}

impl<K: CopyPolicy, V: CopyPolicy> CopyPolicy for BTreeMap<K, V> {
    const POLICY: Policy = if K::IS_IMMUTABLE && V::IS_IMMUTABLE {
        Policy::ShallowCopyable
    } else {
        Policy::Mutable
    };
}

impl<K: DeepCopy + Ord, V: DeepCopy> DeepCopy for BTreeMap<K, V> {
    fn deep_copy(&self, ctx: &mut CopyContext) -> Self {
        self.iter()
            .map(|(key, value)| (key.deep_copy(ctx), value.deep_copy(ctx)))
            .collect()
    }
}

impl<K: DeepCopy + Ord, V: DeepCopy> ArrayElement for BTreeMap<K, V> {
    type Kind = Element;
}

impl<T: CopyPolicy> CopyPolicy for HashSet<T> {
    const POLICY: Policy = if T::IS_IMMUTABLE {
        Policy::ShallowCopyable
    } else {
        Policy::Mutable
    };
}

impl<T: DeepCopy + Eq + Hash> DeepCopy for HashSet<T> {
    fn deep_copy(&self, ctx: &mut CopyContext) -> Self {
        self.iter().map(|item| item.deep_copy(ctx)).collect()
    }
}

impl<T: DeepCopy + Eq + Hash> ArrayElement for HashSet<T> {
    type Kind = Element;
}

impl<T: CopyPolicy> CopyPolicy for BTreeSet<T> {
    const POLICY: Policy = if T::IS_IMMUTABLE {
        Policy::ShallowCopyable
    } else {
        Policy::Mutable
    };
}

impl<T: DeepCopy + Ord> DeepCopy for BTreeSet<T> {
    fn deep_copy(&self, ctx: &mut CopyContext) -> Self {
        self.iter().map(|item| item.deep_copy(ctx)).collect()
    }
}

impl<T: DeepCopy + Ord> ArrayElement for BTreeSet<T> {
    type Kind = Element;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_map_round_trips_keys_and_values() {
        let mut ctx = CopyContext::new();
        let mut original = HashMap::new();
        original.insert("a".to_string(), 1_i32);
        original.insert("b".to_string(), 2_i32);
        let copy = original.deep_copy(&mut ctx);
        assert_eq!(original, copy);
    }

    #[test]
    fn btree_set_of_immutables_is_shallow_copyable() {
        assert_eq!(BTreeSet::<i32>::POLICY, Policy::ShallowCopyable);
    }
}
