/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Array and array-like container copying.

`Vec<T>`, `[T; N]`, `Box<[T]>` and `VecDeque<T>` all face the same choice,
regardless of nesting depth, collapsed into a single question per
element type: can the whole backing buffer be duplicated in one block
(`T::clone()` across the slice, skipping field-by-field reconstruction), or
must each element be recursively deep-copied? Rust arrays nest
structurally — a `Vec<Vec<T>>` is just a `Vec<T>` whose element type happens
to itself be an array-like container — so there is no need for separate
rank-2/rank-≥3 code paths the way a host language without generics might
need: the same generic impl, instantiated at a different `T`, handles every
nesting depth.

A single generic `impl<T> DeepCopy for Vec<T>` cannot pick between "clone
the slice" and "map `deep_copy` over it", because the two branches need
different bounds on `T` (`Clone` versus nothing but [`DeepCopy`] itself),
and an `impl` block's bounds must hold for every instantiation, not just the
one that takes a particular branch at runtime. [`ArrayElement`] plus
[`ArrayCopyHelper`] is a tag-type-and-helper-trait workaround for that:
`T::Kind` selects, at compile time, which helper impl applies, so only the
bound the chosen strategy actually needs is ever required.

*/

use crate::context::CopyContext;
use crate::policy::{CopyPolicy, Policy};
use crate::DeepCopy;
use sealed::sealed;
use std::collections::VecDeque;

/// Tag type: elements of this kind are duplicated by cloning the backing
/// buffer, never recursed into.
pub struct Block;

/// Tag type: elements of this kind must be recursively deep-copied one at a
/// time.
pub struct Element;

#[sealed]
pub trait ArrayKind {}
#[sealed]
impl ArrayKind for Block {}
#[sealed]
impl ArrayKind for Element {}

/// Implemented by every type that may appear as the element type of a
/// `Vec`/array/`VecDeque` this engine copies. `Kind` selects the copy
/// strategy for containers of this element type.
///
/// This is implemented explicitly for each concrete type (by
/// [`crate::impls::prim`] for the `Block` path, and by
/// `#[derive(DeepCopy)]` for the `Element` path) rather than by a single
/// blanket impl, because Rust's coherence rules would not allow a blanket
/// impl to coexist with the concrete overrides primitive types need.
pub trait ArrayElement: DeepCopy {
    type Kind: ArrayKind;
}

/// Strategy-dispatching helper, selected by `T::Kind`.
pub trait ArrayCopyHelper<K: ArrayKind> {
    fn copy_array(&self, ctx: &mut CopyContext) -> Self;
}

impl<T> ArrayCopyHelper<Block> for Vec<T>
where
    T: ArrayElement<Kind = Block> + Clone,
{
    fn copy_array(&self, _ctx: &mut CopyContext) -> Self {
        self.clone()
    }
}

impl<T> ArrayCopyHelper<Element> for Vec<T>
where
    T: ArrayElement<Kind = Element>,
{
    fn copy_array(&self, ctx: &mut CopyContext) -> Self {
        self.iter().map(|item| item.deep_copy(ctx)).collect()
    }
}

impl<T> DeepCopy for Vec<T>
where
    T: ArrayElement,
    Vec<T>: ArrayCopyHelper<T::Kind>,
{
    fn deep_copy(&self, ctx: &mut CopyContext) -> Self {
        ArrayCopyHelper::copy_array(self, ctx)
    }
}

/// Array-like containers are `Mutable` unconditionally, regardless
/// of the element type's own policy — the container itself is owned storage
/// that must be duplicated. The block-copy optimization for an all-Immutable
/// element type is a property of the *array copier*, selected by
/// [`ArrayElement::Kind`], not of this policy classification.
impl<T: CopyPolicy> CopyPolicy for Vec<T> {
    const POLICY: Policy = Policy::Mutable;
}

/// `Vec<T>` may itself be nested as another container's element (a
/// `Vec<Vec<T>>`) — it always takes the
/// `Element` path rather than `Block`, since `Vec` is never `Copy` and a
/// plain `Clone` would not be the optimization the `Block` path exists for.
impl<T: ArrayElement> ArrayElement for Vec<T>
where
    Vec<T>: DeepCopy,
{
    type Kind = Element;
}

impl<T> ArrayCopyHelper<Block> for VecDeque<T>
where
    T: ArrayElement<Kind = Block> + Clone,
{
    fn copy_array(&self, _ctx: &mut CopyContext) -> Self {
        self.clone()
    }
}

impl<T> ArrayCopyHelper<Element> for VecDeque<T>
where
    T: ArrayElement<Kind = Element>,
{
    fn copy_array(&self, ctx: &mut CopyContext) -> Self {
        self.iter().map(|item| item.deep_copy(ctx)).collect()
    }
}

impl<T> DeepCopy for VecDeque<T>
where
    T: ArrayElement,
    VecDeque<T>: ArrayCopyHelper<T::Kind>,
{
    fn deep_copy(&self, ctx: &mut CopyContext) -> Self {
        ArrayCopyHelper::copy_array(self, ctx)
    }
}

impl<T: CopyPolicy> CopyPolicy for VecDeque<T> {
    const POLICY: Policy = Policy::Mutable;
}

impl<T: ArrayElement> ArrayElement for VecDeque<T>
where
    VecDeque<T>: DeepCopy,
{
    type Kind = Element;
}

impl<T> ArrayCopyHelper<Block> for Box<[T]>
where
    T: ArrayElement<Kind = Block> + Clone,
{
    fn copy_array(&self, _ctx: &mut CopyContext) -> Self {
        self.clone()
    }
}

impl<T> ArrayCopyHelper<Element> for Box<[T]>
where
    T: ArrayElement<Kind = Element>,
{
    fn copy_array(&self, ctx: &mut CopyContext) -> Self {
        self.iter().map(|item| item.deep_copy(ctx)).collect()
    }
}

impl<T> DeepCopy for Box<[T]>
where
    T: ArrayElement,
    Box<[T]>: ArrayCopyHelper<T::Kind>,
{
    fn deep_copy(&self, ctx: &mut CopyContext) -> Self {
        ArrayCopyHelper::copy_array(self, ctx)
    }
}

impl<T: CopyPolicy> CopyPolicy for Box<[T]> {
    const POLICY: Policy = Policy::Mutable;
}

impl<T: ArrayElement> ArrayElement for Box<[T]>
where
    Box<[T]>: DeepCopy,
{
    type Kind = Element;
}

impl<T, const N: usize> ArrayCopyHelper<Block> for [T; N]
where
    T: ArrayElement<Kind = Block> + Clone,
{
    fn copy_array(&self, _ctx: &mut CopyContext) -> Self {
        self.clone()
    }
}

impl<T, const N: usize> ArrayCopyHelper<Element> for [T; N]
where
    T: ArrayElement<Kind = Element>,
{
    fn copy_array(&self, ctx: &mut CopyContext) -> Self {
        std::array::from_fn(|i| self[i].deep_copy(ctx))
    }
}

impl<T, const N: usize> DeepCopy for [T; N]
where
    T: ArrayElement,
    [T; N]: ArrayCopyHelper<T::Kind>,
{
    fn deep_copy(&self, ctx: &mut CopyContext) -> Self {
        ArrayCopyHelper::copy_array(self, ctx)
    }
}

impl<T: CopyPolicy, const N: usize> CopyPolicy for [T; N] {
    const POLICY: Policy = Policy::Mutable;
}

impl<T: ArrayElement, const N: usize> ArrayElement for [T; N]
where
    [T; N]: DeepCopy,
{
    type Kind = Element;
}
