/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! `DeepCopy`/`CopyPolicy` implementations for the types the engine knows
//! about out of the box: the seed set of primitive-shaped immutable types,
//! generic templates (tuples, `Option`, `Result`), array-like and map-like
//! containers, and the smart-pointer types through which Rust sharing
//! becomes visible.

pub mod cell;
pub mod collections;
pub mod foreign;
pub mod option_result;
pub mod prim;
pub mod smart_ptr;
pub mod tuple;

pub use smart_ptr::{deep_copy_cyclic, deep_copy_cyclic_arc};
