/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Shape fidelity, exercised over `Vec<T>`,
//! `[T; N]`, `Box<[T]>` and `VecDeque<T>`, including the `Vec<UserStruct>`
//! case a derived type must support without any manual `ArrayElement` impl.

use deep_copy::{copy, CopyContext, DeepCopy};
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(deep_copy::DeepCopy, Clone, Debug, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

#[test]
fn vec_of_a_derived_struct_needs_no_manual_array_element_impl() {
    let original = vec![Point { x: 1, y: 2 }, Point { x: 3, y: 4 }];
    let copy = copy(&original);
    assert_eq!(copy, original);
}

#[test]
fn fixed_size_array_preserves_length_and_values() {
    let original: [Point; 3] = [
        Point { x: 1, y: 1 },
        Point { x: 2, y: 2 },
        Point { x: 3, y: 3 },
    ];
    let copy = copy(&original);
    assert_eq!(copy.len(), original.len());
    assert_eq!(copy, original);
}

#[test]
fn boxed_slice_round_trips() {
    let original: Box<[Point]> = vec![Point { x: 9, y: 9 }].into_boxed_slice();
    let copy = copy(&original);
    assert_eq!(copy, original);
}

#[test]
fn vec_deque_round_trips_and_preserves_order() {
    let mut original = VecDeque::new();
    original.push_back(Point { x: 1, y: 1 });
    original.push_front(Point { x: 0, y: 0 });
    let copy = copy(&original);
    assert_eq!(copy, original);
}

#[test]
fn nested_vec_of_vec_preserves_shape() {
    let original = vec![vec![1, 2, 3], vec![], vec![4]];
    let copy = copy(&original);
    assert_eq!(copy, original);
}

#[test]
fn deeply_nested_array_of_mutable_elements_preserves_aliasing() {
    let shared = Rc::new(Point { x: 7, y: 7 });
    let grid = vec![
        vec![Rc::clone(&shared), Rc::new(Point { x: 1, y: 1 })],
        vec![Rc::clone(&shared)],
    ];
    let copy = copy(&grid);
    assert_eq!(copy[0][0].x, 7);
    assert!(Rc::ptr_eq(&copy[0][0], &copy[1][0]));
    assert!(!Rc::ptr_eq(&copy[0][0], &shared));
}

#[test]
fn empty_vec_round_trips() {
    let mut ctx = CopyContext::new();
    let original: Vec<i32> = Vec::new();
    let copy = original.deep_copy(&mut ctx);
    assert!(copy.is_empty());
}

#[test]
fn array_of_immutable_elements_takes_the_block_path_without_visiting_the_context() {
    let mut ctx = CopyContext::new();
    let original = [1_i32, 2, 3, 4];
    let copy = original.deep_copy(&mut ctx);
    assert_eq!(copy, original);
    assert_eq!(ctx.identities_recorded(), 0);
}
