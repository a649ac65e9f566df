/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! End-to-end scenarios: shared leaves, self-cycles, a
//! user-marked immutable type, a deeply nested array with shared immutable
//! payload, a private field reached through a read-only accessor, and a
//! large list of distinct mutables.

use deep_copy::impls::deep_copy_cyclic;
use deep_copy::{copy, CopyContext, CopyPolicy, DeepCopy, Policy};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(deep_copy::DeepCopy, Clone, Debug, PartialEq)]
struct Leaf {
    value: i32,
}

// Two Rc handles to the same leaf must copy to a single shared allocation.
#[test]
fn shared_leaf_round_trips_to_a_single_shared_copy() {
    let p = Rc::new(Leaf { value: 0 });
    let a = vec![Rc::clone(&p), Rc::clone(&p)];

    let c = copy(&a);

    assert!(!Rc::ptr_eq(&c[0], &p));
    assert!(Rc::ptr_eq(&c[0], &c[1]));
}

// Self-cycle, via a hand-written DeepCopy that delegates to
// deep_copy_cyclic (see deep-copy/src/impls/smart_ptr.rs for why a
// self-referential node cannot use the derive macro's uniform field order).
#[derive(Default, Debug, PartialEq)]
struct Node {
    value: i32,
    link: Option<Rc<RefCell<Node>>>,
}

impl CopyPolicy for Node {
    const POLICY: Policy = Policy::Mutable;
}

impl DeepCopy for Node {
    fn deep_copy(&self, ctx: &mut CopyContext) -> Self {
        Node {
            value: self.value,
            link: self
                .link
                .as_ref()
                .map(|rc| deep_copy_cyclic(rc, ctx).expect("Node::default() cannot panic")),
        }
    }
}

#[test]
fn self_cycle_copies_to_an_isomorphic_cycle() {
    let p = Rc::new(RefCell::new(Node { value: 1, link: None }));
    p.borrow_mut().link = Some(Rc::clone(&p));

    let c = deep_copy_cyclic(&p, &mut CopyContext::new()).unwrap();

    assert!(!Rc::ptr_eq(&c, &p));
    let linked = c.borrow().link.clone().unwrap();
    assert!(Rc::ptr_eq(&linked, &c));
}

// A type marked #[deep_copy(immutable)]: its payload is aliased
// unchanged, including a reference-like field, since the whole type is
// never descended into.
#[derive(deep_copy::DeepCopy, Clone, Debug, PartialEq)]
#[deep_copy(immutable)]
struct ImmutablePoco {
    payload: Rc<Vec<i32>>,
}

#[test]
fn immutable_marked_type_aliases_its_payload() {
    assert_eq!(ImmutablePoco::POLICY, Policy::Immutable);

    let x = ImmutablePoco {
        payload: Rc::new(vec![123]),
    };
    let c = copy(&x);

    assert!(Rc::ptr_eq(&c.payload, &x.payload));
}

// Triply nested array: a shared immutable payload recurring at several
// positions in a 2x2x3 nested structure must keep its identity, while the
// overall shape and values are preserved.
#[test]
fn nested_array_preserves_shape_and_shared_identity() {
    let shared = Rc::new(Leaf { value: 42 });
    let row = || vec![Rc::clone(&shared), Rc::new(Leaf { value: 1 }), Rc::clone(&shared)];
    let plane = || vec![row(), row()];
    let original = vec![plane(), plane()];

    let c = copy(&original);

    assert_eq!(c.len(), original.len());
    for (plane_idx, plane) in c.iter().enumerate() {
        assert_eq!(plane.len(), original[plane_idx].len());
        for (row_idx, row) in plane.iter().enumerate() {
            assert_eq!(row.len(), original[plane_idx][row_idx].len());
            for (cell_idx, cell) in row.iter().enumerate() {
                assert_eq!(cell.value, original[plane_idx][row_idx][cell_idx].value);
            }
        }
    }
    assert!(Rc::ptr_eq(&c[0][0][0], &c[0][0][2]));
    assert!(Rc::ptr_eq(&c[0][0][0], &c[1][1][2]));
    assert!(!Rc::ptr_eq(&c[0][0][0], &shared));
}

// A private field, reached only through the struct's own module
// (standing in for a "read-only" field: the copier still writes through it
// regardless).
mod wrap {
    use super::Node;
    use deep_copy::impls::deep_copy_cyclic;
    use deep_copy::{CopyContext, CopyPolicy, DeepCopy, Policy};
    use std::cell::RefCell;
    use std::rc::Rc;

    pub struct Wrap {
        reference: Rc<RefCell<Node>>,
    }

    impl Wrap {
        pub fn new(reference: Rc<RefCell<Node>>) -> Self {
            Wrap { reference }
        }

        pub fn reference(&self) -> &Rc<RefCell<Node>> {
            &self.reference
        }
    }

    impl CopyPolicy for Wrap {
        const POLICY: Policy = Policy::Mutable;
    }

    impl DeepCopy for Wrap {
        fn deep_copy(&self, ctx: &mut CopyContext) -> Self {
            Wrap {
                reference: deep_copy_cyclic(&self.reference, ctx).expect("Node::default() cannot panic"),
            }
        }
    }
}

#[test]
fn private_field_is_copied_through() {
    let p = Rc::new(RefCell::new(Node { value: 1, link: None }));
    p.borrow_mut().link = Some(Rc::clone(&p));
    let w = wrap::Wrap::new(Rc::clone(&p));

    let c = copy(&w);

    assert!(!Rc::ptr_eq(c.reference(), &p));
    let linked = c.reference().borrow().link.clone().unwrap();
    assert!(Rc::ptr_eq(&linked, c.reference()));
}

// A large list of distinct mutables: every element copies to a
// distinct, pairwise-distinct allocation.
#[test]
fn large_list_of_distinct_mutables_stays_pairwise_distinct() {
    use std::collections::HashSet;

    let original: Vec<Rc<Leaf>> = (0..10_000).map(|i| Rc::new(Leaf { value: i })).collect();

    let c = copy(&original);

    assert_eq!(c.len(), original.len());
    let mut addresses = HashSet::with_capacity(c.len());
    for (i, (copied, original)) in c.iter().zip(&original).enumerate() {
        assert_eq!(copied.value, i as i32);
        assert!(!Rc::ptr_eq(copied, original));
        assert!(addresses.insert(Rc::as_ptr(copied) as usize), "duplicate allocation for index {i}");
    }
}
