//! Algebraic properties of unify and compare over generated values.

mod common;

use std::cmp::Ordering;

use bumpalo::Bump;
use once_cell::sync::Lazy;
use proptest::prelude::*;
use rtti_core::{Registry, RegistryBuilder, TypeCtorInfo, TypeTable, Value};
use rtti_types::{DuBuilder, FunctorDecl, TypeCtorKey};

use common::{Shape, build, builtin, item_ty};

static REGISTRY: Lazy<Registry> = Lazy::new(common::registry);

fn leaf() -> impl Strategy<Value = Shape> {
    // Narrow ranges so that equal values turn up often.
    prop_oneof![
        Just(Shape::None),
        Just(Shape::Small),
        (-3i64..3).prop_map(Shape::Num),
        "[ab]{0,2}".prop_map(Shape::Text),
        (0u8..3).prop_map(Shape::Flag),
        prop_oneof![
            Just(0.0),
            Just(-0.0),
            Just(1.5),
            Just(f64::NAN),
            Just(f64::NEG_INFINITY),
        ]
        .prop_map(Shape::Real),
        (-2i64..2).prop_map(Shape::BoxedInt),
        "[ab]?".prop_map(Shape::BoxedText),
        (-2i64..2).prop_map(Shape::Wrapped),
        (-1i64..1, "[ab]?").prop_map(|(n, s)| Shape::Tup(n, s)),
    ]
}

fn shape() -> impl Strategy<Value = Shape> {
    leaf().prop_recursive(4, 24, 3, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone())
                .prop_map(|(a, b)| Shape::Pair(Box::new(a), Box::new(b))),
            prop::collection::vec(inner, 0..3).prop_map(Shape::Items),
        ]
    })
}

/// Build each shape in its own arena and run `f` on the values.
fn with_values<R>(
    shapes: &[&Shape],
    f: impl for<'t, 'v> FnOnce(&TypeTable<'t>, &[Value<'t, 'v>]) -> R,
) -> R {
    let ty_arena = Bump::new();
    let types = TypeTable::new(&REGISTRY, &ty_arena);
    let arenas: Vec<Bump> = shapes.iter().map(|_| Bump::new()).collect();
    let values: Vec<_> = shapes
        .iter()
        .zip(&arenas)
        .map(|(shape, arena)| build(arena, &types, shape))
        .collect();
    f(&types, &values)
}

fn unify(types: &TypeTable<'_>, a: Value<'_, '_>, b: Value<'_, '_>) -> bool {
    assert!(a.ty() == item_ty(types));
    REGISTRY.unify(a, b)
}

fn compare(types: &TypeTable<'_>, a: Value<'_, '_>, b: Value<'_, '_>) -> Ordering {
    assert!(a.ty() == item_ty(types));
    REGISTRY.compare(a, b)
}

proptest! {
    #[test]
    fn test_unify_is_reflexive(a in shape()) {
        with_values(&[&a, &a], |types, v| {
            prop_assert!(unify(types, v[0], v[0]));
            // Equal structure in separate arenas.
            prop_assert!(unify(types, v[0], v[1]));
            Ok(())
        })?;
    }

    #[test]
    fn test_unify_is_symmetric(a in shape(), b in shape()) {
        with_values(&[&a, &b], |types, v| {
            prop_assert_eq!(unify(types, v[0], v[1]), unify(types, v[1], v[0]));
            Ok(())
        })?;
    }

    #[test]
    fn test_unify_is_transitive(a in shape(), b in shape(), c in shape()) {
        with_values(&[&a, &b, &c], |types, v| {
            if unify(types, v[0], v[1]) && unify(types, v[1], v[2]) {
                prop_assert!(unify(types, v[0], v[2]));
            }
            Ok(())
        })?;
    }

    #[test]
    fn test_compare_agrees_with_unify(a in shape(), b in shape()) {
        with_values(&[&a, &b], |types, v| {
            prop_assert_eq!(
                compare(types, v[0], v[1]) == Ordering::Equal,
                unify(types, v[0], v[1])
            );
            Ok(())
        })?;
    }

    #[test]
    fn test_compare_is_antisymmetric(a in shape(), b in shape()) {
        with_values(&[&a, &b], |types, v| {
            prop_assert_eq!(compare(types, v[0], v[1]), compare(types, v[1], v[0]).reverse());
            Ok(())
        })?;
    }

    #[test]
    fn test_compare_is_transitive(a in shape(), b in shape(), c in shape()) {
        with_values(&[&a, &b, &c], |types, v| {
            let ab = compare(types, v[0], v[1]);
            let bc = compare(types, v[1], v[2]);
            if ab != Ordering::Greater && bc != Ordering::Greater {
                let ac = compare(types, v[0], v[2]);
                prop_assert_ne!(ac, Ordering::Greater);
                if ab == Ordering::Less || bc == Ordering::Less {
                    prop_assert_eq!(ac, Ordering::Less);
                }
            }
            Ok(())
        })?;
    }

    #[test]
    fn test_sort_is_consistent(shapes in prop::collection::vec(shape(), 1..8)) {
        let refs: Vec<&Shape> = shapes.iter().collect();
        with_values(&refs, |types, v| {
            let mut sorted = v.to_vec();
            sorted.sort_by(|a, b| compare(types, *a, *b));
            for pair in sorted.windows(2) {
                prop_assert_ne!(compare(types, pair[0], pair[1]), Ordering::Greater);
            }
            Ok(())
        })?;
    }

    #[test]
    fn test_deep_copy_is_equal(a in shape()) {
        with_values(&[&a], |types, v| {
            let dest = Bump::new();
            let copy = types.deep_copy(&dest, v[0]);
            prop_assert!(unify(types, v[0], copy));
            prop_assert_eq!(types.display(v[0]).to_string(), types.display(copy).to_string());
            Ok(())
        })?;
    }

    /// Whatever tags the builder hands out, decoding a constructed value
    /// yields the functor it was built with, and the order follows ordinals.
    #[test]
    fn test_tag_round_trip(constants in prop::collection::vec(any::<bool>(), 1..20)) {
        let mut rep = DuBuilder::new();
        for (i, &constant) in constants.iter().enumerate() {
            let decl = FunctorDecl::new(format!("f{i}"));
            rep = rep.functor(if constant { decl } else { decl.arg(builtin("int")) });
        }
        let mut builder = RegistryBuilder::new();
        builder
            .register(TypeCtorInfo::new(
                TypeCtorKey::new("prop", "wide", 0),
                rep.build().unwrap(),
            ))
            .unwrap();
        let registry = builder.build().unwrap();
        let arena = Bump::new();
        let types = TypeTable::new(&registry, &arena);
        let ty = types.lookup("prop", "wide", &[]).unwrap();

        let values: Vec<_> = constants
            .iter()
            .enumerate()
            .map(|(i, &constant)| {
                let args = if constant { vec![] } else { vec![Value::int(&types, i as i64)] };
                Value::construct(&arena, &types, ty, &format!("f{i}"), &args).unwrap()
            })
            .collect();

        for (i, value) in values.iter().enumerate() {
            let parts = types.deconstruct(*value);
            prop_assert_eq!(parts.ordinal, Some(i as u32));
            prop_assert_eq!(parts.name, format!("f{i}"));
        }
        for pair in values.windows(2) {
            prop_assert_eq!(types.compare(pair[0], pair[1]), Ordering::Less);
        }
    }
}
