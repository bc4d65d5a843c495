use core::cmp::Ordering;

use bumpalo::Bump;
use pretty_assertions::assert_eq;
use rtti_types::layout::local_word;
use rtti_types::{TypeCtorKey, TypeCtorRep};

use crate::test_utils::{fixture_registry, init_test_logging};
use crate::{RawValue, RegistryBuilder, SpecialProcs, TypeCtorInfo, TypeInfo, TypeTable, Value};

fn list<'t, 'v>(arena: &'v Bump, types: &TypeTable<'t>, items: &[i64]) -> Value<'t, 'v> {
    let ty = types.lookup("test", "list", &[types.int()]).unwrap();
    let mut acc = Value::construct(arena, types, ty, "nil", &[]).unwrap();
    for &item in items.iter().rev() {
        acc = Value::construct(arena, types, ty, "cons", &[Value::int(types, item), acc]).unwrap();
    }
    acc
}

fn assert_order<'t>(types: &TypeTable<'t>, lesser: Value<'t, '_>, greater: Value<'t, '_>) {
    assert_eq!(lesser.ty(), greater.ty());
    assert_eq!(types.compare(lesser, greater), Ordering::Less);
    assert_eq!(types.compare(greater, lesser), Ordering::Greater);
    assert!(!types.unify(lesser, greater));
    assert!(types.unify(lesser, lesser));
    assert_eq!(types.compare(lesser, lesser), Ordering::Equal);
}

#[test]
fn test_ints_and_chars() {
    let registry = fixture_registry();
    let arena = Bump::new();
    let types = TypeTable::new(&registry, &arena);

    assert_order(&types, Value::int(&types, -3), Value::int(&types, 2));
    assert_order(&types, Value::char(&types, 'a'), Value::char(&types, 'b'));
}

#[test]
fn test_floats() {
    let registry = fixture_registry();
    let arena = Bump::new();
    let types = TypeTable::new(&registry, &arena);

    assert_order(&types, Value::float(&types, 1.5), Value::float(&types, 2.0));
    assert_order(&types, Value::float(&types, -0.0), Value::float(&types, 0.0));

    let nan = Value::float(&types, f64::NAN);
    assert!(types.unify(nan, nan));
    assert_eq!(types.compare(nan, nan), Ordering::Equal);
}

#[test]
fn test_strings_compare_bytewise() {
    let registry = fixture_registry();
    let arena = Bump::new();
    let types = TypeTable::new(&registry, &arena);

    let ab = Value::string(&arena, &types, "ab");
    let b = Value::string(&arena, &types, "b");
    let ab2 = Value::string(&arena, &types, "ab");
    assert_order(&types, ab, b);
    assert_order(&types, Value::string(&arena, &types, ""), ab);
    assert!(types.unify(ab, ab2));
}

#[test]
fn test_enumerations_follow_ordinals() {
    let registry = fixture_registry();
    let arena = Bump::new();
    let types = TypeTable::new(&registry, &arena);
    let color = types.lookup("test", "color", &[]).unwrap();

    let red = Value::enumeration(&types, color, "red").unwrap();
    let green = Value::enumeration(&types, color, "green").unwrap();
    let blue = Value::enumeration(&types, color, "blue").unwrap();
    assert_order(&types, red, green);
    assert_order(&types, green, blue);
    assert_order(&types, red, blue);
}

#[test]
fn test_lists() {
    let registry = fixture_registry();
    let arena = Bump::new();
    let types = TypeTable::new(&registry, &arena);

    assert_order(&types, list(&arena, &types, &[]), list(&arena, &types, &[1]));
    assert_order(&types, list(&arena, &types, &[1, 2]), list(&arena, &types, &[1, 3]));
    assert_order(&types, list(&arena, &types, &[1, 2]), list(&arena, &types, &[1, 2, 0]));
    assert_order(&types, list(&arena, &types, &[1, 9]), list(&arena, &types, &[2]));

    let a = list(&arena, &types, &[4, 5, 6]);
    let b = list(&arena, &types, &[4, 5, 6]);
    assert!(types.unify(a, b));
}

#[test]
fn test_shared_primary_tag() {
    let registry = fixture_registry();
    let arena = Bump::new();
    let types = TypeTable::new(&registry, &arena);
    let abc = types.lookup("test", "abc", &[]).unwrap();

    let a = Value::construct(&arena, &types, abc, "a", &[]).unwrap();
    let b = Value::construct(&arena, &types, abc, "b", &[]).unwrap();
    let c = Value::construct(&arena, &types, abc, "c", &[Value::int(&types, 0)]).unwrap();
    assert_order(&types, a, b);
    assert_order(&types, b, c);
    assert_order(&types, a, c);
}

#[test]
fn test_no_tag_and_equivalence() {
    let registry = fixture_registry();
    let arena = Bump::new();
    let types = TypeTable::new(&registry, &arena);

    let wrap = types.lookup("test", "wrap", &[]).unwrap();
    let w = |n| Value::construct(&arena, &types, wrap, "wrap", &[Value::int(&types, n)]).unwrap();
    assert_order(&types, w(4), w(5));
    assert!(types.unify(w(5), w(5)));

    let ints = types.lookup("test", "ints", &[]).unwrap();
    let short = list(&arena, &types, &[1]);
    let long = list(&arena, &types, &[1, 1]);
    // SAFETY: `ints` is an equivalence for `list(int)`.
    let (short, long) = unsafe {
        (
            Value::from_raw(ints, short.raw()),
            Value::from_raw(ints, long.raw()),
        )
    };
    assert_eq!(types.compare(short, long), Ordering::Less);
    assert!(types.unify(long, long));
}

#[test]
fn test_arrays_compare_length_first() {
    let registry = fixture_registry();
    let arena = Bump::new();
    let types = TypeTable::new(&registry, &arena);
    let ty = types.array(types.int());
    let array = |items: &[i64]| {
        let elems: Vec<_> = items.iter().map(|&n| Value::int(&types, n)).collect();
        Value::array(&arena, ty, &elems).unwrap()
    };

    assert_order(&types, array(&[9]), array(&[1, 2]));
    assert_order(&types, array(&[1, 2]), array(&[1, 3]));
    assert_order(&types, array(&[]), array(&[0]));
}

#[test]
fn test_tuples_compare_lexicographically() {
    let registry = fixture_registry();
    let arena = Bump::new();
    let types = TypeTable::new(&registry, &arena);
    let pair = |n: i64, s: &str| {
        Value::tuple(
            &arena,
            &types,
            &[Value::int(&types, n), Value::string(&arena, &types, s)],
        )
    };

    assert_order(&types, pair(1, "z"), pair(2, "a"));
    assert_order(&types, pair(1, "a"), pair(1, "b"));

    let empty = Value::tuple(&arena, &types, &[]);
    assert!(types.unify(empty, empty));
    assert_eq!(types.compare(empty, empty), Ordering::Equal);
}

#[test]
fn test_existentials_compare_types_first() {
    let registry = fixture_registry();
    let arena = Bump::new();
    let types = TypeTable::new(&registry, &arena);
    let univ = types.lookup("test", "univ", &[]).unwrap();
    let boxed = |arg| Value::construct(&arena, &types, univ, "univ", &[arg]).unwrap();

    let int_box = boxed(Value::int(&types, 100));
    let str_box = boxed(Value::string(&arena, &types, "a"));
    // int sorts before string whatever the payloads are.
    assert_order(&types, int_box, str_box);
    assert_order(&types, boxed(Value::int(&types, 1)), int_box);
    assert!(types.unify(int_box, boxed(Value::int(&types, 100))));
}

#[test]
fn test_closures_and_foreign_by_identity() {
    let registry = fixture_registry();
    let arena = Bump::new();
    let types = TypeTable::new(&registry, &arena);

    let f = Value::closure(&arena, &types, "f", &[]);
    let g = Value::closure(&arena, &types, "f", &[]);
    assert!(types.unify(f, f));
    assert!(!types.unify(f, g));
    assert_ne!(types.compare(f, g), Ordering::Equal);

    let cells = [0u64; 2];
    let p = Value::foreign(&types, &cells[0] as *const u64 as *const ());
    let q = Value::foreign(&types, &cells[1] as *const u64 as *const ());
    assert_order(&types, p, q);
}

#[test]
fn test_long_lists_do_not_grow_the_stack() {
    let registry = fixture_registry();
    let arena = Bump::new();
    let types = TypeTable::new(&registry, &arena);

    let items: Vec<i64> = (0..200_000).collect();
    let a = list(&arena, &types, &items);
    let b = list(&arena, &types, &items);
    assert!(types.unify(a, b));
    assert_eq!(types.compare(a, b), Ordering::Equal);
}

#[test]
fn test_long_lists_copy_and_print_without_growing_the_stack() {
    let registry = fixture_registry();
    let arena = Bump::new();
    let types = TypeTable::new(&registry, &arena);

    let items: Vec<i64> = (0..200_000).collect();
    let a = list(&arena, &types, &items);
    let dest = Bump::new();
    let copy = types.deep_copy(&dest, a);
    assert_ne!(copy.raw().word(), a.raw().word());
    assert!(types.unify(a, copy));

    let printed = types.display(copy).to_string();
    assert!(printed.starts_with("cons(0, cons(1, cons(2, "));
    assert!(printed.ends_with(&format!("cons(199999, nil{}", ")".repeat(items.len()))));
}

unsafe fn flipped_unify<'a>(
    types: &TypeTable<'a>,
    ty: TypeInfo<'a>,
    a: RawValue,
    b: RawValue,
) -> bool {
    unsafe { types.unify_generic(ty, a, b) }
}

unsafe fn flipped_compare<'a>(
    types: &TypeTable<'a>,
    ty: TypeInfo<'a>,
    a: RawValue,
    b: RawValue,
) -> Ordering {
    unsafe { types.compare_generic(ty, b, a) }
}

#[test]
fn test_specialized_procedures_take_over() {
    init_test_logging();
    let mut builder = RegistryBuilder::new();
    builder
        .register(
            TypeCtorInfo::new(
                TypeCtorKey::new("test", "rank", 0),
                TypeCtorRep::enumeration(["low", "high"]),
            )
            .with_special(SpecialProcs {
                unify: flipped_unify,
                compare: flipped_compare,
            }),
        )
        .unwrap();
    let registry = builder.build().unwrap();
    let arena = Bump::new();
    let types = TypeTable::new(&registry, &arena);
    let rank = types.lookup("test", "rank", &[]).unwrap();

    let low = Value::enumeration(&types, rank, "low").unwrap();
    let high = Value::enumeration(&types, rank, "high").unwrap();
    assert_eq!(types.compare(low, high), Ordering::Greater);
    // SAFETY: both words come from values of type `rank`.
    let generic = unsafe { types.compare_generic(rank, low.raw(), high.raw()) };
    assert_eq!(generic, Ordering::Less);
    assert!(types.unify(low, low));

    // Reached through a tuple argument as well.
    let pair = |v| Value::tuple(&arena, &types, &[v]);
    let (p_low, p_high) = (pair(low), pair(high));
    assert_eq!(types.compare(p_low, p_high), Ordering::Greater);
}

#[test]
fn test_registry_entry_points() {
    let registry = fixture_registry();
    let arena = Bump::new();
    let types = TypeTable::new(&registry, &arena);

    let a = list(&arena, &types, &[1, 2]);
    let b = list(&arena, &types, &[1, 3]);
    assert!(registry.unify(a, a));
    assert!(!registry.unify(a, b));
    assert_eq!(registry.compare(a, b), Ordering::Less);
    // SAFETY: both words come from values of type `list(int)`.
    let raw = unsafe { registry.compare_raw(a.ty(), b.raw(), a.raw()) };
    assert_eq!(raw, Ordering::Greater);
}

#[test]
#[should_panic(expected = "RTTI internal consistency failure")]
fn test_operand_type_mismatch_is_fatal() {
    let registry = fixture_registry();
    let arena = Bump::new();
    let types = TypeTable::new(&registry, &arena);
    registry.compare(Value::int(&types, 1), Value::float(&types, 1.0));
}

#[test]
#[should_panic(expected = "RTTI internal consistency failure")]
fn test_table_operand_type_mismatch_is_fatal() {
    let registry = fixture_registry();
    let arena = Bump::new();
    let types = TypeTable::new(&registry, &arena);
    // An int word never reaches the string comparison.
    types.unify(Value::int(&types, 0x10), Value::string(&arena, &types, "x"));
}

#[test]
#[should_panic(expected = "RTTI internal consistency failure")]
fn test_unused_primary_tag_is_fatal() {
    let registry = fixture_registry();
    let arena = Bump::new();
    let types = TypeTable::new(&registry, &arena);
    let ty = types.lookup("test", "list", &[types.int()]).unwrap();
    let bogus = RawValue::from_word(local_word(5, 0));
    // SAFETY: tag decoding rejects the word before any cell is read.
    unsafe { types.unify_raw(ty, bogus, bogus) };
}

#[test]
#[should_panic(expected = "RTTI internal consistency failure")]
fn test_enum_ordinal_out_of_range_is_fatal() {
    let registry = fixture_registry();
    let arena = Bump::new();
    let types = TypeTable::new(&registry, &arena);
    let color = types.lookup("test", "color", &[]).unwrap();
    // SAFETY: enumerations are never dereferenced.
    unsafe { types.compare_raw(color, RawValue::from_word(0), RawValue::from_word(3)) };
}

#[test]
#[should_panic(expected = "RTTI internal consistency failure")]
fn test_descriptor_from_other_registry_is_fatal() {
    let registry = fixture_registry();
    let other = fixture_registry();
    let arena = Bump::new();
    let types = TypeTable::new(&registry, &arena);
    let other_types = TypeTable::new(&other, &arena);
    let zero = Value::int(&other_types, 0);
    types.unify(zero, zero);
}
