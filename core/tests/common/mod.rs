//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use bumpalo::Bump;
use rtti_core::{Registry, RegistryBuilder, TypeCtorInfo, TypeInfo, TypeTable, Value};
use rtti_types::{DuBuilder, FunctorDecl, PseudoTypeInfo, Sectag, TypeCtorKey, TypeCtorRep};

pub fn builtin(name: &'static str) -> PseudoTypeInfo {
    PseudoTypeInfo::ground(TypeCtorKey::new("builtin", name, 0))
}

pub fn ground(name: &'static str) -> PseudoTypeInfo {
    PseudoTypeInfo::ground(TypeCtorKey::new("test", name, 0))
}

pub fn list_of(elem: PseudoTypeInfo) -> PseudoTypeInfo {
    PseudoTypeInfo::ctor(TypeCtorKey::new("test", "list", 1), [elem])
}

/// Descriptors used across the integration tests.
///
/// `test.item` has enough functors to use every kind of secondary tag: two
/// constants share primary tag 0 locally and the last three share the final
/// primary tag remotely.
pub fn ctors() -> Vec<TypeCtorInfo> {
    let list = DuBuilder::new()
        .constant("nil")
        .functor(
            FunctorDecl::new("cons")
                .arg(PseudoTypeInfo::param(0))
                .arg(list_of(PseudoTypeInfo::param(0))),
        )
        .build()
        .unwrap();
    let abc = DuBuilder::new()
        .functor(FunctorDecl::new("a").tag(0, Sectag::Local(0)))
        .functor(FunctorDecl::new("b").tag(0, Sectag::Local(1)))
        .functor(FunctorDecl::new("c").arg(builtin("int")).tag(1, Sectag::None))
        .build()
        .unwrap();
    let tuple = PseudoTypeInfo::ctor(
        TypeCtorKey::new("builtin", "{}", 0),
        [builtin("int"), builtin("string")],
    );
    let item = DuBuilder::new()
        .constant("none")
        .constant("small")
        .functor(FunctorDecl::new("num").arg(builtin("int")))
        .functor(FunctorDecl::new("text").arg(builtin("string")))
        .functor(FunctorDecl::new("pair").arg(ground("item")).arg(ground("item")))
        .functor(FunctorDecl::new("items").arg(list_of(ground("item"))))
        .functor(FunctorDecl::new("flag").arg(ground("color")))
        .functor(FunctorDecl::new("real").arg(builtin("float")))
        .functor(FunctorDecl::new("boxed").exist(1).arg(PseudoTypeInfo::exist(0)))
        .functor(FunctorDecl::new("wrapped").field("inner", ground("wrap")))
        .functor(FunctorDecl::new("tup").arg(tuple))
        .build()
        .unwrap();
    vec![
        TypeCtorInfo::new(TypeCtorKey::new("test", "list", 1), list),
        TypeCtorInfo::new(
            TypeCtorKey::new("test", "color", 0),
            TypeCtorRep::enumeration(["red", "green", "blue"]),
        ),
        TypeCtorInfo::new(
            TypeCtorKey::new("test", "wrap", 0),
            TypeCtorRep::no_tag("wrap", builtin("int")),
        ),
        TypeCtorInfo::new(TypeCtorKey::new("test", "abc", 0), abc),
        TypeCtorInfo::new(TypeCtorKey::new("test", "item", 0), item),
    ]
}

pub fn registry() -> Registry {
    let mut builder = RegistryBuilder::new();
    builder.register_all(ctors()).unwrap();
    builder.build().unwrap()
}

pub fn list_ty<'t>(types: &TypeTable<'t>, elem: TypeInfo<'t>) -> TypeInfo<'t> {
    types.lookup("test", "list", &[elem]).unwrap()
}

pub fn item_ty<'t>(types: &TypeTable<'t>) -> TypeInfo<'t> {
    types.lookup("test", "item", &[]).unwrap()
}

/// Plain description of a `test.item` value.
#[derive(Debug, Clone)]
pub enum Shape {
    None,
    Small,
    Num(i64),
    Text(String),
    Pair(Box<Shape>, Box<Shape>),
    Items(Vec<Shape>),
    Flag(u8),
    Real(f64),
    BoxedInt(i64),
    BoxedText(String),
    Wrapped(i64),
    Tup(i64, String),
}

pub fn build<'t, 'v>(arena: &'v Bump, types: &TypeTable<'t>, shape: &Shape) -> Value<'t, 'v> {
    let item = item_ty(types);
    let construct = |name: &str, args: &[Value<'t, 'v>]| {
        Value::construct(arena, types, item, name, args).unwrap()
    };
    match shape {
        Shape::None => construct("none", &[]),
        Shape::Small => construct("small", &[]),
        Shape::Num(n) => construct("num", &[Value::int(types, *n)]),
        Shape::Text(s) => construct("text", &[Value::string(arena, types, s)]),
        Shape::Pair(a, b) => {
            let (a, b) = (build(arena, types, a), build(arena, types, b));
            construct("pair", &[a, b])
        }
        Shape::Items(items) => {
            let elems: Vec<_> = items.iter().map(|s| build(arena, types, s)).collect();
            construct("items", &[list(arena, types, item, &elems)])
        }
        Shape::Flag(n) => {
            let color = types.lookup("test", "color", &[]).unwrap();
            let name = ["red", "green", "blue"][*n as usize % 3];
            construct("flag", &[Value::enumeration(types, color, name).unwrap()])
        }
        Shape::Real(x) => construct("real", &[Value::float(types, *x)]),
        Shape::BoxedInt(n) => construct("boxed", &[Value::int(types, *n)]),
        Shape::BoxedText(s) => construct("boxed", &[Value::string(arena, types, s)]),
        Shape::Wrapped(n) => {
            let wrap = types.lookup("test", "wrap", &[]).unwrap();
            let inner = Value::construct(arena, types, wrap, "wrap", &[Value::int(types, *n)])
                .unwrap();
            construct("wrapped", &[inner])
        }
        Shape::Tup(n, s) => {
            let tuple = Value::tuple(
                arena,
                types,
                &[Value::int(types, *n), Value::string(arena, types, s)],
            );
            construct("tup", &[tuple])
        }
    }
}

/// A `test.list` of already built elements.
pub fn list<'t, 'v>(
    arena: &'v Bump,
    types: &TypeTable<'t>,
    elem: TypeInfo<'t>,
    elems: &[Value<'t, 'v>],
) -> Value<'t, 'v> {
    let ty = list_ty(types, elem);
    let mut acc = Value::construct(arena, types, ty, "nil", &[]).unwrap();
    for &elem in elems.iter().rev() {
        acc = Value::construct(arena, types, ty, "cons", &[elem, acc]).unwrap();
    }
    acc
}

pub fn int_list<'t, 'v>(arena: &'v Bump, types: &TypeTable<'t>, items: &[i64]) -> Value<'t, 'v> {
    let elems: Vec<_> = items.iter().map(|&n| Value::int(types, n)).collect();
    list(arena, types, types.int(), &elems)
}
