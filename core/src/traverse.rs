//! Walking, taking apart and copying values.
//!
//! These use the same decoding as unify and compare, so a value is seen the
//! same way by every consumer.

use bumpalo::Bump;
use smallvec::SmallVec;

use rtti_types::{Builtin, TypeCtorRep};

use crate::types::{TypeInfo, TypeTable};
use crate::values::raw::{ArrayData, RawValue, Slice, alloc_cell, cell_word};
use crate::values::value::char_of;
use crate::values::Value;
use crate::{String, ToString, Vec, format};

/// A value taken apart into its functor and arguments.
#[derive(Debug, Clone)]
pub struct Deconstructed<'ty_arena, 'value_arena> {
    /// Functor name. Builtins use their printed value (`42`, `"ab"`), or
    /// `{}` for tuples and `array` for arrays.
    pub name: String,

    /// Functor ordinal, for types with a functor table.
    pub ordinal: Option<u32>,

    /// Type infos carried for existential variables.
    pub exists: Vec<TypeInfo<'ty_arena>>,

    pub args: Vec<Value<'ty_arena, 'value_arena>>,
}

impl Deconstructed<'_, '_> {
    pub fn arity(&self) -> usize {
        self.args.len()
    }
}

/// Trait for visiting values.
///
/// The default implementation visits every argument of every value,
/// depth-first.
pub trait ValueVisitor<'ty_arena, 'value_arena> {
    /// Override this to customize behavior for all values.
    /// Call `super_visit_value` to recurse into arguments.
    fn visit_value(
        &mut self,
        types: &TypeTable<'ty_arena>,
        value: Value<'ty_arena, 'value_arena>,
    ) {
        self.super_visit_value(types, value)
    }

    /// Default recursion into arguments.
    fn super_visit_value(
        &mut self,
        types: &TypeTable<'ty_arena>,
        value: Value<'ty_arena, 'value_arena>,
    ) {
        for child in types.children(value) {
            self.visit_value(types, child);
        }
    }
}

impl<'ty_arena> TypeTable<'ty_arena> {
    /// Immediate arguments of a value.
    pub fn children<'value_arena>(
        &self,
        value: Value<'ty_arena, 'value_arena>,
    ) -> Vec<Value<'ty_arena, 'value_arena>> {
        self.deconstruct(value).args
    }

    pub fn deconstruct<'value_arena>(
        &self,
        value: Value<'ty_arena, 'value_arena>,
    ) -> Deconstructed<'ty_arena, 'value_arena> {
        self.check_owned(value.ty());
        let ty = self.expand(value.ty());
        let raw = value.raw();
        let leaf = |name: String| Deconstructed {
            name,
            ordinal: None,
            exists: Vec::new(),
            args: Vec::new(),
        };
        match ty.ctor().rep() {
            TypeCtorRep::Builtin(builtin) => match builtin {
                Builtin::Int => leaf(raw.int().to_string()),
                Builtin::Char => leaf(format!("{:?}", char_of(raw))),
                Builtin::Float | Builtin::Closure | Builtin::Foreign => {
                    leaf(self.display(value).to_string())
                }
                Builtin::String => {
                    let s = unsafe { Slice::from_raw_value(raw) }.as_str();
                    leaf(format!("{:?}", s))
                }
                Builtin::Array => {
                    let elem_ty = self.array_elem(ty);
                    Deconstructed {
                        args: ArrayData::from_raw_value(raw)
                            .as_slice()
                            .iter()
                            .map(|&elem| Value::new_unchecked(elem_ty, elem))
                            .collect(),
                        ..leaf("array".into())
                    }
                }
                Builtin::Tuple => Deconstructed {
                    args: ty
                        .args()
                        .iter()
                        .enumerate()
                        .map(|(i, &elem_ty)| {
                            Value::new_unchecked(elem_ty, unsafe { cell_word(raw.cell, i) })
                        })
                        .collect(),
                    ..leaf("{}".into())
                },
            },
            TypeCtorRep::Enum(rep) => {
                let functor = self.decode_enum(ty, rep, raw);
                Deconstructed {
                    ordinal: Some(functor.ordinal),
                    ..leaf(functor.name.to_string())
                }
            }
            TypeCtorRep::NoTag(rep) => Deconstructed {
                ordinal: Some(0),
                args: Vec::from([Value::new_unchecked(self.resolve(&rep.arg, ty, &[]), raw)]),
                ..leaf(rep.functor().map_or_else(String::new, |f| f.name.to_string()))
            },
            // `expand` never stops at an equivalence.
            TypeCtorRep::Equiv(_) => leaf(String::new()),
            TypeCtorRep::Du(du) => {
                let decoded = self.decode_du(ty, du, raw);
                let exists = decoded.exists();
                let args = decoded
                    .layout
                    .slots
                    .iter()
                    .map(|slot| {
                        Value::new_unchecked(self.resolve(&slot.ty, ty, &exists), decoded.arg(slot))
                    })
                    .collect();
                Deconstructed {
                    name: decoded.functor.name.to_string(),
                    ordinal: Some(decoded.functor.ordinal),
                    exists: exists.into_vec(),
                    args,
                }
            }
        }
    }

    /// Copy a value and everything it points to into `arena`.
    ///
    /// Closures and foreign values are shared, not copied.
    pub fn deep_copy<'value_arena, 'dest>(
        &self,
        arena: &'dest Bump,
        value: Value<'ty_arena, 'value_arena>,
    ) -> Value<'ty_arena, 'dest> {
        self.check_owned(value.ty());
        Value::new_unchecked(value.ty(), self.copy_raw(arena, value.ty(), value.raw()))
    }

    fn copy_raw(&self, arena: &Bump, ty: TypeInfo<'ty_arena>, raw: RawValue) -> RawValue {
        // The last argument of each copied cell is filled in by this loop, so
        // copying a long list does not grow the stack.
        let (root, mut pending) = self.copy_shallow(arena, ty, raw);
        while let Some(tail) = pending {
            let (word, next) = self.copy_shallow(arena, tail.ty, tail.raw);
            // SAFETY: `hole` points into a cell allocated by `copy_shallow`.
            unsafe { tail.hole.write(word) };
            pending = next;
        }
        root
    }

    /// Copy one level: everything but the last argument of a cell, which is
    /// returned as a [`Tail`] still holding the source word.
    fn copy_shallow(
        &self,
        arena: &Bump,
        ty: TypeInfo<'ty_arena>,
        raw: RawValue,
    ) -> (RawValue, Option<Tail<'ty_arena>>) {
        match ty.ctor().rep() {
            TypeCtorRep::Builtin(builtin) => (self.copy_builtin(arena, *builtin, ty, raw), None),
            TypeCtorRep::Enum(_) => (raw, None),
            TypeCtorRep::NoTag(rep) => {
                self.copy_shallow(arena, self.resolve(&rep.arg, ty, &[]), raw)
            }
            TypeCtorRep::Equiv(target) => {
                self.copy_shallow(arena, self.resolve(target, ty, &[]), raw)
            }
            TypeCtorRep::Du(du) => {
                let decoded = self.decode_du(ty, du, raw);
                if !decoded.layout.has_cell() {
                    return (raw, None);
                }
                let exists = decoded.exists();
                let mut words: SmallVec<[RawValue; 8]> = (0..decoded.layout.cell_words)
                    .map(|offset| decoded.raw_word(offset))
                    .collect();
                for (&locn, exist) in decoded.layout.exist_locns.iter().zip(&exists) {
                    let carried: &TypeInfo<'ty_arena> = arena.alloc(*exist);
                    words[locn as usize] = RawValue {
                        type_info: carried as *const TypeInfo<'ty_arena> as *const (),
                    };
                }
                let last = decoded.layout.slots.split_last().map(|(last, init)| {
                    for slot in init {
                        let arg_ty = self.resolve(&slot.ty, ty, &exists);
                        words[slot.offset as usize] =
                            self.copy_raw(arena, arg_ty, decoded.arg(slot));
                    }
                    last
                });
                let cell = arena.alloc_slice_copy(&words).as_mut_ptr();
                let tail = last.map(|slot| Tail {
                    hole: cell.wrapping_add(slot.offset as usize),
                    ty: self.resolve(&slot.ty, ty, &exists),
                    raw: decoded.arg(slot),
                });
                (RawValue::tagged(cell.cast_const(), raw.ptag()), tail)
            }
        }
    }

    fn copy_builtin(
        &self,
        arena: &Bump,
        builtin: Builtin,
        ty: TypeInfo<'ty_arena>,
        raw: RawValue,
    ) -> RawValue {
        match builtin {
            Builtin::Int | Builtin::Char | Builtin::Float => raw,
            Builtin::Closure | Builtin::Foreign => raw,
            Builtin::String => {
                Slice::new(arena, unsafe { Slice::from_raw_value(raw) }.as_str()).as_raw_value()
            }
            Builtin::Array => {
                let elem_ty = self.array_elem(ty);
                let elems: SmallVec<[RawValue; 8]> = ArrayData::from_raw_value(raw)
                    .as_slice()
                    .iter()
                    .map(|&elem| self.copy_raw(arena, elem_ty, elem))
                    .collect();
                ArrayData::new_with(arena, &elems).as_raw_value()
            }
            Builtin::Tuple if ty.args().is_empty() => raw,
            Builtin::Tuple => {
                let words: SmallVec<[RawValue; 4]> = ty
                    .args()
                    .iter()
                    .enumerate()
                    .map(|(i, &elem_ty)| {
                        self.copy_raw(arena, elem_ty, unsafe { cell_word(raw.cell, i) })
                    })
                    .collect();
                RawValue {
                    cell: alloc_cell(arena, &words),
                }
            }
        }
    }
}

/// Last argument word of a freshly copied cell.
struct Tail<'ty_arena> {
    hole: *mut RawValue,
    ty: TypeInfo<'ty_arena>,
    raw: RawValue,
}
