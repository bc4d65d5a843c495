use bumpalo::Bump;
use smallvec::{SmallVec, smallvec};

use rtti_types::{Builtin, Functor, PseudoTypeInfo, TagEncoding, TypeCtorRep};

use crate::errors::{FatalError, TypeError, fatal};
use crate::types::{TypeInfo, TypeTable};
use crate::values::raw::{ArrayData, ClosureData, RawValue, Slice, alloc_cell};
use crate::{ToString, Vec};

/// A raw word paired with the type info that says how to read it.
#[derive(Clone, Copy)]
pub struct Value<'ty_arena, 'value_arena> {
    ty: TypeInfo<'ty_arena>,
    raw: RawValue,
    _phantom: core::marker::PhantomData<&'value_arena ()>,
}

impl<'ty_arena, 'value_arena> core::fmt::Debug for Value<'ty_arena, 'value_arena> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Value<{}>({:?})", self.ty, self.raw)
    }
}

impl<'ty_arena, 'value_arena> Value<'ty_arena, 'value_arena> {
    pub(crate) fn new_unchecked(ty: TypeInfo<'ty_arena>, raw: RawValue) -> Self {
        Self {
            ty,
            raw,
            _phantom: core::marker::PhantomData,
        }
    }

    /// Wrap a word produced by compiled code.
    ///
    /// # Safety
    ///
    /// `raw` must be a valid value of type `ty` whose payload lives in an
    /// arena outliving `'value_arena`.
    pub unsafe fn from_raw(ty: TypeInfo<'ty_arena>, raw: RawValue) -> Self {
        Self::new_unchecked(ty, raw)
    }

    pub fn ty(&self) -> TypeInfo<'ty_arena> {
        self.ty
    }

    pub fn raw(&self) -> RawValue {
        self.raw
    }

    // ============================================================================
    // Builtins
    // ============================================================================

    pub fn int(types: &TypeTable<'ty_arena>, value: i64) -> Self {
        Self::new_unchecked(types.int(), RawValue::from_int(value))
    }

    pub fn float(types: &TypeTable<'ty_arena>, value: f64) -> Self {
        Self::new_unchecked(types.float(), RawValue::from_float(value))
    }

    pub fn char(types: &TypeTable<'ty_arena>, value: char) -> Self {
        Self::new_unchecked(types.char(), RawValue::from_int(value as i64))
    }

    pub fn string(arena: &'value_arena Bump, types: &TypeTable<'ty_arena>, value: &str) -> Self {
        Self::new_unchecked(types.string(), Slice::new(arena, value).as_raw_value())
    }

    /// An array of type `ty`; every element must have its element type.
    pub fn array(
        arena: &'value_arena Bump,
        ty: TypeInfo<'ty_arena>,
        elements: &[Value<'ty_arena, 'value_arena>],
    ) -> Result<Self, TypeError> {
        let elem_ty = match (ty.builtin(), ty.arg(0)) {
            (Some(Builtin::Array), Some(elem_ty)) => elem_ty,
            _ => {
                return Err(TypeError::WrongKind {
                    ctor: ty.to_string(),
                    expected: "an array type",
                });
            }
        };
        for elem in elements {
            check_type(elem_ty, elem.ty)?;
        }
        let raw_values: SmallVec<[RawValue; 8]> = elements.iter().map(|v| v.raw).collect();
        let data = ArrayData::new_with(arena, &raw_values);
        Ok(Self::new_unchecked(ty, data.as_raw_value()))
    }

    /// A tuple; its type is the tuple of the elements' types.
    pub fn tuple(
        arena: &'value_arena Bump,
        types: &TypeTable<'ty_arena>,
        elements: &[Value<'ty_arena, 'value_arena>],
    ) -> Self {
        let tys: SmallVec<[TypeInfo<'ty_arena>; 4]> = elements.iter().map(|v| v.ty).collect();
        let raw = if elements.is_empty() {
            RawValue::from_word(0)
        } else {
            let words: SmallVec<[RawValue; 4]> = elements.iter().map(|v| v.raw).collect();
            RawValue {
                cell: alloc_cell(arena, &words),
            }
        };
        Self::new_unchecked(types.tuple(&tys), raw)
    }

    /// An opaque closure. Closures compare by identity.
    pub fn closure(
        arena: &'value_arena Bump,
        types: &TypeTable<'ty_arena>,
        name: &str,
        arg_types: &[TypeInfo<'ty_arena>],
    ) -> Self {
        let data = ClosureData::new(arena, name);
        Self::new_unchecked(types.closure(arg_types), data.as_raw_value())
    }

    /// A foreign pointer, compared by address.
    pub fn foreign(types: &TypeTable<'ty_arena>, ptr: *const ()) -> Self {
        Self::new_unchecked(types.c_pointer(), RawValue { foreign: ptr })
    }

    // ============================================================================
    // User-defined types
    // ============================================================================

    /// A constant of an enumeration type.
    pub fn enumeration(
        types: &TypeTable<'ty_arena>,
        ty: TypeInfo<'ty_arena>,
        name: &str,
    ) -> Result<Self, TypeError> {
        check_registered(types, ty)?;
        let expanded = types.expand(ty);
        let TypeCtorRep::Enum(rep) = expanded.ctor().rep() else {
            return Err(TypeError::WrongKind {
                ctor: expanded.to_string(),
                expected: "an enumeration",
            });
        };
        let functor = rep
            .functors
            .find(name, 0)
            .ok_or_else(|| unknown_functor(expanded, name, 0))?;
        Ok(Self::new_unchecked(
            ty,
            RawValue::from_word(functor.ordinal as usize),
        ))
    }

    /// Apply functor `name` of type `ty` to `args`.
    ///
    /// Each argument must have the type its slot resolves to. Existentially
    /// typed slots take their type from the argument; the bound type infos
    /// are stored in the cell.
    pub fn construct(
        arena: &'value_arena Bump,
        types: &TypeTable<'ty_arena>,
        ty: TypeInfo<'ty_arena>,
        name: &str,
        args: &[Value<'ty_arena, 'value_arena>],
    ) -> Result<Self, TypeError> {
        check_registered(types, ty)?;
        let expanded = types.expand(ty);
        let raw = match expanded.ctor().rep() {
            TypeCtorRep::Enum(_) => {
                if !args.is_empty() {
                    return Err(unknown_functor(expanded, name, args.len()));
                }
                return Self::enumeration(types, ty, name);
            }
            TypeCtorRep::NoTag(rep) => {
                let [arg] = args else {
                    return Err(unknown_functor(expanded, name, args.len()));
                };
                if rep.functors.find(name, 1).is_none() {
                    return Err(unknown_functor(expanded, name, 1));
                }
                check_type(types.resolve(&rep.arg, expanded, &[]), arg.ty)?;
                arg.raw
            }
            TypeCtorRep::Du(du) => {
                let functor = du
                    .functors
                    .find(name, args.len() as u16)
                    .ok_or_else(|| unknown_functor(expanded, name, args.len()))?;
                let Some(layout) = du.layout.functor(functor.ordinal) else {
                    fatal(FatalError::MissingLayout {
                        ctor: expanded.to_string(),
                        ordinal: functor.ordinal,
                    });
                };

                let mut bound: SmallVec<[Option<TypeInfo<'ty_arena>>; 2]> =
                    smallvec![None; functor.num_exist as usize];
                for (slot, arg) in layout.slots.iter().zip(args) {
                    bind_exists(types, functor, &slot.ty, arg.ty, &mut bound)?;
                }
                let exists: SmallVec<[TypeInfo<'ty_arena>; 2]> = bound.into_iter().flatten().collect();
                if exists.len() != functor.num_exist as usize {
                    return Err(TypeError::Mismatch {
                        expected: functor.to_string(),
                        found: "an argument list that binds every existential variable".into(),
                    });
                }
                for (slot, arg) in layout.slots.iter().zip(args) {
                    check_type(types.resolve(&slot.ty, expanded, &exists), arg.ty)?;
                }

                match layout.encoding(functor.tag) {
                    TagEncoding::Word(word) => RawValue::from_word(word),
                    TagEncoding::Cell {
                        ptag,
                        remote_sectag,
                    } => {
                        let mut words: SmallVec<[RawValue; 8]> =
                            smallvec![RawValue::from_word(0); layout.cell_words as usize];
                        if let Some(sectag) = remote_sectag {
                            words[0] = RawValue::from_word(sectag as usize);
                        }
                        for (&locn, exist) in layout.exist_locns.iter().zip(&exists) {
                            let carried: &TypeInfo<'ty_arena> = arena.alloc(*exist);
                            words[locn as usize] = RawValue {
                                type_info: carried as *const TypeInfo<'ty_arena> as *const (),
                            };
                        }
                        for (slot, arg) in layout.slots.iter().zip(args) {
                            words[slot.offset as usize] = arg.raw;
                        }
                        RawValue::tagged(alloc_cell(arena, &words), ptag)
                    }
                }
            }
            TypeCtorRep::Builtin(_) | TypeCtorRep::Equiv(_) => {
                return Err(TypeError::WrongKind {
                    ctor: expanded.to_string(),
                    expected: "a type with functors",
                });
            }
        };
        Ok(Self::new_unchecked(ty, raw))
    }

    // ============================================================================
    // Extraction
    // ============================================================================

    fn expect_builtin(&self, builtin: Builtin, expected: &str) -> Result<(), TypeError> {
        if self.ty.builtin() == Some(builtin) {
            Ok(())
        } else {
            Err(TypeError::Mismatch {
                expected: expected.to_string(),
                found: self.ty.to_string(),
            })
        }
    }

    pub fn as_int(&self) -> Result<i64, TypeError> {
        self.expect_builtin(Builtin::Int, "int")?;
        Ok(self.raw.int())
    }

    pub fn as_float(&self) -> Result<f64, TypeError> {
        self.expect_builtin(Builtin::Float, "float")?;
        Ok(self.raw.float())
    }

    pub fn as_char(&self) -> Result<char, TypeError> {
        self.expect_builtin(Builtin::Char, "character")?;
        Ok(char_of(self.raw))
    }

    pub fn as_str(&self) -> Result<&'value_arena str, TypeError> {
        self.expect_builtin(Builtin::String, "string")?;
        Ok(unsafe { Slice::from_raw_value(self.raw) }.as_str())
    }

    pub fn as_array(&self) -> Result<Array<'ty_arena, 'value_arena>, TypeError> {
        match (self.ty.builtin(), self.ty.arg(0)) {
            (Some(Builtin::Array), Some(elem_ty)) => Ok(Array {
                elem_ty,
                data: ArrayData::from_raw_value(self.raw),
            }),
            _ => Err(TypeError::Mismatch {
                expected: "array".into(),
                found: self.ty.to_string(),
            }),
        }
    }

    pub fn as_tuple(&self) -> Result<Vec<Value<'ty_arena, 'value_arena>>, TypeError> {
        self.expect_builtin(Builtin::Tuple, "tuple")?;
        Ok(tuple_elements(self.ty, self.raw).collect())
    }

    pub fn as_closure_name(&self) -> Result<&'value_arena str, TypeError> {
        self.expect_builtin(Builtin::Closure, "pred")?;
        Ok(unsafe { &*self.raw.closure }.name())
    }

    pub fn as_foreign(&self) -> Result<*const (), TypeError> {
        self.expect_builtin(Builtin::Foreign, "c_pointer")?;
        Ok(unsafe { self.raw.foreign })
    }
}

pub(crate) fn char_of(raw: RawValue) -> char {
    char::from_u32(raw.int() as u32).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Components of a tuple of type `ty`.
pub(crate) fn tuple_elements<'ty_arena, 'value_arena>(
    ty: TypeInfo<'ty_arena>,
    raw: RawValue,
) -> impl Iterator<Item = Value<'ty_arena, 'value_arena>> {
    ty.args().iter().enumerate().map(move |(i, &elem_ty)| {
        let elem = unsafe { crate::values::raw::cell_word(raw.cell, i) };
        Value::new_unchecked(elem_ty, elem)
    })
}

fn check_registered(types: &TypeTable<'_>, ty: TypeInfo<'_>) -> Result<(), TypeError> {
    if types.registry().owns(ty.ctor()) {
        return Ok(());
    }
    let (module, name, arity) = ty.key().as_parts();
    Err(TypeError::UnknownTypeCtor {
        module: module.to_string(),
        name: name.to_string(),
        arity,
    })
}

fn check_type(expected: TypeInfo<'_>, found: TypeInfo<'_>) -> Result<(), TypeError> {
    if expected == found {
        Ok(())
    } else {
        Err(TypeError::Mismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        })
    }
}

fn unknown_functor(ty: TypeInfo<'_>, name: &str, arity: usize) -> TypeError {
    TypeError::UnknownFunctor {
        ctor: ty.to_string(),
        name: name.to_string(),
        arity,
    }
}

/// Match a slot type against an argument's type, recording what each
/// existential variable stands for.
fn bind_exists<'ty_arena>(
    types: &TypeTable<'ty_arena>,
    functor: &Functor,
    slot: &PseudoTypeInfo,
    actual: TypeInfo<'ty_arena>,
    bound: &mut [Option<TypeInfo<'ty_arena>>],
) -> Result<(), TypeError> {
    match slot {
        PseudoTypeInfo::Exist(var) => {
            let Some(entry) = bound.get_mut(*var as usize) else {
                fatal(FatalError::UnboundExist {
                    ctor: functor.to_string(),
                    var: *var,
                });
            };
            match *entry {
                None => {
                    *entry = Some(actual);
                    Ok(())
                }
                Some(prev) if prev == actual => Ok(()),
                Some(prev) => Err(TypeError::ExistConflict {
                    functor: functor.to_string(),
                    var: *var,
                    first: prev.to_string(),
                    second: actual.to_string(),
                }),
            }
        }
        PseudoTypeInfo::Ctor(r, args) if slot.max_exist().is_some() => {
            if types.ctor_of(r).key() != actual.key() || args.len() != actual.args().len() {
                return Err(TypeError::Mismatch {
                    expected: slot.to_string(),
                    found: actual.to_string(),
                });
            }
            for (arg, &actual_arg) in args.iter().zip(actual.args()) {
                bind_exists(types, functor, arg, actual_arg, bound)?;
            }
            Ok(())
        }
        PseudoTypeInfo::Ctor(..) | PseudoTypeInfo::Param(_) => Ok(()),
    }
}

// ============================================================================
// Array - Runtime array access without compile-time type knowledge
// ============================================================================

/// Dynamic view of an array value.
#[derive(Clone, Copy)]
pub struct Array<'ty_arena, 'value_arena> {
    elem_ty: TypeInfo<'ty_arena>,
    data: ArrayData<'value_arena>,
}

impl<'ty_arena, 'value_arena> Array<'ty_arena, 'value_arena> {
    pub fn elem_ty(&self) -> TypeInfo<'ty_arena> {
        self.elem_ty
    }

    pub fn len(&self) -> usize {
        self.data.length()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Value<'ty_arena, 'value_arena>> {
        let raw = self.data.get(index)?;
        Some(Value::new_unchecked(self.elem_ty, raw))
    }

    pub fn iter(&self) -> ArrayIter<'ty_arena, 'value_arena> {
        ArrayIter {
            elem_ty: self.elem_ty,
            inner: self.data.as_slice().iter(),
        }
    }
}

pub struct ArrayIter<'ty_arena, 'value_arena> {
    elem_ty: TypeInfo<'ty_arena>,
    inner: core::slice::Iter<'value_arena, RawValue>,
}

impl<'ty_arena, 'value_arena> Iterator for ArrayIter<'ty_arena, 'value_arena> {
    type Item = Value<'ty_arena, 'value_arena>;

    fn next(&mut self) -> Option<Self::Item> {
        let raw = *self.inner.next()?;
        Some(Value::new_unchecked(self.elem_ty, raw))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for ArrayIter<'_, '_> {}
