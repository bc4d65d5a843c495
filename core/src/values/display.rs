//! Printing values as terms: `cons(1, nil)`, `"ab"`, `{1, 'c'}`.

use core::fmt;

use rtti_types::{Builtin, TypeCtorRep};

use crate::ToString;
use crate::types::{TypeInfo, TypeTable};
use crate::values::raw::{ArrayData, RawValue, Slice, cell_word};
use crate::values::value::char_of;
use crate::values::Value;

/// Printable view of a value; see [`TypeTable::display`].
pub struct ValueDisplay<'s, 'ty_arena, 'value_arena> {
    types: &'s TypeTable<'ty_arena>,
    value: Value<'ty_arena, 'value_arena>,
}

impl<'ty_arena> TypeTable<'ty_arena> {
    pub fn display<'s, 'value_arena>(
        &'s self,
        value: Value<'ty_arena, 'value_arena>,
    ) -> ValueDisplay<'s, 'ty_arena, 'value_arena> {
        ValueDisplay { types: self, value }
    }

    fn write_value(
        &self,
        f: &mut fmt::Formatter<'_>,
        mut ty: TypeInfo<'ty_arena>,
        mut raw: RawValue,
    ) -> fmt::Result {
        // The last argument of a functor is printed by this loop; `open`
        // counts the parentheses still to close.
        let mut open = 0usize;
        loop {
            match ty.ctor().rep() {
                TypeCtorRep::Builtin(builtin) => {
                    self.write_builtin(f, *builtin, ty, raw)?;
                    break;
                }
                TypeCtorRep::Enum(rep) => {
                    write_atom(f, &self.decode_enum(ty, rep, raw).name)?;
                    break;
                }
                TypeCtorRep::NoTag(rep) => {
                    let name = rep.functor().map_or("", |functor| functor.name.as_ref());
                    write_atom(f, name)?;
                    f.write_str("(")?;
                    open += 1;
                    ty = self.resolve(&rep.arg, ty, &[]);
                }
                TypeCtorRep::Equiv(target) => ty = self.resolve(target, ty, &[]),
                TypeCtorRep::Du(du) => {
                    let decoded = self.decode_du(ty, du, raw);
                    write_atom(f, &decoded.functor.name)?;
                    let Some((last, init)) = decoded.layout.slots.split_last() else {
                        break;
                    };
                    let exists = decoded.exists();
                    f.write_str("(")?;
                    for slot in init {
                        let arg_ty = self.resolve(&slot.ty, ty, &exists);
                        self.write_value(f, arg_ty, decoded.arg(slot))?;
                        f.write_str(", ")?;
                    }
                    open += 1;
                    raw = decoded.arg(last);
                    ty = self.resolve(&last.ty, ty, &exists);
                }
            }
        }
        for _ in 0..open {
            f.write_str(")")?;
        }
        Ok(())
    }

    fn write_builtin(
        &self,
        f: &mut fmt::Formatter<'_>,
        builtin: Builtin,
        ty: TypeInfo<'ty_arena>,
        raw: RawValue,
    ) -> fmt::Result {
        match builtin {
            Builtin::Int => write!(f, "{}", raw.int()),
            Builtin::Char => write!(f, "{:?}", char_of(raw)),
            Builtin::Float => format_float(f, raw.float()),
            Builtin::String => write!(f, "{:?}", unsafe { Slice::from_raw_value(raw) }.as_str()),
            Builtin::Array => {
                let elem_ty = self.array_elem(ty);
                f.write_str("array([")?;
                for (i, &elem) in ArrayData::from_raw_value(raw).as_slice().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    self.write_value(f, elem_ty, elem)?;
                }
                f.write_str("])")
            }
            Builtin::Tuple => {
                f.write_str("{")?;
                for (i, &elem_ty) in ty.args().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    self.write_value(f, elem_ty, unsafe { cell_word(raw.cell, i) })?;
                }
                f.write_str("}")
            }
            Builtin::Closure => write!(f, "<<closure {}>>", unsafe { &*raw.closure }.name()),
            Builtin::Foreign => write!(f, "<<foreign {:#x}>>", raw.word()),
        }
    }
}

impl fmt::Display for ValueDisplay<'_, '_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.types.write_value(f, self.value.ty(), self.value.raw())
    }
}

/// Functor names that are not plain lowercase identifiers are quoted.
fn write_atom(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    let plain = name.chars().next().is_some_and(|c| c.is_ascii_lowercase())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        return f.write_str(name);
    }
    f.write_str("'")?;
    for c in name.chars() {
        match c {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("'")
}

fn format_float(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_nan() {
        write!(f, "nan")
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            write!(f, "infinity")
        } else {
            write!(f, "-infinity")
        }
    } else {
        let s = value.to_string();
        if s.contains('.') || s.contains('e') || s.contains('E') {
            write!(f, "{}", s)
        } else {
            write!(f, "{}.0", s)
        }
    }
}
