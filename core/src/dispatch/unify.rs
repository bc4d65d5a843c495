use rtti_types::{Builtin, TypeCtorRep};

use crate::descriptor::SpecialPreds;
use crate::dispatch::operand_type;
use crate::types::{TypeInfo, TypeTable};
use crate::values::raw::{ArrayData, Slice, cell_word};
use crate::values::{RawValue, Value};

impl<'a> TypeTable<'a> {
    /// Whether `a` and `b` denote the same value.
    ///
    /// Both operands must have the same type; anything else is fatal. Uses
    /// the descriptor's specialized procedure when it has one.
    pub fn unify(&self, a: Value<'a, '_>, b: Value<'a, '_>) -> bool {
        let ty = operand_type(&a, &b);
        // SAFETY: both words come from values of type `ty`.
        unsafe { self.unify_raw(ty, a.raw(), b.raw()) }
    }

    /// [`unify`](Self::unify) on bare words, as specialized procedures see
    /// them.
    ///
    /// # Safety
    ///
    /// `a` and `b` must be valid values of type `ty` whose payloads are still
    /// alive. Their cells, strings and arrays are read without checks.
    pub unsafe fn unify_raw(&self, ty: TypeInfo<'a>, a: RawValue, b: RawValue) -> bool {
        self.check_owned(ty);
        unsafe { self.unify_from(ty, a, b, false) }
    }

    /// The table-driven algorithm, ignoring any specialized procedure of
    /// `ty` itself. Arguments still dispatch through
    /// [`unify_raw`](Self::unify_raw).
    ///
    /// # Safety
    ///
    /// Same contract as [`unify_raw`](Self::unify_raw).
    pub unsafe fn unify_generic(&self, ty: TypeInfo<'a>, a: RawValue, b: RawValue) -> bool {
        self.check_owned(ty);
        unsafe { self.unify_from(ty, a, b, true) }
    }

    unsafe fn unify_from(
        &self,
        mut ty: TypeInfo<'a>,
        mut a: RawValue,
        mut b: RawValue,
        mut skip_special: bool,
    ) -> bool {
        // The last argument of a functor is handled by looping, so walking a
        // long list does not grow the stack.
        loop {
            if let (SpecialPreds::Specialized(procs), false) =
                (ty.ctor().special(), skip_special)
            {
                tracing::trace!(ty = %ty, "unify delegated to specialized procedure");
                return unsafe { (procs.unify)(self, ty, a, b) };
            }
            skip_special = false;

            match ty.ctor().rep() {
                TypeCtorRep::Builtin(builtin) => {
                    return unsafe { self.unify_builtin(*builtin, ty, a, b) };
                }
                TypeCtorRep::Enum(rep) => {
                    let fa = self.decode_enum(ty, rep, a);
                    return core::ptr::eq(fa, self.decode_enum(ty, rep, b));
                }
                TypeCtorRep::NoTag(rep) => ty = self.resolve(&rep.arg, ty, &[]),
                TypeCtorRep::Equiv(target) => ty = self.resolve(target, ty, &[]),
                TypeCtorRep::Du(du) => {
                    if a.ptag() != b.ptag() {
                        return false;
                    }
                    let da = self.decode_du(ty, du, a);
                    let db = self.decode_du(ty, du, b);
                    if da.functor.ordinal != db.functor.ordinal {
                        return false;
                    }
                    let exists = da.exists();
                    if exists != db.exists() {
                        return false;
                    }
                    let Some((last, init)) = da.layout.slots.split_last() else {
                        return true;
                    };
                    for slot in init {
                        let arg_ty = self.resolve(&slot.ty, ty, &exists);
                        if !unsafe { self.unify_raw(arg_ty, da.arg(slot), db.arg(slot)) } {
                            return false;
                        }
                    }
                    (a, b) = (da.arg(last), db.arg(last));
                    ty = self.resolve(&last.ty, ty, &exists);
                }
            }
        }
    }

    unsafe fn unify_builtin(
        &self,
        builtin: Builtin,
        ty: TypeInfo<'a>,
        a: RawValue,
        b: RawValue,
    ) -> bool {
        match builtin {
            Builtin::Int | Builtin::Char => a.int() == b.int(),
            Builtin::Float => a.float().to_bits() == b.float().to_bits(),
            Builtin::String => unsafe {
                Slice::from_raw_value(a).as_bytes() == Slice::from_raw_value(b).as_bytes()
            },
            Builtin::Array => {
                let elem_ty = self.array_elem(ty);
                let (xs, ys) = (ArrayData::from_raw_value(a), ArrayData::from_raw_value(b));
                xs.length() == ys.length()
                    && xs
                        .as_slice()
                        .iter()
                        .zip(ys.as_slice())
                        .all(|(&x, &y)| unsafe { self.unify_raw(elem_ty, x, y) })
            }
            Builtin::Tuple => ty.args().iter().enumerate().all(|(i, &elem_ty)| {
                let (x, y) = unsafe { (cell_word(a.cell, i), cell_word(b.cell, i)) };
                unsafe { self.unify_raw(elem_ty, x, y) }
            }),
            Builtin::Closure | Builtin::Foreign => a.word() == b.word(),
        }
    }
}
