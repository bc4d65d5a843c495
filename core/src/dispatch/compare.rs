use core::cmp::Ordering;

use rtti_types::{Builtin, TypeCtorRep};

use crate::ToString;
use crate::descriptor::SpecialPreds;
use crate::dispatch::operand_type;
use crate::errors::{FatalError, fatal};
use crate::types::{TypeInfo, TypeTable};
use crate::values::raw::{ArrayData, Slice, cell_word};
use crate::values::{RawValue, Value};

impl<'a> TypeTable<'a> {
    /// Standard order of `a` and `b`, which must have the same type.
    ///
    /// `Equal` exactly when [`unify`](Self::unify) succeeds.
    pub fn compare(&self, a: Value<'a, '_>, b: Value<'a, '_>) -> Ordering {
        let ty = operand_type(&a, &b);
        // SAFETY: both words come from values of type `ty`.
        unsafe { self.compare_raw(ty, a.raw(), b.raw()) }
    }

    /// [`compare`](Self::compare) on bare words.
    ///
    /// # Safety
    ///
    /// `a` and `b` must be valid values of type `ty` whose payloads are still
    /// alive.
    pub unsafe fn compare_raw(&self, ty: TypeInfo<'a>, a: RawValue, b: RawValue) -> Ordering {
        self.check_owned(ty);
        unsafe { self.compare_from(ty, a, b, false) }
    }

    /// The table-driven order, ignoring any specialized procedure of `ty`
    /// itself.
    ///
    /// # Safety
    ///
    /// Same contract as [`compare_raw`](Self::compare_raw).
    pub unsafe fn compare_generic(&self, ty: TypeInfo<'a>, a: RawValue, b: RawValue) -> Ordering {
        self.check_owned(ty);
        unsafe { self.compare_from(ty, a, b, true) }
    }

    unsafe fn compare_from(
        &self,
        mut ty: TypeInfo<'a>,
        mut a: RawValue,
        mut b: RawValue,
        mut skip_special: bool,
    ) -> Ordering {
        loop {
            if let (SpecialPreds::Specialized(procs), false) =
                (ty.ctor().special(), skip_special)
            {
                tracing::trace!(ty = %ty, "compare delegated to specialized procedure");
                return unsafe { (procs.compare)(self, ty, a, b) };
            }
            skip_special = false;

            match ty.ctor().rep() {
                TypeCtorRep::Builtin(builtin) => {
                    return unsafe { self.compare_builtin(*builtin, ty, a, b) };
                }
                TypeCtorRep::Enum(rep) => {
                    let fa = self.decode_enum(ty, rep, a);
                    return fa.ordinal.cmp(&self.decode_enum(ty, rep, b).ordinal);
                }
                TypeCtorRep::NoTag(rep) => ty = self.resolve(&rep.arg, ty, &[]),
                TypeCtorRep::Equiv(target) => ty = self.resolve(target, ty, &[]),
                TypeCtorRep::Du(du) => {
                    let by_ptag = a.ptag().cmp(&b.ptag());
                    if by_ptag != Ordering::Equal {
                        return by_ptag;
                    }
                    let da = self.decode_du(ty, du, a);
                    let db = self.decode_du(ty, du, b);
                    let by_tag = da.functor.tag.order_key().cmp(&db.functor.tag.order_key());
                    if by_tag != Ordering::Equal {
                        return by_tag;
                    }
                    let exists = da.exists();
                    let by_exists = exists.as_slice().cmp(db.exists().as_slice());
                    if by_exists != Ordering::Equal {
                        return by_exists;
                    }
                    let Some((last, init)) = da.layout.slots.split_last() else {
                        return Ordering::Equal;
                    };
                    for slot in init {
                        let arg_ty = self.resolve(&slot.ty, ty, &exists);
                        let by_arg =
                            unsafe { self.compare_raw(arg_ty, da.arg(slot), db.arg(slot)) };
                        if by_arg != Ordering::Equal {
                            return by_arg;
                        }
                    }
                    (a, b) = (da.arg(last), db.arg(last));
                    ty = self.resolve(&last.ty, ty, &exists);
                }
            }
        }
    }

    unsafe fn compare_builtin(
        &self,
        builtin: Builtin,
        ty: TypeInfo<'a>,
        a: RawValue,
        b: RawValue,
    ) -> Ordering {
        match builtin {
            Builtin::Int | Builtin::Char => a.int().cmp(&b.int()),
            Builtin::Float => a.float().total_cmp(&b.float()),
            Builtin::String => unsafe {
                Slice::from_raw_value(a)
                    .as_bytes()
                    .cmp(Slice::from_raw_value(b).as_bytes())
            },
            Builtin::Array => {
                let elem_ty = self.array_elem(ty);
                let (xs, ys) = (ArrayData::from_raw_value(a), ArrayData::from_raw_value(b));
                xs.length().cmp(&ys.length()).then_with(|| {
                    xs.as_slice()
                        .iter()
                        .zip(ys.as_slice())
                        .map(|(&x, &y)| unsafe { self.compare_raw(elem_ty, x, y) })
                        .find(|o| *o != Ordering::Equal)
                        .unwrap_or(Ordering::Equal)
                })
            }
            Builtin::Tuple => ty
                .args()
                .iter()
                .enumerate()
                .map(|(i, &elem_ty)| {
                    let (x, y) = unsafe { (cell_word(a.cell, i), cell_word(b.cell, i)) };
                    unsafe { self.compare_raw(elem_ty, x, y) }
                })
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal),
            // No natural order; fall back to identity.
            Builtin::Closure | Builtin::Foreign => a.word().cmp(&b.word()),
        }
    }

    pub(crate) fn array_elem(&self, ty: TypeInfo<'a>) -> TypeInfo<'a> {
        ty.arg(0).unwrap_or_else(|| {
            fatal(FatalError::UnboundParam {
                ctor: ty.to_string(),
                param: 0,
                available: ty.args().len(),
            })
        })
    }
}
