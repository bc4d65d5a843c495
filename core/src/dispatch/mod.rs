//! The generic dispatch engine.
//!
//! [`TypeTable::unify`] and [`TypeTable::compare`] interpret descriptors over
//! values. The [`Registry`] methods and the free functions below are the
//! entry points for code that holds no table of its own: each call gets a
//! scratch arena for the type infos it resolves on the way down.
//!
//! The `_raw` variants take bare words and are `unsafe`: a word that is not
//! a value of the given type is read as whatever pointer its bits spell.
//!
//! ```compile_fail,E0133
//! use bumpalo::Bump;
//! use rtti_core::{RawValue, RegistryBuilder, TypeTable};
//!
//! let registry = RegistryBuilder::new().build().unwrap();
//! let arena = Bump::new();
//! let types = TypeTable::new(&registry, &arena);
//! let bogus = RawValue::from_int(0x10);
//! types.unify_raw(types.string(), bogus, bogus);
//! ```

mod compare;
mod decode;
mod unify;

#[cfg(test)]
mod dispatch_test;

use bumpalo::Bump;
use core::cmp::Ordering;

use crate::ToString;
use crate::errors::{FatalError, fatal};
use crate::registry::Registry;
use crate::types::{TypeInfo, TypeTable};
use crate::values::{RawValue, Value};

impl Registry {
    /// Structural equality of two values of the same type.
    pub fn unify(&self, a: Value<'_, '_>, b: Value<'_, '_>) -> bool {
        let arena = Bump::new();
        TypeTable::new(self, &arena).unify(a, b)
    }

    /// Standard order of two values of the same type.
    pub fn compare(&self, a: Value<'_, '_>, b: Value<'_, '_>) -> Ordering {
        let arena = Bump::new();
        TypeTable::new(self, &arena).compare(a, b)
    }

    /// # Safety
    ///
    /// See [`TypeTable::unify_raw`].
    pub unsafe fn unify_raw(&self, ty: TypeInfo<'_>, a: RawValue, b: RawValue) -> bool {
        let arena = Bump::new();
        unsafe { TypeTable::new(self, &arena).unify_raw(ty, a, b) }
    }

    /// # Safety
    ///
    /// See [`TypeTable::compare_raw`].
    pub unsafe fn compare_raw(&self, ty: TypeInfo<'_>, a: RawValue, b: RawValue) -> Ordering {
        let arena = Bump::new();
        unsafe { TypeTable::new(self, &arena).compare_raw(ty, a, b) }
    }
}

pub(crate) fn operand_type<'t>(a: &Value<'t, '_>, b: &Value<'t, '_>) -> TypeInfo<'t> {
    if a.ty() != b.ty() {
        fatal(FatalError::OperandMismatch {
            left: a.ty().to_string(),
            right: b.ty().to_string(),
        });
    }
    a.ty()
}

#[cfg(feature = "std")]
fn global() -> &'static Registry {
    Registry::global().unwrap_or_else(|| fatal(FatalError::NoGlobalRegistry))
}

/// [`Registry::unify`] on the installed global registry.
#[cfg(feature = "std")]
pub fn unify(a: Value<'_, '_>, b: Value<'_, '_>) -> bool {
    global().unify(a, b)
}

/// [`Registry::compare`] on the installed global registry.
#[cfg(feature = "std")]
pub fn compare(a: Value<'_, '_>, b: Value<'_, '_>) -> Ordering {
    global().compare(a, b)
}
