#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

//! Runtime type information: type constructor descriptors, the registry
//! that owns them, and the generic engine that unifies, compares, walks,
//! copies and prints values through them.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use rtti_core::{RegistryBuilder, TypeCtorInfo, TypeTable, Value};
//! use rtti_types::{DuBuilder, FunctorDecl, PseudoTypeInfo, TypeCtorKey};
//!
//! let int = PseudoTypeInfo::ground(TypeCtorKey::new("builtin", "int", 0));
//! let rep = DuBuilder::new()
//!     .constant("none")
//!     .functor(FunctorDecl::new("some").arg(int))
//!     .build()
//!     .unwrap();
//! let mut builder = RegistryBuilder::new();
//! builder
//!     .register(TypeCtorInfo::new(TypeCtorKey::new("demo", "opt_int", 0), rep))
//!     .unwrap();
//! let registry = builder.build().unwrap();
//!
//! let arena = Bump::new();
//! let types = TypeTable::new(&registry, &arena);
//! let ty = types.lookup("demo", "opt_int", &[]).unwrap();
//! let five = Value::int(&types, 5);
//! let a = Value::construct(&arena, &types, ty, "some", &[five]).unwrap();
//! let b = Value::construct(&arena, &types, ty, "none", &[]).unwrap();
//!
//! assert!(types.unify(a, a));
//! assert_eq!(types.compare(a, b), core::cmp::Ordering::Greater);
//! assert_eq!(types.display(a).to_string(), "some(5)");
//! ```

extern crate alloc;

// Re-export for convenience so other modules don't need alloc:: prefix
#[allow(unused_imports)]
pub(crate) use alloc::{boxed::Box, format, string::String, string::ToString, vec, vec::Vec};

pub mod descriptor;
pub mod dispatch;
pub mod errors;
pub mod registry;
pub mod traverse;
pub mod types;
pub mod values;

pub use descriptor::{
    CompareProc, RTTI_VERSION, SpecialPreds, SpecialProcs, TypeCtorInfo, UnifyProc,
};
#[cfg(feature = "std")]
pub use dispatch::{compare, unify};
pub use errors::{FatalError, RegistryError, TypeError};
pub use registry::{Registry, RegistryBuilder, RegistryOptions};
pub use traverse::{Deconstructed, ValueVisitor};
pub use types::{TypeInfo, TypeTable};
pub use values::{RawValue, Value};


/// Test utilities for enabling logging in tests
#[cfg(test)]
pub mod test_utils {
    use rtti_types::{DuBuilder, FunctorDecl, PseudoTypeInfo, Sectag, TypeCtorKey, TypeCtorRep};

    use crate::{Registry, RegistryBuilder, TypeCtorInfo};

    /// Initialize tracing subscriber for tests with DEBUG level
    /// Call this at the start of tests where you want to see logging output
    pub fn init_test_logging() {
        use tracing_subscriber::{EnvFilter, fmt};

        // Try to initialize, ignore error if already initialized
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }

    pub fn int() -> PseudoTypeInfo {
        PseudoTypeInfo::ground(TypeCtorKey::new("builtin", "int", 0))
    }

    pub fn string() -> PseudoTypeInfo {
        PseudoTypeInfo::ground(TypeCtorKey::new("builtin", "string", 0))
    }

    pub fn list_of(elem: PseudoTypeInfo) -> PseudoTypeInfo {
        PseudoTypeInfo::ctor(TypeCtorKey::new("test", "list", 1), [elem])
    }

    /// Descriptors shared by the unit tests:
    ///
    /// - `test.list/1`: `nil ; cons(T1, list(T1))`
    /// - `test.color/0`: enumeration `red ; green ; blue`
    /// - `test.wrap/0`: no-tag `wrap(int)`
    /// - `test.abc/0`: `a ; b ; c(int)`, with `a` and `b` sharing primary tag 0
    /// - `test.univ/0`: `univ(E1)`, existentially typed
    /// - `test.ints/0`: equivalence for `list(int)`
    pub fn fixture_ctors() -> Vec<TypeCtorInfo> {
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
            .functor(FunctorDecl::new("c").arg(int()).tag(1, Sectag::None))
            .build()
            .unwrap();
        let univ = DuBuilder::new()
            .functor(FunctorDecl::new("univ").exist(1).arg(PseudoTypeInfo::exist(0)))
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
                TypeCtorRep::no_tag("wrap", int()),
            ),
            TypeCtorInfo::new(TypeCtorKey::new("test", "abc", 0), abc),
            TypeCtorInfo::new(TypeCtorKey::new("test", "univ", 0), univ),
            TypeCtorInfo::new(
                TypeCtorKey::new("test", "ints", 0),
                TypeCtorRep::equiv(list_of(int())),
            ),
        ]
    }

    pub fn fixture_registry() -> Registry {
        let mut builder = RegistryBuilder::new();
        builder.register_all(fixture_ctors()).unwrap();
        builder.build().unwrap()
    }
}
