//! rtti - runtime type information for tagged, arena-allocated values
//!
//! # Overview
//!
//! Every type constructor known to a program is described once by a
//! descriptor ([`TypeCtorInfo`]): its name, its representation, its functor
//! table and, for discriminated unions, the layout that maps primary and
//! secondary tags to functors and argument words. Descriptors are registered
//! in a [`Registry`] during a single-threaded initialization phase; after
//! that the registry is immutable and shared freely across threads.
//!
//! A [`TypeInfo`] is a descriptor applied to argument type infos. With a type
//! info in hand the runtime can unify, compare, walk, copy and print any value
//! of that type without knowing the type statically.
//!
//! # Quick Start
//!
//! ```
//! use rtti::{DuBuilder, FunctorDecl, PseudoTypeInfo, RegistryBuilder, TypeCtorInfo,
//!            TypeCtorKey, TypeTable, Value};
//! use bumpalo::Bump;
//!
//! // Descriptors for `tree ---> leaf ; node(tree, int, tree)`.
//! let tree = TypeCtorKey::new("demo", "tree", 0);
//! let int = PseudoTypeInfo::ground(TypeCtorKey::new("builtin", "int", 0));
//! let rep = DuBuilder::new()
//!     .constant("leaf")
//!     .functor(
//!         FunctorDecl::new("node")
//!             .arg(PseudoTypeInfo::ground(tree.clone()))
//!             .arg(int)
//!             .arg(PseudoTypeInfo::ground(tree.clone())),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let mut builder = RegistryBuilder::new();
//! builder.register(TypeCtorInfo::new(tree, rep)).unwrap();
//! let registry = builder.build().unwrap();
//!
//! // Values live in their own arena.
//! let arena = Bump::new();
//! let types = TypeTable::new(&registry, &arena);
//! let ty = types.lookup("demo", "tree", &[]).unwrap();
//! let leaf = Value::construct(&arena, &types, ty, "leaf", &[]).unwrap();
//! let one = Value::int(&types, 1);
//! let node = Value::construct(&arena, &types, ty, "node", &[leaf, one, leaf]).unwrap();
//!
//! assert!(registry.unify(node, node));
//! assert_eq!(registry.compare(leaf, node), std::cmp::Ordering::Less);
//! assert_eq!(types.display(node).to_string(), "node(leaf, 1, leaf)");
//! ```
//!
//! # Errors
//!
//! Load-time problems (a malformed descriptor, a value that does not fit its
//! type) are reported as [`Error`], which renders with source-free
//! diagnostics through [`render_error`]. Inconsistencies discovered during
//! dispatch are fatal and abort with a panic.

mod error;
mod error_renderer;

pub use error::Error;
pub use error_renderer::{render_error, render_error_to, render_error_to_string, render_error_to_string_no_color};

// Re-export the descriptor model
pub use rtti_types::{
    Builtin, DuBuilder, Functor, FunctorDecl, FunctorTag, PseudoTypeInfo, RepKind, Sectag,
    TableError, TypeCtorFlags, TypeCtorKey, TypeCtorRep,
};

// Re-export the runtime
pub use rtti_core::{
    Deconstructed, FatalError, RTTI_VERSION, RawValue, Registry, RegistryBuilder, RegistryError,
    RegistryOptions, SpecialPreds, SpecialProcs, TypeCtorInfo, TypeError, TypeInfo, TypeTable,
    Value, ValueVisitor, compare, unify,
};

pub use rtti_core::values::ValueDisplay;
