//! Descriptor tables for runtime type information.
//!
//! This crate holds the static data the compiler emits for every type
//! constructor: its identity, its representation kind, its functor table and
//! (for discriminated unions) its layout table. It has no notion of values;
//! `rtti-core` interprets these tables over actual values.
//!
//! # Example
//!
//! ```
//! use rtti_types::{DuBuilder, FunctorDecl, PseudoTypeInfo, TypeCtorKey};
//!
//! let int = PseudoTypeInfo::ground(TypeCtorKey::new("builtin", "int", 0));
//! let rep = DuBuilder::new()
//!     .constant("leaf")
//!     .functor(FunctorDecl::new("node").arg(int.clone()).arg(int))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(rep.num_functors(), 2);
//! assert!(rep.validate(0).is_ok());
//! ```

#![no_std]
extern crate alloc;

pub mod builder;
pub mod functor;
pub mod key;
pub mod layout;
pub mod pseudo;
pub mod rep;

pub use builder::{DuBuilder, FunctorDecl};
pub use functor::{Functor, FunctorTable, FunctorTag, Sectag};
pub use key::{TypeCtorId, TypeCtorKey};
pub use layout::{
    ArgSlot, FunctorLayout, LayoutTable, MAX_PTAGS, PtagLayout, SectagLocn, TAG_BITS, TAG_MASK,
    TagEncoding, TagError,
};
pub use pseudo::{CtorRef, PseudoTypeInfo};
pub use rep::{
    Builtin, DuRep, EnumRep, NoTagRep, RepKind, TableError, TypeCtorFlags, TypeCtorRep,
};

/// Module under which the runtime registers its primitive constructors.
pub const BUILTIN_MODULE: &str = "builtin";
