//! Error types.
//!
//! There are two classes of failure:
//!
//! - **Load-time errors** ([`RegistryError`], [`TypeError`]): a descriptor or a
//!   value being built is rejected before dispatch can ever observe it.
//! - **Fatal errors** ([`FatalError`]): a malformed descriptor or mismatched
//!   operands seen *during* dispatch. These mean the compiler or the caller
//!   broke the contract, so the runtime aborts instead of returning a result
//!   that might be silently wrong.
//!
//! Structural inequality is never an error: `unify` returns `false` and
//! `compare` returns an ordering.

use rtti_types::{TableError, TagError, TypeCtorKey};
use thiserror::Error;

use crate::String;

/// A descriptor rejected while the registry is being built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("type constructor {key} is registered twice")]
    DuplicateTypeCtor { key: TypeCtorKey },

    #[error("descriptor for {key} has version {found}, runtime accepts {min}..={max}")]
    VersionMismatch {
        key: TypeCtorKey,
        found: u32,
        min: u32,
        max: u32,
    },

    #[error("malformed descriptor for {key}: {source}")]
    MalformedTable {
        key: TypeCtorKey,
        #[source]
        source: TableError,
    },

    #[error("{from} refers to unknown type constructor {missing}")]
    UnresolvedTypeCtor {
        from: TypeCtorKey,
        missing: TypeCtorKey,
    },

    #[error("{from} applies {target} to {found} type arguments but it has arity {expected}")]
    ArityMismatch {
        from: TypeCtorKey,
        target: TypeCtorKey,
        expected: u16,
        found: usize,
    },

    #[error("equivalence {key} expands to itself")]
    EquivCycle { key: TypeCtorKey },

    #[error("a global registry is already installed")]
    AlreadyInstalled,
}

/// A type info or value that does not match its descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("expected a value of type {expected}, found {found}")]
    Mismatch { expected: String, found: String },

    #[error("type constructor {module}.{name}/{arity} is not registered")]
    UnknownTypeCtor {
        module: String,
        name: String,
        arity: u16,
    },

    #[error("{ctor} expects {expected} type arguments, got {found}")]
    WrongTypeArity {
        ctor: String,
        expected: u16,
        found: usize,
    },

    #[error("{ctor} has no functor {name}/{arity}")]
    UnknownFunctor {
        ctor: String,
        name: String,
        arity: usize,
    },

    #[error("{ctor} is not {expected}")]
    WrongKind {
        ctor: String,
        expected: &'static str,
    },

    #[error("existential variable E{} of {functor} is bound to both {first} and {second}", .var + 1)]
    ExistConflict {
        functor: String,
        var: u16,
        first: String,
        second: String,
    },
}

/// Internal-consistency failure detected during dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FatalError {
    #[error("value of {ctor} has a malformed tag: {source}")]
    BadTag {
        ctor: String,
        #[source]
        source: TagError,
    },

    #[error("{ctor}: functor {ordinal} has no layout")]
    MissingLayout { ctor: String, ordinal: u32 },

    #[error("{ctor}: ordinal {ordinal} is out of range ({num_functors} functors)")]
    OrdinalOutOfRange {
        ctor: String,
        ordinal: usize,
        num_functors: usize,
    },

    #[error("{ctor}: type parameter T{} is not bound (type info has {available} arguments)", .param + 1)]
    UnboundParam {
        ctor: String,
        param: u16,
        available: usize,
    },

    #[error("{ctor}: existential variable E{} has no carried type info", .var + 1)]
    UnboundExist { ctor: String, var: u16 },

    #[error("reference to {key} was never resolved by a registry")]
    UnresolvedRef { key: TypeCtorKey },

    #[error("type info for {ctor} belongs to a different registry")]
    ForeignDescriptor { ctor: TypeCtorKey },

    #[error("operands have different types: {left} and {right}")]
    OperandMismatch { left: String, right: String },

    #[error("no global registry has been installed")]
    NoGlobalRegistry,
}

/// Abort on a broken invariant.
#[cold]
#[track_caller]
pub(crate) fn fatal(err: FatalError) -> ! {
    tracing::error!(error = %err, "RTTI internal consistency failure");
    panic!("RTTI internal consistency failure: {err}");
}
