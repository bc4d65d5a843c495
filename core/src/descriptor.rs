//! Type constructor descriptors.
//!
//! A [`TypeCtorInfo`] is the one runtime record of a type constructor. It is
//! created by the compiler's emitted initialization code, handed to a
//! [`RegistryBuilder`](crate::RegistryBuilder), and immutable from the moment
//! the registry is built.

use core::cmp::Ordering;
use core::fmt;

use rtti_types::{
    Functor, FunctorTable, LayoutTable, RepKind, TypeCtorFlags, TypeCtorId, TypeCtorKey,
    TypeCtorRep,
};

use crate::types::{TypeInfo, TypeTable};
use crate::values::RawValue;

/// Descriptor format version emitted by the current compiler.
pub const RTTI_VERSION: u32 = 1;

/// Type-specific unification procedure.
///
/// Receives the dispatching [`TypeTable`] so it can recurse into arguments
/// through [`TypeTable::unify_raw`] or fall back to
/// [`TypeTable::unify_generic`]. A safe `fn` coerces to this type.
///
/// # Safety
///
/// The dispatcher only calls it with two valid values of the given type.
pub type UnifyProc = for<'a> unsafe fn(&TypeTable<'a>, TypeInfo<'a>, RawValue, RawValue) -> bool;

/// Type-specific comparison procedure. Must agree with the matching
/// [`UnifyProc`]: `Equal` exactly when unification succeeds.
///
/// # Safety
///
/// Called under the same contract as [`UnifyProc`].
pub type CompareProc =
    for<'a> unsafe fn(&TypeTable<'a>, TypeInfo<'a>, RawValue, RawValue) -> Ordering;

#[derive(Clone, Copy)]
pub struct SpecialProcs {
    pub unify: UnifyProc,
    pub compare: CompareProc,
}

impl fmt::Debug for SpecialProcs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecialProcs").finish_non_exhaustive()
    }
}

/// Which unify/compare implementation a descriptor uses.
#[derive(Clone, Copy, Debug, Default)]
pub enum SpecialPreds {
    /// Interpret the functor and layout tables.
    #[default]
    Generic,

    /// Delegate to compiler-supplied procedures.
    Specialized(SpecialProcs),
}

/// Runtime descriptor of one type constructor.
#[derive(Debug)]
pub struct TypeCtorInfo {
    pub(crate) id: Option<TypeCtorId>,
    key: TypeCtorKey,
    version: u32,
    rep: TypeCtorRep,
    special: SpecialPreds,
    flags: TypeCtorFlags,
}

impl TypeCtorInfo {
    /// Descriptor using the generic algorithms, stamped with [`RTTI_VERSION`].
    pub fn new(key: TypeCtorKey, rep: TypeCtorRep) -> Self {
        let flags = rep.compute_flags(&key);
        Self {
            id: None,
            key,
            version: RTTI_VERSION,
            rep,
            special: SpecialPreds::Generic,
            flags,
        }
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_special(mut self, procs: SpecialProcs) -> Self {
        self.special = SpecialPreds::Specialized(procs);
        self.flags |= TypeCtorFlags::SPECIALIZED;
        self
    }

    /// Registry index. `None` until the descriptor is registered.
    pub fn id(&self) -> Option<TypeCtorId> {
        self.id
    }

    pub fn key(&self) -> &TypeCtorKey {
        &self.key
    }

    pub fn module_name(&self) -> &str {
        &self.key.module
    }

    pub fn type_name(&self) -> &str {
        &self.key.name
    }

    pub fn arity(&self) -> u16 {
        self.key.arity
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn rep(&self) -> &TypeCtorRep {
        &self.rep
    }

    pub(crate) fn rep_mut(&mut self) -> &mut TypeCtorRep {
        &mut self.rep
    }

    pub fn kind(&self) -> RepKind {
        self.rep.kind()
    }

    pub fn special(&self) -> SpecialPreds {
        self.special
    }

    pub fn flags(&self) -> TypeCtorFlags {
        self.flags
    }

    pub fn is_variable_arity(&self) -> bool {
        self.flags.contains(TypeCtorFlags::VARIABLE_ARITY)
    }

    /// Primary tags in use; zero for kinds that have none.
    pub fn num_ptags(&self) -> usize {
        self.rep.num_ptags()
    }

    pub fn num_functors(&self) -> usize {
        self.rep.num_functors()
    }

    pub fn functors(&self) -> Option<&FunctorTable> {
        self.rep.functors()
    }

    pub fn functor(&self, ordinal: u32) -> Option<&Functor> {
        self.rep.functors()?.get(ordinal)
    }

    pub fn find_functor(&self, name: &str, arity: u16) -> Option<&Functor> {
        self.rep.functors()?.find(name, arity)
    }

    pub fn layout(&self) -> Option<&LayoutTable> {
        self.rep.layout()
    }
}

impl fmt::Display for TypeCtorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}
