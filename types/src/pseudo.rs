//! Argument type slots.
//!
//! A pseudo type info is the static description of an argument's type as
//! written in a type definition. It may mention the enclosing constructor's
//! type parameters (`Param`) or existentially quantified variables whose
//! concrete type info travels inside the value itself (`Exist`). The runtime
//! substitutes both to obtain a concrete type info.

use alloc::vec::Vec;
use core::fmt;
use core::hash::{Hash, Hasher};

use crate::{TypeCtorId, TypeCtorKey};

/// Reference to another type constructor, by key.
///
/// The id is filled in by the registry when it freezes; before that the
/// reference is unresolved. Equality and hashing only look at the key.
#[derive(Clone, Debug)]
pub struct CtorRef {
    key: TypeCtorKey,
    id: Option<TypeCtorId>,
}

impl CtorRef {
    pub fn new(key: TypeCtorKey) -> Self {
        Self { key, id: None }
    }

    pub fn key(&self) -> &TypeCtorKey {
        &self.key
    }

    pub fn id(&self) -> Option<TypeCtorId> {
        self.id
    }

    pub fn resolve(&mut self, id: TypeCtorId) {
        self.id = Some(id);
    }
}

impl PartialEq for CtorRef {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for CtorRef {}

impl Hash for CtorRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

/// Static type of one argument slot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PseudoTypeInfo {
    /// The n-th (0-based) type parameter of the enclosing constructor.
    Param(u16),

    /// The n-th (0-based) existentially quantified variable of the functor.
    /// Its type info is carried in the value's cell.
    Exist(u16),

    /// A type constructor applied to argument pseudo type infos.
    Ctor(CtorRef, Vec<PseudoTypeInfo>),
}

impl PseudoTypeInfo {
    pub fn param(n: u16) -> Self {
        PseudoTypeInfo::Param(n)
    }

    pub fn exist(n: u16) -> Self {
        PseudoTypeInfo::Exist(n)
    }

    /// A constructor applied to arguments.
    pub fn ctor(key: TypeCtorKey, args: impl IntoIterator<Item = PseudoTypeInfo>) -> Self {
        PseudoTypeInfo::Ctor(CtorRef::new(key), args.into_iter().collect())
    }

    /// A constructor with no arguments, e.g. `int`.
    pub fn ground(key: TypeCtorKey) -> Self {
        PseudoTypeInfo::Ctor(CtorRef::new(key), Vec::new())
    }

    /// True when no type variable of either kind occurs.
    pub fn is_ground(&self) -> bool {
        match self {
            PseudoTypeInfo::Param(_) | PseudoTypeInfo::Exist(_) => false,
            PseudoTypeInfo::Ctor(_, args) => args.iter().all(PseudoTypeInfo::is_ground),
        }
    }

    /// Largest parameter number mentioned, if any.
    pub fn max_param(&self) -> Option<u16> {
        let mut max = None;
        self.walk(&mut |p| {
            if let PseudoTypeInfo::Param(n) = p {
                max = max.max(Some(*n));
            }
        });
        max
    }

    /// Largest existential variable number mentioned, if any.
    pub fn max_exist(&self) -> Option<u16> {
        let mut max = None;
        self.walk(&mut |p| {
            if let PseudoTypeInfo::Exist(n) = p {
                max = max.max(Some(*n));
            }
        });
        max
    }

    /// Whether existential variable `n` occurs anywhere in this slot.
    pub fn mentions_exist(&self, n: u16) -> bool {
        let mut found = false;
        self.walk(&mut |p| found |= *p == PseudoTypeInfo::Exist(n));
        found
    }

    /// Whether the constructor `key` occurs anywhere in this slot.
    pub fn mentions(&self, key: &TypeCtorKey) -> bool {
        let mut found = false;
        self.walk(&mut |p| {
            if let PseudoTypeInfo::Ctor(r, _) = p {
                found |= r.key() == key;
            }
        });
        found
    }

    /// Pre-order walk over this node and all nested nodes.
    pub fn walk(&self, f: &mut impl FnMut(&PseudoTypeInfo)) {
        f(self);
        if let PseudoTypeInfo::Ctor(_, args) = self {
            for arg in args {
                arg.walk(f);
            }
        }
    }

    /// Visit every constructor reference mutably, stopping at the first error.
    pub fn try_for_each_ref_mut<E>(
        &mut self,
        f: &mut impl FnMut(&mut CtorRef, usize) -> Result<(), E>,
    ) -> Result<(), E> {
        if let PseudoTypeInfo::Ctor(r, args) = self {
            f(r, args.len())?;
            for arg in args.iter_mut() {
                arg.try_for_each_ref_mut(f)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for PseudoTypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PseudoTypeInfo::Param(n) => write!(f, "T{}", n + 1),
            PseudoTypeInfo::Exist(n) => write!(f, "E{}", n + 1),
            PseudoTypeInfo::Ctor(r, args) => {
                let key = r.key();
                if key.module != crate::BUILTIN_MODULE {
                    write!(f, "{}.", key.module)?;
                }
                write!(f, "{}", key.name)?;
                if !args.is_empty() {
                    write!(f, "(")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ")")?;
                }
                Ok(())
            }
        }
    }
}
