//! Identity of a type constructor.

use alloc::borrow::Cow;
use core::fmt;

/// `(module name, type name, arity)`: uniquely identifies a type constructor
/// within a process.
///
/// Names are `Cow<'static, str>` so descriptors emitted from static data
/// don't allocate, while runtime-built descriptors can own their strings.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeCtorKey {
    pub module: Cow<'static, str>,
    pub name: Cow<'static, str>,
    pub arity: u16,
}

impl TypeCtorKey {
    pub fn new(
        module: impl Into<Cow<'static, str>>,
        name: impl Into<Cow<'static, str>>,
        arity: u16,
    ) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
            arity,
        }
    }

    /// Borrowed view of the key, usable for lookups without allocating.
    pub fn as_parts(&self) -> (&str, &str, u16) {
        (&self.module, &self.name, self.arity)
    }
}

impl fmt::Display for TypeCtorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}/{}", self.module, self.name, self.arity)
    }
}

/// Dense index of a descriptor inside the registry that owns it.
///
/// This is the lazy reference used for recursive types: argument slots name
/// other constructors by key, and the registry fills in the id once every
/// constructor of the initialization phase is known.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeCtorId(pub u32);

impl TypeCtorId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeCtorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
