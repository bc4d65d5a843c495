use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

use rtti_types::{BUILTIN_MODULE, Builtin, TypeCtorKey, TypeCtorRep};

use crate::descriptor::TypeCtorInfo;

/// A type constructor applied to concrete argument type infos.
///
/// This is what a polymorphic call site passes alongside a value. The
/// descriptor lives in a [`Registry`](crate::Registry); the argument slice is
/// interned in a [`TypeTable`](super::TypeTable) arena.
#[derive(Clone, Copy)]
pub struct TypeInfo<'a> {
    ctor: &'a TypeCtorInfo,
    args: &'a [TypeInfo<'a>],
}

impl<'a> TypeInfo<'a> {
    pub(crate) fn new(ctor: &'a TypeCtorInfo, args: &'a [TypeInfo<'a>]) -> Self {
        Self { ctor, args }
    }

    pub fn ctor(self) -> &'a TypeCtorInfo {
        self.ctor
    }

    pub fn args(self) -> &'a [TypeInfo<'a>] {
        self.args
    }

    pub fn arg(self, n: usize) -> Option<TypeInfo<'a>> {
        self.args.get(n).copied()
    }

    pub fn key(self) -> &'a TypeCtorKey {
        self.ctor.key()
    }

    pub fn builtin(self) -> Option<Builtin> {
        match self.ctor.rep() {
            TypeCtorRep::Builtin(b) => Some(*b),
            _ => None,
        }
    }
}

impl PartialEq for TypeInfo<'_> {
    fn eq(&self, other: &Self) -> bool {
        (core::ptr::eq(self.ctor, other.ctor) || self.ctor.key() == other.ctor.key())
            && self.args == other.args
    }
}

impl Eq for TypeInfo<'_> {}

impl Hash for TypeInfo<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ctor.key().hash(state);
        self.args.hash(state);
    }
}

impl PartialOrd for TypeInfo<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Module, then name, then arity, then arguments left to right.
impl Ord for TypeInfo<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        if !core::ptr::eq(self.ctor, other.ctor) {
            let by_key = self.ctor.key().cmp(other.ctor.key());
            if by_key != Ordering::Equal {
                return by_key;
            }
        }
        self.args.cmp(other.args)
    }
}

impl fmt::Debug for TypeInfo<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeInfo({})", self)
    }
}

impl fmt::Display for TypeInfo<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (open, close) = match self.builtin() {
            Some(Builtin::Tuple) => {
                f.write_str("{")?;
                ("", "}")
            }
            _ => {
                let key = self.ctor.key();
                if key.module != BUILTIN_MODULE {
                    write!(f, "{}.", key.module)?;
                }
                f.write_str(&key.name)?;
                if self.args.is_empty() {
                    return Ok(());
                }
                ("(", ")")
            }
        };
        f.write_str(open)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", arg)?;
        }
        f.write_str(close)
    }
}
