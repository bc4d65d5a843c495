use bumpalo::Bump;
use core::cell::RefCell;
use hashbrown::{DefaultHashBuilder, HashSet};
use smallvec::SmallVec;

use rtti_types::{Builtin, CtorRef, PseudoTypeInfo, TypeCtorRep};

use crate::ToString;
use crate::descriptor::TypeCtorInfo;
use crate::errors::{FatalError, TypeError, fatal};
use crate::registry::Registry;
use crate::types::TypeInfo;

/// Builds type infos for one registry, allocating in one arena.
///
/// Argument lists are interned, so resolving the same slot type over and
/// over (walking a long list, say) allocates once.
pub struct TypeTable<'a> {
    registry: &'a Registry,
    arena: &'a Bump,
    interned: RefCell<HashSet<&'a [TypeInfo<'a>], DefaultHashBuilder, &'a Bump>>,
}

impl<'a> TypeTable<'a> {
    pub fn new(registry: &'a Registry, arena: &'a Bump) -> Self {
        Self {
            registry,
            arena,
            interned: RefCell::new(HashSet::new_in(arena)),
        }
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    pub fn arena(&self) -> &'a Bump {
        self.arena
    }

    fn intern_args(&self, args: &[TypeInfo<'a>]) -> &'a [TypeInfo<'a>] {
        if args.is_empty() {
            return &[];
        }
        if let Some(&interned) = self.interned.borrow().get(args) {
            return interned;
        }
        let arena_args: &'a [TypeInfo<'a>] = self.arena.alloc_slice_copy(args);
        self.interned.borrow_mut().insert(arena_args);
        arena_args
    }

    fn make(&self, ctor: &'a TypeCtorInfo, args: &[TypeInfo<'a>]) -> TypeInfo<'a> {
        TypeInfo::new(ctor, self.intern_args(args))
    }

    /// Apply a registered constructor to argument type infos.
    pub fn apply(
        &self,
        ctor: &'a TypeCtorInfo,
        args: &[TypeInfo<'a>],
    ) -> Result<TypeInfo<'a>, TypeError> {
        if !self.registry.owns(ctor) {
            let (module, name, arity) = ctor.key().as_parts();
            return Err(TypeError::UnknownTypeCtor {
                module: module.to_string(),
                name: name.to_string(),
                arity,
            });
        }
        if !ctor.is_variable_arity() && args.len() != ctor.arity() as usize {
            return Err(TypeError::WrongTypeArity {
                ctor: ctor.to_string(),
                expected: ctor.arity(),
                found: args.len(),
            });
        }
        Ok(self.make(ctor, args))
    }

    /// Look up `module.name/args.len()` and apply it to `args`.
    pub fn lookup(
        &self,
        module: &str,
        name: &str,
        args: &[TypeInfo<'a>],
    ) -> Result<TypeInfo<'a>, TypeError> {
        let arity = args.len() as u16;
        let ctor = self
            .registry
            .lookup(module, name, arity)
            .ok_or_else(|| TypeError::UnknownTypeCtor {
                module: module.to_string(),
                name: name.to_string(),
                arity,
            })?;
        self.apply(ctor, args)
    }

    fn builtin(&self, builtin: Builtin, args: &[TypeInfo<'a>]) -> TypeInfo<'a> {
        self.make(self.registry.builtin(builtin), args)
    }

    pub fn int(&self) -> TypeInfo<'a> {
        self.builtin(Builtin::Int, &[])
    }

    pub fn char(&self) -> TypeInfo<'a> {
        self.builtin(Builtin::Char, &[])
    }

    pub fn float(&self) -> TypeInfo<'a> {
        self.builtin(Builtin::Float, &[])
    }

    pub fn string(&self) -> TypeInfo<'a> {
        self.builtin(Builtin::String, &[])
    }

    pub fn c_pointer(&self) -> TypeInfo<'a> {
        self.builtin(Builtin::Foreign, &[])
    }

    pub fn array(&self, elem: TypeInfo<'a>) -> TypeInfo<'a> {
        self.builtin(Builtin::Array, &[elem])
    }

    pub fn tuple(&self, elems: &[TypeInfo<'a>]) -> TypeInfo<'a> {
        self.builtin(Builtin::Tuple, elems)
    }

    /// Closure type; `args` are the closure's argument types.
    pub fn closure(&self, args: &[TypeInfo<'a>]) -> TypeInfo<'a> {
        self.builtin(Builtin::Closure, args)
    }

    /// Descriptor a resolved reference points to.
    pub(crate) fn ctor_of(&self, r: &CtorRef) -> &'a TypeCtorInfo {
        match r.id().and_then(|id| self.registry.get(id)) {
            Some(ctor) if ctor.key() == r.key() => ctor,
            _ => fatal(FatalError::UnresolvedRef {
                key: r.key().clone(),
            }),
        }
    }

    /// Substitute `owner`'s arguments for type parameters and `exists` for
    /// existential variables.
    pub fn resolve(
        &self,
        pseudo: &PseudoTypeInfo,
        owner: TypeInfo<'a>,
        exists: &[TypeInfo<'a>],
    ) -> TypeInfo<'a> {
        match pseudo {
            PseudoTypeInfo::Param(n) => owner.arg(*n as usize).unwrap_or_else(|| {
                fatal(FatalError::UnboundParam {
                    ctor: owner.to_string(),
                    param: *n,
                    available: owner.args().len(),
                })
            }),
            PseudoTypeInfo::Exist(n) => exists.get(*n as usize).copied().unwrap_or_else(|| {
                fatal(FatalError::UnboundExist {
                    ctor: owner.to_string(),
                    var: *n,
                })
            }),
            PseudoTypeInfo::Ctor(r, args) => {
                let ctor = self.ctor_of(r);
                let args: SmallVec<[TypeInfo<'a>; 4]> = args
                    .iter()
                    .map(|arg| self.resolve(arg, owner, exists))
                    .collect();
                self.make(ctor, &args)
            }
        }
    }

    /// Follow equivalences until a type with its own representation.
    pub fn expand(&self, mut ty: TypeInfo<'a>) -> TypeInfo<'a> {
        while let TypeCtorRep::Equiv(target) = ty.ctor().rep() {
            ty = self.resolve(target, ty, &[]);
        }
        ty
    }

    /// Abort unless `ty` was built against this table's registry.
    pub(crate) fn check_owned(&self, ty: TypeInfo<'a>) {
        if !self.registry.owns(ty.ctor()) {
            fatal(FatalError::ForeignDescriptor {
                ctor: ty.key().clone(),
            });
        }
    }
}
