//! The process-wide descriptor registry.
//!
//! Descriptors are collected in a [`RegistryBuilder`] during a single-threaded
//! initialization phase, validated all at once by [`RegistryBuilder::build`],
//! and frozen into a [`Registry`]. From then on the registry is read-only, so
//! lookups and dispatch need no locking.

use core::ops::RangeInclusive;

use hashbrown::{Equivalent, HashMap};

use rtti_types::{Builtin, CtorRef, PseudoTypeInfo, TypeCtorId, TypeCtorKey, TypeCtorRep};

use crate::Vec;
use crate::descriptor::{RTTI_VERSION, TypeCtorInfo};
use crate::errors::RegistryError;

/// Knobs for the initialization phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryOptions {
    /// Descriptor versions this runtime can interpret.
    pub accepted_versions: RangeInclusive<u32>,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            accepted_versions: RTTI_VERSION..=RTTI_VERSION,
        }
    }
}

/// Borrowed `(module, name, arity)`; hashes exactly like [`TypeCtorKey`].
#[derive(Hash)]
struct KeyRef<'k>(&'k str, &'k str, u16);

impl Equivalent<TypeCtorKey> for KeyRef<'_> {
    fn equivalent(&self, key: &TypeCtorKey) -> bool {
        key.as_parts() == (self.0, self.1, self.2)
    }
}

/// Collects descriptors before the registry is frozen.
#[derive(Debug)]
pub struct RegistryBuilder {
    options: RegistryOptions,
    ctors: Vec<TypeCtorInfo>,
    index: HashMap<TypeCtorKey, TypeCtorId>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::with_options(RegistryOptions::default())
    }

    /// A builder with the builtin descriptors already registered, at ids
    /// matching [`Builtin::index`].
    pub fn with_options(options: RegistryOptions) -> Self {
        let mut builder = Self {
            options,
            ctors: Vec::with_capacity(Builtin::ALL.len()),
            index: HashMap::new(),
        };
        for builtin in Builtin::ALL {
            let info = TypeCtorInfo::new(builtin.key(), TypeCtorRep::Builtin(builtin))
                .with_version(*builder.options.accepted_versions.end());
            builder.push(info);
        }
        builder
    }

    fn push(&mut self, mut info: TypeCtorInfo) -> TypeCtorId {
        let id = TypeCtorId(self.ctors.len() as u32);
        info.id = Some(id);
        self.index.insert(info.key().clone(), id);
        self.ctors.push(info);
        id
    }

    /// Add a descriptor. Keys must be unique.
    pub fn register(&mut self, info: TypeCtorInfo) -> Result<TypeCtorId, RegistryError> {
        if self.index.contains_key(info.key()) {
            return Err(RegistryError::DuplicateTypeCtor {
                key: info.key().clone(),
            });
        }
        tracing::debug!(key = %info.key(), kind = %info.kind(), "registering type constructor");
        Ok(self.push(info))
    }

    /// Register several descriptors, stopping at the first rejected one.
    pub fn register_all(
        &mut self,
        infos: impl IntoIterator<Item = TypeCtorInfo>,
    ) -> Result<(), RegistryError> {
        for info in infos {
            self.register(info)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.ctors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ctors.is_empty()
    }

    /// Validate every descriptor, resolve constructor references to ids and
    /// freeze.
    pub fn build(self) -> Result<Registry, RegistryError> {
        let RegistryBuilder {
            options,
            mut ctors,
            index,
        } = self;

        for ctor in &ctors {
            if !options.accepted_versions.contains(&ctor.version()) {
                return Err(RegistryError::VersionMismatch {
                    key: ctor.key().clone(),
                    found: ctor.version(),
                    min: *options.accepted_versions.start(),
                    max: *options.accepted_versions.end(),
                });
            }
            ctor.rep()
                .validate(ctor.arity())
                .map_err(|source| RegistryError::MalformedTable {
                    key: ctor.key().clone(),
                    source,
                })?;
        }

        let variable: Vec<bool> = ctors.iter().map(TypeCtorInfo::is_variable_arity).collect();
        for ctor in &mut ctors {
            let from = ctor.key().clone();
            ctor.rep_mut().try_for_each_ref_mut(&mut |r: &mut CtorRef, num_args: usize| {
                let id = *index
                    .get(r.key())
                    .ok_or_else(|| RegistryError::UnresolvedTypeCtor {
                        from: from.clone(),
                        missing: r.key().clone(),
                    })?;
                if !variable[id.index()] && num_args != r.key().arity as usize {
                    return Err(RegistryError::ArityMismatch {
                        from: from.clone(),
                        target: r.key().clone(),
                        expected: r.key().arity,
                        found: num_args,
                    });
                }
                r.resolve(id);
                Ok(())
            })?;
        }

        check_equiv_cycles(&ctors)?;

        tracing::debug!(type_ctors = ctors.len(), "registry frozen");
        Ok(Registry { ctors, index })
    }

    /// Build and publish as the process-wide registry.
    #[cfg(feature = "std")]
    pub fn install(self) -> Result<&'static Registry, RegistryError> {
        if GLOBAL.get().is_some() {
            return Err(RegistryError::AlreadyInstalled);
        }
        let registry = self.build()?;
        let installed = GLOBAL
            .try_insert(registry)
            .map_err(|_| RegistryError::AlreadyInstalled)?;
        tracing::debug!(type_ctors = installed.len(), "global registry installed");
        Ok(installed)
    }
}

/// An equivalence whose expansion reaches itself would never produce a
/// representation.
fn check_equiv_cycles(ctors: &[TypeCtorInfo]) -> Result<(), RegistryError> {
    let head = |ctor: &TypeCtorInfo| match ctor.rep() {
        TypeCtorRep::Equiv(PseudoTypeInfo::Ctor(r, _)) => r.id(),
        _ => None,
    };
    for start in ctors {
        let mut next = head(start);
        for _ in 0..ctors.len() {
            let Some(id) = next else { break };
            if id == start.id().unwrap_or(TypeCtorId(u32::MAX)) {
                return Err(RegistryError::EquivCycle {
                    key: start.key().clone(),
                });
            }
            next = ctors.get(id.index()).and_then(head);
        }
    }
    Ok(())
}

#[cfg(feature = "std")]
static GLOBAL: once_cell::sync::OnceCell<Registry> = once_cell::sync::OnceCell::new();

/// Frozen set of descriptors.
///
/// Every descriptor is owned here and never moves, so references handed out
/// by [`lookup`](Self::lookup) stay valid and identical for the registry's
/// lifetime.
#[derive(Debug)]
pub struct Registry {
    ctors: Vec<TypeCtorInfo>,
    index: HashMap<TypeCtorKey, TypeCtorId>,
}

impl Registry {
    /// The installed process-wide registry, if any.
    #[cfg(feature = "std")]
    pub fn global() -> Option<&'static Registry> {
        GLOBAL.get()
    }

    pub fn lookup(&self, module: &str, name: &str, arity: u16) -> Option<&TypeCtorInfo> {
        let id = self.index.get(&KeyRef(module, name, arity))?;
        self.get(*id)
    }

    pub fn lookup_key(&self, key: &TypeCtorKey) -> Option<&TypeCtorInfo> {
        self.get(*self.index.get(key)?)
    }

    pub fn get(&self, id: TypeCtorId) -> Option<&TypeCtorInfo> {
        self.ctors.get(id.index())
    }

    pub fn builtin(&self, builtin: Builtin) -> &TypeCtorInfo {
        &self.ctors[builtin.index()]
    }

    /// Whether `ctor` is one of this registry's descriptors (by identity).
    pub fn owns(&self, ctor: &TypeCtorInfo) -> bool {
        ctor.id()
            .and_then(|id| self.get(id))
            .is_some_and(|own| core::ptr::eq(own, ctor))
    }

    pub fn iter(&self) -> core::slice::Iter<'_, TypeCtorInfo> {
        self.ctors.iter()
    }

    pub fn len(&self) -> usize {
        self.ctors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ctors.is_empty()
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a TypeCtorInfo;
    type IntoIter = core::slice::Iter<'a, TypeCtorInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.ctors.iter()
    }
}
