//! Representation kinds.
//!
//! Every type constructor has exactly one representation, fixed by the
//! compiler. The representation owns whichever tables are meaningful for its
//! kind, so a dispatcher matching on [`TypeCtorRep`] can only reach the
//! tables that exist.

use alloc::borrow::Cow;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use bitflags::bitflags;

use crate::functor::{Functor, FunctorTable, FunctorTag, Sectag};
use crate::layout::{LayoutTable, MAX_PTAGS, SectagLocn};
use crate::{BUILTIN_MODULE, CtorRef, PseudoTypeInfo, TypeCtorKey};

bitflags! {
    /// Properties of a type constructor, computed once when its descriptor
    /// is created.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    pub struct TypeCtorFlags: u16 {
        /// Declared with at least one type parameter.
        const POLYMORPHIC = 1;
        /// Some functor carries type infos for existential variables.
        const HAS_EXIST = 1 << 1;
        /// Some argument slot mentions the constructor itself.
        const SELF_REFERENTIAL = 1 << 2;
        /// Takes any number of type arguments (tuples, closures).
        const VARIABLE_ARITY = 1 << 3;
        /// Unify/compare are delegated to procedures supplied by the compiler.
        const SPECIALIZED = 1 << 4;
    }
}

/// Primitive kinds implemented by the runtime itself.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Builtin {
    Int,
    Char,
    Float,
    String,
    Array,
    Tuple,
    Closure,
    Foreign,
}

impl Builtin {
    pub const ALL: [Builtin; 8] = [
        Builtin::Int,
        Builtin::Char,
        Builtin::Float,
        Builtin::String,
        Builtin::Array,
        Builtin::Tuple,
        Builtin::Closure,
        Builtin::Foreign,
    ];

    /// Tuples and closures accept any number of type arguments.
    pub fn is_variable_arity(self) -> bool {
        matches!(self, Builtin::Tuple | Builtin::Closure)
    }

    /// Key under which the runtime registers this builtin.
    pub fn key(self) -> TypeCtorKey {
        match self {
            Builtin::Int => TypeCtorKey::new(BUILTIN_MODULE, "int", 0),
            Builtin::Char => TypeCtorKey::new(BUILTIN_MODULE, "character", 0),
            Builtin::Float => TypeCtorKey::new(BUILTIN_MODULE, "float", 0),
            Builtin::String => TypeCtorKey::new(BUILTIN_MODULE, "string", 0),
            Builtin::Array => TypeCtorKey::new("array", "array", 1),
            Builtin::Tuple => TypeCtorKey::new(BUILTIN_MODULE, "{}", 0),
            Builtin::Closure => TypeCtorKey::new(BUILTIN_MODULE, "pred", 0),
            Builtin::Foreign => TypeCtorKey::new(BUILTIN_MODULE, "c_pointer", 0),
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Discriminant of a [`TypeCtorRep`], without the tables.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RepKind {
    Enum,
    Du,
    NoTag,
    Equiv,
    Builtin(Builtin),
}

impl fmt::Display for RepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepKind::Enum => write!(f, "enum"),
            RepKind::Du => write!(f, "du"),
            RepKind::NoTag => write!(f, "notag"),
            RepKind::Equiv => write!(f, "equiv"),
            RepKind::Builtin(b) => write!(f, "builtin {:?}", b),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumRep {
    pub functors: FunctorTable,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuRep {
    pub functors: FunctorTable,
    pub layout: LayoutTable,
}

impl DuRep {
    pub fn num_ptags(&self) -> usize {
        self.layout.num_ptags()
    }
}

/// Single functor with a single argument, represented as the argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoTagRep {
    pub functors: FunctorTable,
    pub arg: PseudoTypeInfo,
}

impl NoTagRep {
    pub fn functor(&self) -> Option<&Functor> {
        self.functors.get(0)
    }
}

/// How the values of a type constructor are laid out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeCtorRep {
    /// Constants only; the value is the functor ordinal.
    Enum(EnumRep),

    /// Discriminated union with primary/secondary tags.
    Du(DuRep),

    /// Single-functor, single-argument wrapper.
    NoTag(NoTagRep),

    /// Alias of another type.
    Equiv(PseudoTypeInfo),

    Builtin(Builtin),
}

/// A malformed functor or layout table.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("type has no functors")]
    EmptyFunctorTable,

    #[error("functor ordinals must be 0..n, expected {expected} but found {found}")]
    OrdinalMismatch { expected: u32, found: u32 },

    #[error("functor {name}/{arity} is declared twice")]
    DuplicateFunctor { name: String, arity: u16 },

    #[error("functor {functor} has {found} field names for {arity} arguments")]
    FieldNamesLength {
        functor: String,
        arity: u16,
        found: usize,
    },

    #[error("enumeration functor {functor} has arguments")]
    EnumHasArguments { functor: String },

    #[error("no-tag types need exactly one functor with exactly one argument")]
    NoTagShape,

    #[error("discriminated union uses no primary tags")]
    NoPtags,

    #[error("{num_ptags} primary tags in use but only {max} fit in a word")]
    TooManyPtags { num_ptags: usize, max: usize },

    #[error("layout table describes {found} functors but the functor table has {expected}")]
    LayoutLength { expected: usize, found: usize },

    #[error("functor {functor} has no primary tag")]
    MissingTag { functor: String },

    #[error("tag of functor {functor} does not select it in the layout table")]
    TagMismatch { functor: String },

    #[error("primary tag {ptag} lists {found} alternatives but {expected} functors use it")]
    AlternativeCount {
        ptag: u8,
        expected: usize,
        found: usize,
    },

    #[error("functor {functor} has a local secondary tag but is not a constant")]
    LocalWithCell { functor: String },

    #[error("functor {functor} has an inconsistent cell layout")]
    BadCellLayout { functor: String },

    #[error("functor {functor} has {found} argument slots for arity {arity}")]
    SlotCount {
        functor: String,
        arity: u16,
        found: usize,
    },

    #[error("tags of functor {functor} do not follow declaration order")]
    TagOrder { functor: String },

    #[error("type parameter T{} used but the constructor has arity {arity}", .param + 1)]
    ParamOutOfRange { param: u16, arity: u16 },

    #[error("functor {functor} uses existential variable E{} but declares {num_exist}", .var + 1)]
    ExistOutOfRange {
        functor: String,
        var: u16,
        num_exist: u16,
    },

    #[error("existential variable E{} of functor {functor} is not bound by any argument", .var + 1)]
    UnboundExist { functor: String, var: u16 },

    #[error("existential variables are only allowed in discriminated unions")]
    ExistOutsideDu,
}

impl TypeCtorRep {
    /// An enumeration of constants in declaration order.
    pub fn enumeration(names: impl IntoIterator<Item = impl Into<Cow<'static, str>>>) -> Self {
        let functors = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Functor::new(name, i as u32, 0))
            .collect();
        TypeCtorRep::Enum(EnumRep {
            functors: FunctorTable::new(functors),
        })
    }

    /// A single-functor wrapper around one argument.
    pub fn no_tag(name: impl Into<Cow<'static, str>>, arg: PseudoTypeInfo) -> Self {
        TypeCtorRep::NoTag(NoTagRep {
            functors: FunctorTable::new(alloc::vec![Functor::new(name, 0, 1)]),
            arg,
        })
    }

    pub fn equiv(target: PseudoTypeInfo) -> Self {
        TypeCtorRep::Equiv(target)
    }

    pub fn kind(&self) -> RepKind {
        match self {
            TypeCtorRep::Enum(_) => RepKind::Enum,
            TypeCtorRep::Du(_) => RepKind::Du,
            TypeCtorRep::NoTag(_) => RepKind::NoTag,
            TypeCtorRep::Equiv(_) => RepKind::Equiv,
            TypeCtorRep::Builtin(b) => RepKind::Builtin(*b),
        }
    }

    pub fn functors(&self) -> Option<&FunctorTable> {
        match self {
            TypeCtorRep::Enum(rep) => Some(&rep.functors),
            TypeCtorRep::Du(rep) => Some(&rep.functors),
            TypeCtorRep::NoTag(rep) => Some(&rep.functors),
            TypeCtorRep::Equiv(_) | TypeCtorRep::Builtin(_) => None,
        }
    }

    pub fn layout(&self) -> Option<&LayoutTable> {
        match self {
            TypeCtorRep::Du(rep) => Some(&rep.layout),
            _ => None,
        }
    }

    /// Number of primary tag values in use. Only discriminated unions and
    /// no-tag wrappers have any.
    pub fn num_ptags(&self) -> usize {
        match self {
            TypeCtorRep::Du(rep) => rep.num_ptags(),
            TypeCtorRep::NoTag(_) => 1,
            _ => 0,
        }
    }

    pub fn num_functors(&self) -> usize {
        self.functors().map_or(0, FunctorTable::len)
    }

    /// Every argument slot type (and the alias target of an equivalence).
    pub fn for_each_pseudo(&self, f: &mut impl FnMut(&PseudoTypeInfo)) {
        match self {
            TypeCtorRep::Du(rep) => {
                for layout in rep.layout.functors() {
                    for slot in &layout.slots {
                        f(&slot.ty);
                    }
                }
            }
            TypeCtorRep::NoTag(rep) => f(&rep.arg),
            TypeCtorRep::Equiv(target) => f(target),
            TypeCtorRep::Enum(_) | TypeCtorRep::Builtin(_) => {}
        }
    }

    /// Visit every constructor reference mutably (used when the registry
    /// resolves keys to ids).
    pub fn try_for_each_ref_mut<E>(
        &mut self,
        f: &mut impl FnMut(&mut CtorRef, usize) -> Result<(), E>,
    ) -> Result<(), E> {
        match self {
            TypeCtorRep::Du(rep) => {
                let (_, functors) = rep.layout.parts_mut();
                for layout in functors {
                    for slot in layout.slots.iter_mut() {
                        slot.ty.try_for_each_ref_mut(f)?;
                    }
                }
                Ok(())
            }
            TypeCtorRep::NoTag(rep) => rep.arg.try_for_each_ref_mut(f),
            TypeCtorRep::Equiv(target) => target.try_for_each_ref_mut(f),
            TypeCtorRep::Enum(_) | TypeCtorRep::Builtin(_) => Ok(()),
        }
    }

    pub fn compute_flags(&self, key: &TypeCtorKey) -> TypeCtorFlags {
        let mut flags = TypeCtorFlags::empty();
        if key.arity > 0 {
            flags |= TypeCtorFlags::POLYMORPHIC;
        }
        if let TypeCtorRep::Builtin(b) = self {
            if b.is_variable_arity() {
                flags |= TypeCtorFlags::VARIABLE_ARITY;
            }
        }
        if self
            .functors()
            .is_some_and(|table| table.iter().any(|f| f.num_exist > 0))
        {
            flags |= TypeCtorFlags::HAS_EXIST;
        }
        let mut self_ref = false;
        self.for_each_pseudo(&mut |p| self_ref |= p.mentions(key));
        if self_ref {
            flags |= TypeCtorFlags::SELF_REFERENTIAL;
        }
        flags
    }

    /// Check the tables of this representation in isolation.
    ///
    /// Cross-descriptor checks (referenced constructors exist, arities agree,
    /// no cyclic equivalences) belong to the registry.
    pub fn validate(&self, arity: u16) -> Result<(), TableError> {
        let mut params = Ok(());
        self.for_each_pseudo(&mut |p| {
            if let Some(param) = p.max_param() {
                if param >= arity && params.is_ok() {
                    params = Err(TableError::ParamOutOfRange { param, arity });
                }
            }
        });
        params?;

        match self {
            TypeCtorRep::Enum(rep) => {
                validate_functor_table(&rep.functors)?;
                if let Some(f) = rep.functors.iter().find(|f| !f.is_constant()) {
                    return Err(TableError::EnumHasArguments {
                        functor: f.to_string(),
                    });
                }
                Ok(())
            }
            TypeCtorRep::NoTag(rep) => {
                validate_functor_table(&rep.functors)?;
                match rep.functors.as_slice() {
                    [f] if f.arity == 1 && f.num_exist == 0 => {}
                    _ => return Err(TableError::NoTagShape),
                }
                if rep.arg.max_exist().is_some() {
                    return Err(TableError::ExistOutsideDu);
                }
                Ok(())
            }
            TypeCtorRep::Equiv(target) => {
                if target.max_exist().is_some() {
                    return Err(TableError::ExistOutsideDu);
                }
                Ok(())
            }
            TypeCtorRep::Du(rep) => validate_du(rep),
            TypeCtorRep::Builtin(_) => Ok(()),
        }
    }
}

fn validate_functor_table(table: &FunctorTable) -> Result<(), TableError> {
    if table.is_empty() {
        return Err(TableError::EmptyFunctorTable);
    }
    for (i, f) in table.iter().enumerate() {
        if f.ordinal != i as u32 {
            return Err(TableError::OrdinalMismatch {
                expected: i as u32,
                found: f.ordinal,
            });
        }
        if !f.field_names.is_empty() && f.field_names.len() != f.arity as usize {
            return Err(TableError::FieldNamesLength {
                functor: f.to_string(),
                arity: f.arity,
                found: f.field_names.len(),
            });
        }
        if table.iter().take(i).any(|g| g.name == f.name && g.arity == f.arity) {
            return Err(TableError::DuplicateFunctor {
                name: f.name.to_string(),
                arity: f.arity,
            });
        }
    }
    Ok(())
}

fn validate_du(rep: &DuRep) -> Result<(), TableError> {
    let functors = &rep.functors;
    let layout = &rep.layout;
    validate_functor_table(functors)?;

    if layout.num_ptags() == 0 {
        return Err(TableError::NoPtags);
    }
    if layout.num_ptags() > MAX_PTAGS {
        return Err(TableError::TooManyPtags {
            num_ptags: layout.num_ptags(),
            max: MAX_PTAGS,
        });
    }
    if layout.functors().len() != functors.len() {
        return Err(TableError::LayoutLength {
            expected: functors.len(),
            found: layout.functors().len(),
        });
    }

    let mut prev_key = None;
    for f in functors {
        let name = || f.to_string();
        let FunctorTag::Du { ptag, sectag } = f.tag else {
            return Err(TableError::MissingTag { functor: name() });
        };

        // The layout must route the functor's tag pair back to it.
        let ptag_layout = layout
            .ptag(ptag)
            .map_err(|_| TableError::TagMismatch { functor: name() })?;
        if ptag_layout.locn != sectag.locn() {
            return Err(TableError::TagMismatch { functor: name() });
        }
        let selected = ptag_layout.select(ptag, sectag.value().unwrap_or(0) as usize);
        if selected != Ok(f.ordinal) {
            return Err(TableError::TagMismatch { functor: name() });
        }

        let key = f.tag.order_key();
        if prev_key.is_some_and(|prev| prev >= key) {
            return Err(TableError::TagOrder { functor: name() });
        }
        prev_key = Some(key);

        let Some(cell) = layout.functor(f.ordinal) else {
            return Err(TableError::LayoutLength {
                expected: functors.len(),
                found: layout.functors().len(),
            });
        };
        if matches!(sectag, Sectag::Local(_)) && (!f.is_constant() || cell.has_cell()) {
            return Err(TableError::LocalWithCell { functor: name() });
        }
        if cell.slots.len() != f.arity as usize {
            return Err(TableError::SlotCount {
                functor: name(),
                arity: f.arity,
                found: cell.slots.len(),
            });
        }
        validate_cell(f, sectag, cell).map_err(|_| TableError::BadCellLayout { functor: name() })?;

        for slot in &cell.slots {
            if let Some(var) = slot.ty.max_exist() {
                if var >= f.num_exist {
                    return Err(TableError::ExistOutOfRange {
                        functor: name(),
                        var,
                        num_exist: f.num_exist,
                    });
                }
            }
        }
        for var in 0..f.num_exist {
            if !cell.slots.iter().any(|s| s.ty.mentions_exist(var)) {
                return Err(TableError::UnboundExist {
                    functor: name(),
                    var,
                });
            }
        }
    }

    for (ptag, ptag_layout) in layout.ptags().iter().enumerate() {
        let ptag = ptag as u8;
        let expected = functors
            .iter()
            .filter(|f| matches!(f.tag, FunctorTag::Du { ptag: p, .. } if p == ptag))
            .count();
        let found = ptag_layout.alternatives.len();
        if expected != found || (ptag_layout.locn == SectagLocn::None && found != 1) {
            return Err(TableError::AlternativeCount {
                ptag,
                expected,
                found,
            });
        }
    }
    Ok(())
}

/// Every word of a cell has exactly one use: the remote secondary tag, a
/// carried type info, or an argument.
fn validate_cell(
    f: &Functor,
    sectag: Sectag,
    cell: &crate::layout::FunctorLayout,
) -> Result<(), ()> {
    let needs_cell = !f.is_constant() || matches!(sectag, Sectag::Remote(_));
    if needs_cell != cell.has_cell() || cell.exist_locns.len() != f.num_exist as usize {
        return Err(());
    }
    let mut used: Vec<bool> = alloc::vec![false; cell.cell_words as usize];
    let mut claim = |offset: u16| -> Result<(), ()> {
        match used.get_mut(offset as usize) {
            Some(slot) if !*slot => {
                *slot = true;
                Ok(())
            }
            _ => Err(()),
        }
    };
    if matches!(sectag, Sectag::Remote(_)) {
        claim(0)?;
    }
    for &locn in &cell.exist_locns {
        claim(locn)?;
    }
    for slot in &cell.slots {
        claim(slot.offset)?;
    }
    if used.iter().all(|u| *u) {
        Ok(())
    } else {
        Err(())
    }
}
