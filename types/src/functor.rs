//! Functor tables: one row per data constructor of a type.

use alloc::borrow::Cow;
use alloc::vec::Vec;
use core::fmt;

use crate::layout::SectagLocn;

/// Secondary tag of a functor that shares its primary tag with others.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Sectag {
    /// The primary tag belongs to this functor alone.
    None,

    /// Stored in the high bits of the word itself (constants only).
    Local(u32),

    /// Stored in word 0 of the value's cell.
    Remote(u32),
}

impl Sectag {
    pub fn value(self) -> Option<u32> {
        match self {
            Sectag::None => None,
            Sectag::Local(n) | Sectag::Remote(n) => Some(n),
        }
    }

    pub fn locn(self) -> SectagLocn {
        match self {
            Sectag::None => SectagLocn::None,
            Sectag::Local(_) => SectagLocn::Local,
            Sectag::Remote(_) => SectagLocn::Remote,
        }
    }
}

/// How values of a functor are told apart from values of its siblings.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FunctorTag {
    /// Enumerations (the ordinal is the value) and no-tag wrappers (only one
    /// functor exists).
    None,

    /// Discriminated union: primary tag plus optional secondary tag.
    Du { ptag: u8, sectag: Sectag },
}

impl FunctorTag {
    pub fn du(ptag: u8, sectag: Sectag) -> Self {
        FunctorTag::Du { ptag, sectag }
    }

    /// `(ptag, sectag)` pair used as the ordering key between functors.
    pub fn order_key(self) -> (u8, u32) {
        match self {
            FunctorTag::None => (0, 0),
            FunctorTag::Du { ptag, sectag } => (ptag, sectag.value().unwrap_or(0)),
        }
    }
}

/// One data constructor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Functor {
    pub name: Cow<'static, str>,

    /// Position in the type definition. Unique and dense within a table.
    pub ordinal: u32,

    /// Number of visible arguments (carried type infos are not counted).
    pub arity: u16,

    pub tag: FunctorTag,

    /// Field names, either empty or one entry per argument.
    pub field_names: Vec<Option<Cow<'static, str>>>,

    /// Number of existentially quantified type variables.
    pub num_exist: u16,
}

impl Functor {
    pub fn new(name: impl Into<Cow<'static, str>>, ordinal: u32, arity: u16) -> Self {
        Self {
            name: name.into(),
            ordinal,
            arity,
            tag: FunctorTag::None,
            field_names: Vec::new(),
            num_exist: 0,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.arity == 0 && self.num_exist == 0
    }

    pub fn field_name(&self, arg: usize) -> Option<&str> {
        self.field_names.get(arg)?.as_deref()
    }
}

impl fmt::Display for Functor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// Ordered functor descriptors of one type constructor, indexed by ordinal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FunctorTable {
    functors: Vec<Functor>,
}

impl FunctorTable {
    /// Rows are stored sorted by ordinal. Duplicate or missing ordinals are
    /// reported by validation, not here.
    pub fn new(mut functors: Vec<Functor>) -> Self {
        functors.sort_by_key(|f| f.ordinal);
        Self { functors }
    }

    pub fn len(&self) -> usize {
        self.functors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functors.is_empty()
    }

    pub fn get(&self, ordinal: u32) -> Option<&Functor> {
        self.functors
            .get(ordinal as usize)
            .filter(|f| f.ordinal == ordinal)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Functor> {
        self.functors.iter()
    }

    /// Look a functor up by name and arity.
    pub fn find(&self, name: &str, arity: u16) -> Option<&Functor> {
        self.functors
            .iter()
            .find(|f| f.name == name && f.arity == arity)
    }

    pub fn as_slice(&self) -> &[Functor] {
        &self.functors
    }
}

impl<'a> IntoIterator for &'a FunctorTable {
    type Item = &'a Functor;
    type IntoIter = core::slice::Iter<'a, Functor>;

    fn into_iter(self) -> Self::IntoIter {
        self.functors.iter()
    }
}
