//! Building discriminated union tables from functor declarations.
//!
//! This is the compiler's side of the contract: given the functors of a type
//! in declaration order, assign primary/secondary tags and cell offsets and
//! emit the matching functor and layout tables.
//!
//! Tags are handed out in declaration order, so tag order and ordinal order
//! always agree:
//!
//! - a run of two or more consecutive constants shares one primary tag, told
//!   apart by local secondary tags;
//! - any other functor gets a primary tag of its own;
//! - once a single primary tag is left and more than one functor still needs
//!   one, all remaining functors share it through remote secondary tags.
//!
//! # Example
//!
//! ```
//! use rtti_types::{DuBuilder, FunctorDecl, PseudoTypeInfo, TypeCtorKey};
//!
//! let list = TypeCtorKey::new("list", "list", 1);
//! let rep = DuBuilder::new()
//!     .constant("nil")
//!     .functor(
//!         FunctorDecl::new("cons")
//!             .arg(PseudoTypeInfo::param(0))
//!             .arg(PseudoTypeInfo::ctor(list, [PseudoTypeInfo::param(0)])),
//!     )
//!     .build()
//!     .unwrap();
//! assert_eq!(rep.num_ptags(), 2);
//! ```

use alloc::borrow::Cow;
use alloc::string::ToString;
use alloc::vec::Vec;

use crate::functor::{Functor, FunctorTable, FunctorTag, Sectag};
use crate::layout::{ArgSlot, FunctorLayout, LayoutTable, MAX_PTAGS, PtagLayout, SectagLocn};
use crate::rep::{DuRep, TableError, TypeCtorRep};
use crate::PseudoTypeInfo;

/// Declaration of one functor of a discriminated union.
#[derive(Clone, Debug)]
pub struct FunctorDecl {
    name: Cow<'static, str>,
    args: Vec<(Option<Cow<'static, str>>, PseudoTypeInfo)>,
    num_exist: u16,
    tag: Option<(u8, Sectag)>,
}

impl FunctorDecl {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            num_exist: 0,
            tag: None,
        }
    }

    /// Append a positional argument.
    pub fn arg(mut self, ty: PseudoTypeInfo) -> Self {
        self.args.push((None, ty));
        self
    }

    /// Append a named argument.
    pub fn field(mut self, name: impl Into<Cow<'static, str>>, ty: PseudoTypeInfo) -> Self {
        self.args.push((Some(name.into()), ty));
        self
    }

    /// Declare `n` existentially quantified type variables (`E1..En`).
    pub fn exist(mut self, n: u16) -> Self {
        self.num_exist = n;
        self
    }

    /// Use an explicit tag instead of automatic assignment. Either every
    /// functor of a type has an explicit tag or none does.
    pub fn tag(mut self, ptag: u8, sectag: Sectag) -> Self {
        self.tag = Some((ptag, sectag));
        self
    }

    fn is_constant(&self) -> bool {
        self.args.is_empty() && self.num_exist == 0
    }
}

/// Collects functor declarations and emits a [`TypeCtorRep::Du`].
#[derive(Clone, Debug, Default)]
pub struct DuBuilder {
    functors: Vec<FunctorDecl>,
}

impl DuBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn functor(mut self, decl: FunctorDecl) -> Self {
        self.functors.push(decl);
        self
    }

    pub fn constant(self, name: impl Into<Cow<'static, str>>) -> Self {
        self.functor(FunctorDecl::new(name))
    }

    pub fn build(self) -> Result<TypeCtorRep, TableError> {
        let tags = match self.functors.iter().position(|d| d.tag.is_some()) {
            None => assign_tags(&self.functors),
            Some(_) => {
                if let Some(d) = self.functors.iter().find(|d| d.tag.is_none()) {
                    return Err(TableError::MissingTag {
                        functor: d.name.to_string(),
                    });
                }
                self.functors.iter().filter_map(|d| d.tag).collect()
            }
        };

        let num_ptags = tags.iter().map(|(p, _)| *p as usize + 1).max().unwrap_or(0);
        let mut ptags: Vec<PtagLayout> = (0..num_ptags)
            .map(|_| PtagLayout {
                locn: SectagLocn::None,
                alternatives: Vec::new(),
            })
            .collect();
        let mut by_ptag: Vec<Vec<(u32, u32)>> = alloc::vec![Vec::new(); num_ptags];

        let mut functors = Vec::with_capacity(self.functors.len());
        let mut layouts = Vec::with_capacity(self.functors.len());
        for (ordinal, (decl, &(ptag, sectag))) in self.functors.into_iter().zip(&tags).enumerate() {
            let ordinal = ordinal as u32;
            by_ptag[ptag as usize].push((sectag.value().unwrap_or(0), ordinal));
            if by_ptag[ptag as usize].len() == 1 {
                ptags[ptag as usize].locn = sectag.locn();
            }

            let mut offset: u16 = if matches!(sectag, Sectag::Remote(_)) { 1 } else { 0 };
            let exist_locns = (0..decl.num_exist)
                .map(|_| {
                    offset += 1;
                    offset - 1
                })
                .collect();
            let mut field_names = Vec::new();
            let mut slots = Vec::with_capacity(decl.args.len());
            let named = decl.args.iter().any(|(name, _)| name.is_some());
            for (name, ty) in decl.args {
                if named {
                    field_names.push(name);
                }
                slots.push(ArgSlot { offset, ty });
                offset += 1;
            }

            let mut functor = Functor::new(decl.name, ordinal, slots.len() as u16);
            functor.tag = FunctorTag::du(ptag, sectag);
            functor.field_names = field_names;
            functor.num_exist = decl.num_exist;
            functors.push(functor);
            layouts.push(FunctorLayout {
                cell_words: offset,
                exist_locns,
                slots,
            });
        }

        for (layout, mut sharers) in ptags.iter_mut().zip(by_ptag) {
            sharers.sort_by_key(|(sectag, _)| *sectag);
            layout.alternatives = sharers.into_iter().map(|(_, ordinal)| ordinal).collect();
        }

        Ok(TypeCtorRep::Du(DuRep {
            functors: FunctorTable::new(functors),
            layout: LayoutTable::new(ptags, layouts),
        }))
    }
}

fn assign_tags(decls: &[FunctorDecl]) -> Vec<(u8, Sectag)> {
    let mut tags = Vec::with_capacity(decls.len());
    let mut ptag = 0usize;
    let mut i = 0;
    while i < decls.len() {
        let left = decls.len() - i;
        if MAX_PTAGS - ptag == 1 && left > 1 {
            tags.extend((0..left as u32).map(|n| (ptag as u8, Sectag::Remote(n))));
            break;
        }
        let run = decls[i..].iter().take_while(|d| d.is_constant()).count();
        if run > 1 {
            tags.extend((0..run as u32).map(|n| (ptag as u8, Sectag::Local(n))));
            i += run;
        } else {
            tags.push((ptag as u8, Sectag::None));
            i += 1;
        }
        ptag += 1;
    }
    tags
}
