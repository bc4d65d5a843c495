//! Layout tables: where a discriminated union value keeps its tags,
//! carried type infos and arguments.
//!
//! A value is one machine word. The low [`TAG_BITS`] bits hold the primary
//! tag. What the rest of the word means is decided per primary tag by its
//! [`SectagLocn`]:
//!
//! - `None`: the primary tag identifies the functor. The word is either the
//!   bare tag (a constant) or a tagged pointer to the functor's cell.
//! - `Local`: constants sharing the primary tag; the secondary tag sits in
//!   the bits above the primary tag.
//! - `Remote`: the word is a tagged pointer and the secondary tag is word 0
//!   of the cell.
//!
//! [`LayoutTable::decode`] is the one decoding algorithm every consumer uses
//! (unify, compare, traversal, copying, printing).

use alloc::vec::Vec;

use crate::PseudoTypeInfo;
use crate::functor::{FunctorTag, Sectag};

/// Number of low bits of a word reserved for the primary tag.
pub const TAG_BITS: u32 = if usize::BITS >= 64 { 3 } else { 2 };

/// Number of distinct primary tag values.
pub const MAX_PTAGS: usize = 1 << TAG_BITS;

pub const TAG_MASK: usize = MAX_PTAGS - 1;

#[inline]
pub fn ptag_of(word: usize) -> u8 {
    (word & TAG_MASK) as u8
}

#[inline]
pub fn local_word(ptag: u8, sectag: u32) -> usize {
    ((sectag as usize) << TAG_BITS) | ptag as usize
}

#[inline]
pub fn local_sectag_of(word: usize) -> usize {
    word >> TAG_BITS
}

/// Where the secondary tag of a primary tag's functors lives.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SectagLocn {
    None,
    Local,
    Remote,
}

/// Malformed tag found while decoding a value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    #[error("primary tag {ptag} is not in use (type has {num_ptags} primary tags)")]
    PtagOutOfRange { ptag: u8, num_ptags: usize },

    #[error("secondary tag {sectag} on primary tag {ptag} is out of range ({count} alternatives)")]
    SectagOutOfRange { ptag: u8, sectag: usize, count: usize },
}

/// All functors sharing one primary tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PtagLayout {
    pub locn: SectagLocn,

    /// Functor ordinals indexed by secondary tag. Exactly one entry when
    /// `locn` is `None`.
    pub alternatives: Vec<u32>,
}

impl PtagLayout {
    /// Functor ordinal selected by `sectag` on primary tag `ptag`.
    pub fn select(&self, ptag: u8, sectag: usize) -> Result<u32, TagError> {
        self.alternatives
            .get(sectag)
            .copied()
            .ok_or(TagError::SectagOutOfRange {
                ptag,
                sectag,
                count: self.alternatives.len(),
            })
    }
}

/// One argument of a functor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArgSlot {
    /// Word offset of the argument in the cell.
    pub offset: u16,

    /// Static type of the argument.
    pub ty: PseudoTypeInfo,
}

impl ArgSlot {
    /// The argument's type depends on type infos carried in the cell.
    pub fn is_carried(&self) -> bool {
        self.ty.max_exist().is_some()
    }
}

/// How a tag is written into a fresh value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TagEncoding {
    /// The whole value is this word; no cell.
    Word(usize),

    /// The value is a pointer to a cell tagged with `ptag`; a remote
    /// secondary tag, if any, goes to word 0 of the cell.
    Cell { ptag: u8, remote_sectag: Option<u32> },
}

/// Physical layout of one functor's cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctorLayout {
    /// Total words in the cell (0 when the functor has no cell).
    pub cell_words: u16,

    /// Cell offset of the carried type info of each existential variable.
    pub exist_locns: Vec<u16>,

    pub slots: Vec<ArgSlot>,
}

impl FunctorLayout {
    pub fn has_cell(&self) -> bool {
        self.cell_words > 0
    }

    /// Encoding of a functor with tag `tag` and this layout.
    pub fn encoding(&self, tag: FunctorTag) -> TagEncoding {
        let FunctorTag::Du { ptag, sectag } = tag else {
            return TagEncoding::Word(0);
        };
        match (sectag, self.has_cell()) {
            (Sectag::Local(n), _) => TagEncoding::Word(local_word(ptag, n)),
            (Sectag::None, false) => TagEncoding::Word(ptag as usize),
            (Sectag::None, true) => TagEncoding::Cell {
                ptag,
                remote_sectag: None,
            },
            (Sectag::Remote(n), _) => TagEncoding::Cell {
                ptag,
                remote_sectag: Some(n),
            },
        }
    }
}

/// Tag dispatch and argument layout of a discriminated union.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayoutTable {
    /// Indexed by primary tag.
    ptags: Vec<PtagLayout>,

    /// Indexed by functor ordinal.
    functors: Vec<FunctorLayout>,
}

impl LayoutTable {
    pub fn new(ptags: Vec<PtagLayout>, functors: Vec<FunctorLayout>) -> Self {
        Self { ptags, functors }
    }

    pub fn num_ptags(&self) -> usize {
        self.ptags.len()
    }

    pub fn ptags(&self) -> &[PtagLayout] {
        &self.ptags
    }

    pub fn functors(&self) -> &[FunctorLayout] {
        &self.functors
    }

    pub fn ptag(&self, ptag: u8) -> Result<&PtagLayout, TagError> {
        self.ptags
            .get(ptag as usize)
            .ok_or(TagError::PtagOutOfRange {
                ptag,
                num_ptags: self.ptags.len(),
            })
    }

    pub fn functor(&self, ordinal: u32) -> Option<&FunctorLayout> {
        self.functors.get(ordinal as usize)
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut [PtagLayout], &mut [FunctorLayout]) {
        (&mut self.ptags, &mut self.functors)
    }

    /// Decode the functor ordinal of a value word.
    ///
    /// `remote_sectag` reads word 0 of the cell; it is only called when the
    /// primary tag's secondary tag is remote.
    pub fn decode(
        &self,
        word: usize,
        remote_sectag: impl FnOnce() -> usize,
    ) -> Result<u32, TagError> {
        let ptag = ptag_of(word);
        let layout = self.ptag(ptag)?;
        let sectag = match layout.locn {
            SectagLocn::None => 0,
            SectagLocn::Local => local_sectag_of(word),
            SectagLocn::Remote => remote_sectag(),
        };
        layout.select(ptag, sectag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_local_word_round_trip() {
        let word = local_word(2, 5);
        assert_eq!(ptag_of(word), 2);
        assert_eq!(local_sectag_of(word), 5);
    }

    #[test]
    fn test_decode_rejects_unused_ptag() {
        let table = LayoutTable::new(
            vec![PtagLayout {
                locn: SectagLocn::None,
                alternatives: vec![0],
            }],
            vec![FunctorLayout {
                cell_words: 0,
                exist_locns: vec![],
                slots: vec![],
            }],
        );
        assert_eq!(table.decode(0, || unreachable!()), Ok(0));
        assert_eq!(
            table.decode(3, || unreachable!()),
            Err(TagError::PtagOutOfRange {
                ptag: 3,
                num_ptags: 1
            })
        );
    }

    #[test]
    fn test_decode_reads_remote_sectag_only_when_remote() {
        let table = LayoutTable::new(
            vec![
                PtagLayout {
                    locn: SectagLocn::Local,
                    alternatives: vec![0, 1],
                },
                PtagLayout {
                    locn: SectagLocn::Remote,
                    alternatives: vec![2, 3],
                },
            ],
            vec![],
        );
        assert_eq!(table.decode(local_word(0, 1), || unreachable!()), Ok(1));
        assert_eq!(table.decode(0x1000 | 1, || 1), Ok(3));
        assert_eq!(
            table.decode(0x1000 | 1, || 7),
            Err(TagError::SectagOutOfRange {
                ptag: 1,
                sectag: 7,
                count: 2
            })
        );
    }
}
