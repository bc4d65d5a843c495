//! Decoding discriminated union values.
//!
//! Everything that looks inside a union value (unify, compare, traversal,
//! copying, printing) goes through [`TypeTable::decode_du`], which defers the
//! tag logic to [`LayoutTable::decode`](rtti_types::LayoutTable::decode).

use smallvec::SmallVec;

use rtti_types::{ArgSlot, DuRep, EnumRep, Functor, FunctorLayout};

use crate::ToString;
use crate::errors::{FatalError, fatal};
use crate::types::{TypeInfo, TypeTable};
use crate::values::RawValue;
use crate::values::raw::cell_word;

/// A union value split into its functor and cell.
#[derive(Clone, Copy)]
pub(crate) struct DuCell<'a> {
    pub functor: &'a Functor,
    pub layout: &'a FunctorLayout,
    cell: *const RawValue,
}

impl<'a> DuCell<'a> {
    pub fn arg(&self, slot: &ArgSlot) -> RawValue {
        unsafe { cell_word(self.cell, slot.offset as usize) }
    }

    /// Type infos carried for the functor's existential variables.
    pub fn exists(&self) -> SmallVec<[TypeInfo<'a>; 2]> {
        self.layout
            .exist_locns
            .iter()
            .map(|&locn| {
                let carried = unsafe { cell_word(self.cell, locn as usize).type_info };
                unsafe { *(carried as *const TypeInfo<'a>) }
            })
            .collect()
    }

    pub fn raw_word(&self, offset: u16) -> RawValue {
        unsafe { cell_word(self.cell, offset as usize) }
    }
}

impl<'a> TypeTable<'a> {
    pub(crate) fn decode_du(&self, ty: TypeInfo<'a>, du: &'a DuRep, raw: RawValue) -> DuCell<'a> {
        let cell = raw.untagged();
        let ordinal = du
            .layout
            .decode(raw.word(), || unsafe { cell_word(cell, 0) }.word())
            .unwrap_or_else(|source| {
                fatal(FatalError::BadTag {
                    ctor: ty.to_string(),
                    source,
                })
            });
        match (du.functors.get(ordinal), du.layout.functor(ordinal)) {
            (Some(functor), Some(layout)) => DuCell {
                functor,
                layout,
                cell,
            },
            _ => fatal(FatalError::MissingLayout {
                ctor: ty.to_string(),
                ordinal,
            }),
        }
    }

    /// The functor an enumeration value stands for.
    pub(crate) fn decode_enum(
        &self,
        ty: TypeInfo<'a>,
        rep: &'a EnumRep,
        raw: RawValue,
    ) -> &'a Functor {
        let ordinal = raw.word();
        u32::try_from(ordinal)
            .ok()
            .and_then(|ordinal| rep.functors.get(ordinal))
            .unwrap_or_else(|| {
                fatal(FatalError::OrdinalOutOfRange {
                    ctor: ty.to_string(),
                    ordinal,
                    num_functors: rep.functors.len(),
                })
            })
    }
}
