//! One-word value representation and arena-allocated payloads.
//!
//! Every value is a [`RawValue`]. What the word means is decided by the
//! value's type info; nothing in the word itself says which field is live.

use bumpalo::Bump;
use static_assertions::const_assert;

use rtti_types::TAG_MASK;
use rtti_types::layout::ptag_of;

#[repr(C)]
pub union RawValue {
    pub int_value: i64,
    pub float_value: f64,
    /// Cell of a tuple or discriminated union functor; the low bits of a
    /// union value hold the primary tag.
    pub cell: *const RawValue,
    pub slice: *const Slice,
    pub array: *const RawValue,
    /// An arena-allocated `TypeInfo` carried in a cell.
    pub type_info: *const (),
    pub closure: *const ClosureData,
    pub foreign: *const (),
}

// Primary tags live in pointer bits that cell alignment leaves free.
const_assert!(core::mem::align_of::<RawValue>() > TAG_MASK);
const_assert!(core::mem::size_of::<RawValue>() == 8);

impl Copy for RawValue {}
impl Clone for RawValue {
    fn clone(&self) -> Self {
        *self
    }
}

impl core::fmt::Debug for RawValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "RawValue({:#x})", self.word())
    }
}

impl RawValue {
    pub const fn from_int(value: i64) -> Self {
        RawValue { int_value: value }
    }

    pub const fn from_float(value: f64) -> Self {
        RawValue { float_value: value }
    }

    /// A word with no pointer provenance: constants, ordinals, lengths.
    pub const fn from_word(word: usize) -> Self {
        RawValue {
            cell: core::ptr::without_provenance(word),
        }
    }

    /// A cell pointer with `ptag` in its low bits.
    pub fn tagged(cell: *const RawValue, ptag: u8) -> Self {
        debug_assert_eq!(cell.addr() & TAG_MASK, 0, "cell is not aligned for tagging");
        RawValue {
            cell: cell.map_addr(|addr| addr | ptag as usize),
        }
    }

    /// Address bits of the word, whatever it holds.
    pub fn word(self) -> usize {
        unsafe { self.cell }.addr()
    }

    pub fn int(self) -> i64 {
        unsafe { self.int_value }
    }

    pub fn float(self) -> f64 {
        unsafe { self.float_value }
    }

    pub fn ptag(self) -> u8 {
        ptag_of(self.word())
    }

    /// The cell pointer with the primary tag masked off.
    pub fn untagged(self) -> *const RawValue {
        unsafe { self.cell }.map_addr(|addr| addr & !TAG_MASK)
    }
}

/// Allocate a cell holding `words`.
pub(crate) fn alloc_cell<'a>(arena: &'a Bump, words: &[RawValue]) -> *const RawValue {
    arena.alloc_slice_copy(words).as_ptr()
}

/// Read word `offset` of a cell.
///
/// # Safety
///
/// `cell` must point to a live cell of more than `offset` words.
pub(crate) unsafe fn cell_word(cell: *const RawValue, offset: usize) -> RawValue {
    unsafe { *cell.add(offset) }
}

/// A length-prefixed block of elements: word 0 is the length.
#[derive(Clone, Copy)]
pub struct ArrayData<'a> {
    ptr: *const RawValue,
    _marker: core::marker::PhantomData<&'a ()>,
}

impl<'a> ArrayData<'a> {
    pub fn new_with(arena: &'a Bump, values: &[RawValue]) -> ArrayData<'a> {
        let block = arena.alloc_slice_fill_with(values.len() + 1, |i| match i {
            0 => RawValue::from_word(values.len()),
            i => values[i - 1],
        });
        ArrayData {
            ptr: block.as_ptr(),
            _marker: core::marker::PhantomData,
        }
    }

    pub fn length(&self) -> usize {
        unsafe { (*self.ptr).word() }
    }

    pub fn as_slice(&self) -> &'a [RawValue] {
        unsafe { core::slice::from_raw_parts(self.ptr.add(1), self.length()) }
    }

    pub fn get(&self, index: usize) -> Option<RawValue> {
        self.as_slice().get(index).copied()
    }

    pub(crate) fn as_raw_value(&self) -> RawValue {
        RawValue { array: self.ptr }
    }

    pub(crate) fn from_raw_value(raw: RawValue) -> Self {
        ArrayData {
            ptr: unsafe { raw.array },
            _marker: core::marker::PhantomData,
        }
    }
}

/// String payload: UTF-8 bytes copied into the arena.
#[repr(C)]
pub struct Slice {
    data: *const u8,
    length: usize,
}

impl Slice {
    pub fn new<'a>(arena: &'a Bump, value: &str) -> &'a Self {
        let bytes = arena.alloc_str(value);
        arena.alloc(Slice {
            data: bytes.as_ptr(),
            length: bytes.len(),
        })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn as_bytes(&self) -> &[u8] {
        unsafe { core::slice::from_raw_parts(self.data, self.length) }
    }

    pub fn as_str(&self) -> &str {
        unsafe { core::str::from_utf8_unchecked(self.as_bytes()) }
    }

    pub(crate) fn as_raw_value(&self) -> RawValue {
        RawValue {
            slice: self as *const Slice,
        }
    }

    /// # Safety
    ///
    /// `raw` must hold a string value allocated in an arena outliving `'a`.
    pub(crate) unsafe fn from_raw_value<'a>(raw: RawValue) -> &'a Slice {
        unsafe { &*raw.slice }
    }
}

/// Opaque closure payload. Closures are compared by identity, so the only
/// thing the runtime reads is the name used when printing.
pub struct ClosureData {
    name: *const Slice,
}

impl ClosureData {
    pub fn new<'a>(arena: &'a Bump, name: &str) -> &'a Self {
        let name = Slice::new(arena, name);
        arena.alloc(ClosureData { name })
    }

    pub fn name(&self) -> &str {
        unsafe { (*self.name).as_str() }
    }

    pub(crate) fn as_raw_value(&self) -> RawValue {
        RawValue {
            closure: self as *const ClosureData,
        }
    }
}
