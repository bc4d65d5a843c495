pub mod display;
pub mod raw;
pub mod value;

pub use display::ValueDisplay;
pub use raw::{ArrayData, ClosureData, RawValue, Slice};
pub use value::{Array, ArrayIter, Value};
