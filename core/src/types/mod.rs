pub mod table;
pub mod type_info;


pub use table::TypeTable;
pub use type_info::TypeInfo;
