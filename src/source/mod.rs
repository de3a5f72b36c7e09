pub mod loader;
pub mod row;
pub mod tables;

pub use loader::*;
pub use row::*;
pub use tables::*;
