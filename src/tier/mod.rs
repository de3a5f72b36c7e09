pub mod anchors;
pub mod calculator;
pub mod talents;

pub use anchors::*;
pub use calculator::*;
pub use talents::*;
