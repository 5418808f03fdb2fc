pub mod geometry;
pub mod properties;
pub mod symbol;

pub use geometry::*;
pub use properties::*;
pub use symbol::*;
