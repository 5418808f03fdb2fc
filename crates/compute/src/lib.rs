pub mod segments;

pub use segments::*;
