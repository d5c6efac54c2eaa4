//! Domain models for the med-alt system.

mod medicine;
mod search;

pub use medicine::*;
pub use search::*;
