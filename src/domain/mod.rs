//! Domain types
//!
//! Data model shared by the extractor, validator, pricing engine and the
//! HTTP boundary. Field names and enum spellings are part of the wire
//! contract with downstream consumers.

pub mod estimate;
pub mod intake;
pub mod specs;
pub mod validation;

pub use estimate::*;
pub use intake::*;
pub use specs::*;
pub use validation::*;
