//! Domain models for aphid risk estimation

mod location;
mod risk;
mod weather;

pub use location::*;
pub use risk::*;
pub use weather::*;
