//! HTTP handlers for the Aphid Risk service

pub mod health;
pub mod risk;

pub use health::*;
pub use risk::*;
