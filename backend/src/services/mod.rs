//! Business logic services for the Aphid Risk service

pub mod risk;

pub use risk::RiskService;
