//! Rates module - cached, fallback-aware exchange rate resolution

pub mod cache;
pub mod resolver;

pub use cache::{JsonFileRateStore, MemoryRateStore, RateCache};
pub use resolver::RateResolver;
