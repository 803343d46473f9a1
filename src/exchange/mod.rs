//! Exchange module - Client implementation for the exchangerate-api.com REST API

pub mod messages;
pub mod rest;

pub use rest::ExchangeRateRestClient;
