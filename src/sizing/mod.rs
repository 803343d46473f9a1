//! Sizing module for turning a risk budget into a position size
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    INPUT (sync)                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TradeForm.validate() → TradeRequest | per-field errors     │
//! └─────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ASYNC (rates)                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  LotSizeService.calculate()                                 │
//! │    ├─ RateResolver.resolve_local_rate(USD)  ┐ concurrently  │
//! │    └─ RateResolver.resolve_to_usd(quote)    ┘               │
//! │       (cache → provider → fallback + warning)               │
//! └─────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PURE (sync)                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  compute_sizing() → SizingResult                            │
//! │  SizingReport::new() → display strings                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`TradeForm`]: Raw form input and its validation
//! - [`PositionSizer`] / [`compute_sizing`]: Risk-to-lot-size arithmetic
//! - [`LotSizeService`]: Rate resolution plus sizing
//! - [`SizingReport`]: Formatted output
//!
//! # Example
//!
//! ```ignore
//! let request = TradeForm::new()
//!     .pair("EURUSD")
//!     .balance("1000000")
//!     .risk_amount("2")
//!     .entry_price("1.1000")
//!     .stop_loss("1.0950")
//!     .validate(service.pairs())?;
//!
//! let outcome = service.calculate(&request).await?;
//! println!("{}", SizingReport::new(&outcome.result, "NGN"));
//! ```

mod calculator;
mod report;
mod service;
mod validation;

pub use calculator::{compute_sizing, PositionSizer, USD_QUOTED_PIP_VALUE};
pub use report::{currency_symbol, format_amount, format_money, SizingReport, NOT_APPLICABLE};
pub use service::LotSizeService;
pub use validation::{messages, TradeForm};
