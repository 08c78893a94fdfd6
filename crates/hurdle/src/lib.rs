#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hurdle/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! ## Pipeline
//!
//! 1. [`MetricSpec`] parses the screening expression (a field or a ratio).
//! 2. [`frame::WideFrame`] pivots long-format rows into an aligned
//!    date × ticker matrix and computes per-ticker forward returns.
//! 3. [`ForwardReturnScreen`] filters metric-passing positions and bins the
//!    surviving returns into a [`BinnedHistogram`] plus a
//!    [`HistogramRender`] description.
//!
//! The computation is synchronous, single-threaded, performs no I/O, and is
//! deterministic: the automatic bin rule depends only on the value
//! distribution, never on insertion order.

/// The version of the hurdle crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod frame;
pub mod histogram;
pub mod metric;
pub mod render;
pub mod screen;
pub mod types;

// Re-exports
pub use error::{HurdleError, Result};
pub use histogram::{BinSpec, BinnedHistogram};
pub use metric::MetricSpec;
pub use render::HistogramRender;
pub use screen::{ForwardReturnScreen, ScreenConfig, ScreenResult};
pub use types::{Date, MarketData};
