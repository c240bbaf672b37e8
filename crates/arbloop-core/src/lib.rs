#![forbid(unsafe_code)]
//! arbloop-core library.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums for domain failures, `anyhow::Result` for
//!   file loading. Every domain error maps to an [`error::ErrorCode`].
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod error;
pub mod market;

pub use config::{ConfigError, EngineConfig, ProjectionMode, Tolerances};
pub use error::{Coded, ErrorCode};
pub use market::{Market, MarketError, Pool};
