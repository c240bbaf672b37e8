#![forbid(unsafe_code)]
//! arbloop-sim library.
//!
//! Seeded generation of synthetic pool networks for tests, benchmarks and
//! the `arbloop sim` command.
//!
//! # Conventions
//!
//! - **Errors**: Use `anyhow::Result` for return types.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod market;
pub mod rng;

pub use market::{MarketSpec, asset_name, generate_market};
pub use rng::DeterministicRng;
