//! Market input model: pools quoting an exchange rate between two assets.
//!
//! # Edge Direction
//!
//! A pool `from → to` with rate `r` means one unit of `from` buys `r` units
//! of `to` (after fees). The engine consumes the log-rate gradient
//! `g = -ln(r)`, so a loop whose signed sum of `g` is negative multiplies
//! capital by more than one.
//!
//! # File Formats
//!
//! Markets load from TOML (default) or JSON (`.json` extension):
//!
//! ```toml
//! [[pools]]
//! from = "ETH"
//! to = "USDC"
//! rate = 3120.5
//! length = 1.0        # optional, defaults to 1.0
//! label = "uni-v2"    # optional
//! ```

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{Coded, ErrorCode};

/// Errors raised while validating or parsing a market.
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    /// Rates must be strictly positive and finite to have a logarithm.
    #[error("pool {index} ({from} -> {to}) has invalid rate {rate}")]
    InvalidRate {
        index: usize,
        from: String,
        to: String,
        rate: f64,
    },

    /// Lengths scale cycle cost and must be non-negative and finite.
    #[error("pool {index} has invalid length {length}")]
    InvalidLength { index: usize, length: f64 },

    #[error("invalid TOML market: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON market: {0}")]
    Json(#[from] serde_json::Error),
}

impl Coded for MarketError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidRate { .. } => ErrorCode::InvalidRate,
            Self::InvalidLength { .. } => ErrorCode::InvalidLength,
            Self::Toml(_) | Self::Json(_) => ErrorCode::MarketParseError,
        }
    }
}

/// One directed quote between two assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub from: String,
    pub to: String,
    /// Units of `to` received per unit of `from`.
    pub rate: f64,
    /// Per-edge cost used to normalize cycle scores. Defaults to 1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Pool {
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>, rate: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            rate,
            length: None,
            label: None,
        }
    }

    #[must_use]
    pub fn with_length(mut self, length: f64) -> Self {
        self.length = Some(length);
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// An ordered list of pools. Pool order fixes edge ids downstream.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Market {
    #[serde(default)]
    pub pools: Vec<Pool>,
}

impl Market {
    #[must_use]
    pub const fn new(pools: Vec<Pool>) -> Self {
        Self { pools }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Ordered `(from, to)` pairs, one per pool.
    #[must_use]
    pub fn edges(&self) -> Vec<(String, String)> {
        self.pools
            .iter()
            .map(|pool| (pool.from.clone(), pool.to.clone()))
            .collect()
    }

    /// Raw quoted rates, one per pool.
    #[must_use]
    pub fn rates(&self) -> Vec<f64> {
        self.pools.iter().map(|pool| pool.rate).collect()
    }

    /// Log-rate gradient `-ln(rate)` per pool.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidRate`] for the first pool whose rate is
    /// not strictly positive and finite.
    pub fn weights(&self) -> Result<Vec<f64>, MarketError> {
        self.pools
            .iter()
            .enumerate()
            .map(|(index, pool)| {
                if pool.rate.is_finite() && pool.rate > 0.0 {
                    Ok(-pool.rate.ln())
                } else {
                    Err(MarketError::InvalidRate {
                        index,
                        from: pool.from.clone(),
                        to: pool.to.clone(),
                        rate: pool.rate,
                    })
                }
            })
            .collect()
    }

    /// Per-pool length, defaulting to 1.0.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidLength`] for a negative or non-finite
    /// length.
    pub fn lengths(&self) -> Result<Vec<f64>, MarketError> {
        self.pools
            .iter()
            .enumerate()
            .map(|(index, pool)| match pool.length {
                None => Ok(1.0),
                Some(length) if length.is_finite() && length >= 0.0 => Ok(length),
                Some(length) => Err(MarketError::InvalidLength { index, length }),
            })
            .collect()
    }

    /// Parse a market from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Toml`] on malformed input.
    pub fn from_toml_str(content: &str) -> Result<Self, MarketError> {
        Ok(toml::from_str(content)?)
    }

    /// Parse a market from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Json`] on malformed input.
    pub fn from_json_str(content: &str) -> Result<Self, MarketError> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Load a market file, choosing the parser from the file extension.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_market(path: &Path) -> anyhow::Result<Market> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let market = if is_json {
        Market::from_json_str(&content)
    } else {
        Market::from_toml_str(&content)
    }
    .with_context(|| format!("Failed to parse {}", path.display()))?;

    tracing::debug!(path = %path.display(), pools = market.len(), "loaded market");
    Ok(market)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn triangle() -> Market {
        Market::new(vec![
            Pool::new("A", "B", 0.99),
            Pool::new("B", "C", 1.02),
            Pool::new("C", "A", 1.01).with_length(2.0),
        ])
    }

    #[test]
    fn weights_are_negative_log_rates() {
        let weights = triangle().weights().expect("valid rates");
        assert!((weights[0] - -(0.99_f64.ln())).abs() < 1e-15);
        assert!(weights[0] > 0.0, "rate below one has positive weight");
        assert!(weights[1] < 0.0, "rate above one has negative weight");
    }

    #[test]
    fn zero_rate_is_rejected_with_index() {
        let market = Market::new(vec![Pool::new("A", "B", 1.0), Pool::new("B", "A", 0.0)]);
        let err = market.weights().expect_err("zero rate must fail");
        assert!(matches!(err, MarketError::InvalidRate { index: 1, .. }));
        assert_eq!(err.error_code(), ErrorCode::InvalidRate);
    }

    #[test]
    fn lengths_default_to_one() {
        let lengths = triangle().lengths().expect("valid lengths");
        assert_eq!(lengths, vec![1.0, 1.0, 2.0]);
    }

    #[test]
    fn negative_length_is_rejected() {
        let market = Market::new(vec![Pool::new("A", "B", 1.0).with_length(-1.0)]);
        assert!(matches!(
            market.lengths(),
            Err(MarketError::InvalidLength { index: 0, .. })
        ));
    }

    #[test]
    fn toml_market_parses_optional_fields() {
        let market = Market::from_toml_str(
            r#"
            [[pools]]
            from = "ETH"
            to = "USDC"
            rate = 3000.0
            label = "uni"

            [[pools]]
            from = "USDC"
            to = "ETH"
            rate = 0.00033
            length = 0.5
            "#,
        )
        .expect("market parses");

        assert_eq!(market.len(), 2);
        assert_eq!(market.pools[0].label.as_deref(), Some("uni"));
        assert_eq!(market.pools[1].length, Some(0.5));
        assert_eq!(
            market.edges(),
            vec![
                ("ETH".to_string(), "USDC".to_string()),
                ("USDC".to_string(), "ETH".to_string())
            ]
        );
    }

    #[test]
    fn load_market_picks_json_by_extension() {
        let mut file = tempfile::Builder::new()
            .suffix(".json")
            .tempfile()
            .expect("temp file");
        write!(
            file,
            r#"{{"pools":[{{"from":"A","to":"B","rate":1.5}}]}}"#
        )
        .expect("write market");

        let market = load_market(file.path()).expect("json market loads");
        assert_eq!(market.pools, vec![Pool::new("A", "B", 1.5)]);
    }

    #[test]
    fn malformed_toml_maps_to_parse_code() {
        let err = Market::from_toml_str("pools = 3").expect_err("bad shape");
        assert_eq!(err.error_code(), ErrorCode::MarketParseError);
    }
}
