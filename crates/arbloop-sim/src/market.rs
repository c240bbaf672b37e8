//! Synthetic pool networks.
//!
//! A generated market is a ring `T000 → T001 → … → T000` (which keeps it
//! connected) followed by `extra_pools` random pools. Rates are drawn
//! uniformly from `1 ± spread`. A share of the extra pools duplicates the
//! endpoints of an earlier pool to exercise parallel edges.

use anyhow::{Result, bail};
use arbloop_core::market::{Market, Pool};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::rng::DeterministicRng;

/// Shape of a generated market.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketSpec {
    /// Number of distinct assets (at least 2).
    pub assets: usize,
    /// Random pools added after the ring.
    pub extra_pools: usize,
    /// Half-width of the rate band around 1.0 (in `[0, 1)`).
    pub spread: f64,
    /// Percent of extra pools that reuse an earlier pool's endpoints.
    pub parallel_percent: u8,
    /// Draw per-pool lengths from `[0.5, 1.5)` instead of leaving them unset.
    pub vary_lengths: bool,
}

impl Default for MarketSpec {
    fn default() -> Self {
        Self {
            assets: 200,
            extra_pools: 400,
            spread: 0.05,
            parallel_percent: 5,
            vary_lengths: false,
        }
    }
}

impl MarketSpec {
    #[must_use]
    pub const fn total_pools(&self) -> usize {
        self.assets + self.extra_pools
    }
}

/// Label of asset `index`: `T000`, `T001`, …
#[must_use]
pub fn asset_name(index: usize) -> String {
    format!("T{index:03}")
}

/// Generate a market from `spec`; identical inputs give identical markets.
///
/// # Errors
///
/// Returns an error if `spec.assets < 2` or `spec.spread` is not in `[0, 1)`.
#[instrument]
pub fn generate_market(spec: &MarketSpec, seed: u64) -> Result<Market> {
    if spec.assets < 2 {
        bail!("a market needs at least 2 assets, got {}", spec.assets);
    }
    if !(0.0..1.0).contains(&spec.spread) {
        bail!("spread must be in [0, 1), got {}", spec.spread);
    }

    let mut rng = DeterministicRng::new(seed);
    let mut pools: Vec<Pool> = Vec::with_capacity(spec.total_pools());

    for i in 0..spec.assets {
        let pool = Pool::new(asset_name(i), asset_name((i + 1) % spec.assets), 1.0);
        pools.push(finish(pool, spec, &mut rng, pools.len()));
    }

    let mut parallel = 0_usize;
    for _ in 0..spec.extra_pools {
        let pool = if rng.hit_rate_percent(spec.parallel_percent) {
            parallel += 1;
            let earlier = &pools[rng.next_index(pools.len())];
            Pool::new(earlier.from.clone(), earlier.to.clone(), 1.0)
        } else {
            let from = rng.next_index(spec.assets);
            let mut to = rng.next_index(spec.assets);
            while to == from {
                to = rng.next_index(spec.assets);
            }
            Pool::new(asset_name(from), asset_name(to), 1.0)
        };
        pools.push(finish(pool, spec, &mut rng, pools.len()));
    }

    tracing::debug!(pools = pools.len(), parallel, "generated market");
    Ok(Market::new(pools))
}

fn finish(mut pool: Pool, spec: &MarketSpec, rng: &mut DeterministicRng, id: usize) -> Pool {
    pool.rate = 1.0 + rng.next_symmetric(spec.spread);
    if spec.vary_lengths {
        pool.length = Some(0.5 + rng.next_f64());
    }
    pool.label = Some(format!("pool-{id}"));
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn small() -> MarketSpec {
        MarketSpec {
            assets: 6,
            extra_pools: 12,
            ..MarketSpec::default()
        }
    }

    #[test]
    fn same_seed_same_market() {
        let a = generate_market(&small(), 11).expect("market");
        let b = generate_market(&small(), 11).expect("market");
        assert_eq!(a, b);
        assert_ne!(a, generate_market(&small(), 12).expect("market"));
    }

    #[test]
    fn ring_comes_first_and_covers_every_asset() {
        let market = generate_market(&small(), 5).expect("market");
        assert_eq!(market.len(), 18);
        assert_eq!(market.pools[0].from, "T000");
        assert_eq!(market.pools[5].to, "T000");

        let assets: BTreeSet<&str> = market.pools.iter().map(|p| p.from.as_str()).collect();
        assert_eq!(assets.len(), 6);
    }

    #[test]
    fn all_parallel_pools_reuse_endpoints() {
        let spec = MarketSpec {
            parallel_percent: 100,
            ..small()
        };
        let market = generate_market(&spec, 3).expect("market");
        let ring: BTreeSet<(String, String)> = market.pools[..6]
            .iter()
            .map(|p| (p.from.clone(), p.to.clone()))
            .collect();
        for pool in &market.pools[6..] {
            assert!(ring.contains(&(pool.from.clone(), pool.to.clone())));
        }
    }

    #[test]
    fn lengths_are_optional() {
        let plain = generate_market(&small(), 1).expect("market");
        assert!(plain.pools.iter().all(|p| p.length.is_none()));

        let spec = MarketSpec {
            vary_lengths: true,
            ..small()
        };
        let varied = generate_market(&spec, 1).expect("market");
        assert!(
            varied
                .pools
                .iter()
                .all(|p| p.length.is_some_and(|l| (0.5..1.5).contains(&l)))
        );
    }

    #[test]
    fn degenerate_specs_are_rejected() {
        let one = MarketSpec {
            assets: 1,
            ..small()
        };
        assert!(generate_market(&one, 0).is_err());

        let wide = MarketSpec {
            spread: 1.5,
            ..small()
        };
        assert!(generate_market(&wide, 0).is_err());
    }

    proptest! {
        #[test]
        fn rates_stay_inside_the_band(seed in any::<u64>(), spread in 0.0_f64..0.5) {
            let spec = MarketSpec { spread, ..small() };
            let market = generate_market(&spec, seed).expect("market");
            for pool in &market.pools {
                prop_assert!(pool.rate >= 1.0 - spread - 1e-12);
                prop_assert!(pool.rate <= 1.0 + spread + 1e-12);
                prop_assert_ne!(&pool.from, &pool.to);
            }
            prop_assert!(market.weights().is_ok());
        }
    }
}
