//! Turning a signed edge cycle into an executable trade route.
//!
//! A forward edge `u → v` with rate `r` trades `u` for `v` at `r`; a
//! reversed edge trades `v` for `u` at `1 / r`. Hops are chained greedily
//! from the first cycle entry so that each trade starts where the previous
//! one ended.

use std::fmt::Debug;

use arbloop_core::error::{Coded, ErrorCode};
use serde::Serialize;

use crate::graph::{GraphIndex, Orientation, SignedEdge};

/// Why a cycle could not be read as a closed route.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("cycle has no edges")]
    Empty,

    #[error("cycle references edge {edge}, which has no endpoints or rate")]
    UnknownEdge { edge: usize },

    #[error("no remaining hop continues the route after {hops} trades")]
    Disconnected { hops: usize },

    #[error("route ends away from its start")]
    NotClosed,
}

impl Coded for RouteError {
    fn error_code(&self) -> ErrorCode {
        ErrorCode::RouteBroken
    }
}

/// One hop of a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade<N> {
    pub edge: usize,
    pub orientation: Orientation,
    pub from: N,
    pub to: N,
    /// Units of `to` received per unit of `from`.
    pub rate: f64,
}

/// A closed walk of trades starting and ending at `start`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route<N> {
    pub start: N,
    pub trades: Vec<Trade<N>>,
    /// Product of hop rates; above 1.0 means the loop gains value.
    pub multiplier: f64,
}

impl<N: Debug> Route<N> {
    /// `A -> B -> C -> A` using `Debug` labels.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut out = format!("{:?}", self.start);
        for trade in &self.trades {
            out.push_str(&format!(" -> {:?}", trade.to));
        }
        out
    }
}

/// Order `cycle` into a closed route and compute its multiplier.
///
/// `rates` holds the quoted `source → target` rate for every edge id.
///
/// # Errors
///
/// - [`RouteError::Empty`] for an empty cycle.
/// - [`RouteError::UnknownEdge`] if an edge id has no endpoints or rate.
/// - [`RouteError::Disconnected`] if no unused hop starts where the route
///   currently ends.
/// - [`RouteError::NotClosed`] if the last hop does not return to the start.
pub fn interpret<N: Ord + Clone + Debug>(
    index: &GraphIndex<N>,
    cycle: &[SignedEdge],
    rates: &[f64],
) -> Result<Route<N>, RouteError> {
    if cycle.is_empty() {
        return Err(RouteError::Empty);
    }

    let mut hops: Vec<Option<Trade<N>>> = cycle
        .iter()
        .map(|signed| {
            let (source, target) = index
                .edge(signed.edge)
                .ok_or(RouteError::UnknownEdge { edge: signed.edge })?;
            let rate = *rates
                .get(signed.edge)
                .ok_or(RouteError::UnknownEdge { edge: signed.edge })?;
            Ok(match signed.orientation {
                Orientation::Forward => Trade {
                    edge: signed.edge,
                    orientation: signed.orientation,
                    from: source.clone(),
                    to: target.clone(),
                    rate,
                },
                Orientation::Reverse => Trade {
                    edge: signed.edge,
                    orientation: signed.orientation,
                    from: target.clone(),
                    to: source.clone(),
                    rate: 1.0 / rate,
                },
            })
        })
        .map(|hop| hop.map(Some))
        .collect::<Result<_, RouteError>>()?;

    let mut trades: Vec<Trade<N>> = Vec::with_capacity(hops.len());
    if let Some(first) = hops[0].take() {
        trades.push(first);
    }

    while trades.len() < hops.len() {
        let at = trades.last().map(|t| t.to.clone());
        let next = hops
            .iter_mut()
            .find(|hop| hop.as_ref().is_some_and(|h| Some(&h.from) == at.as_ref()))
            .and_then(Option::take)
            .ok_or(RouteError::Disconnected { hops: trades.len() })?;
        trades.push(next);
    }

    let start = trades[0].from.clone();
    if trades.last().map(|t| &t.to) != Some(&start) {
        return Err(RouteError::NotClosed);
    }

    let multiplier = trades.iter().map(|t| t.rate).product();
    Ok(Route {
        start,
        trades,
        multiplier,
    })
}
