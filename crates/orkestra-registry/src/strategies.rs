// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multi-provider selection strategies.
//!
//! Each strategy is a pure function over the per-provider routing decisions
//! and the catalog. Strategies never route; they consume decisions that were
//! already made.

use std::str::FromStr;

use orkestra_core::{OrkestraError, RoutingDecision, SelectionResult, Tier};
use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};
use tracing::debug;

use crate::catalog::{Catalog, ModelEntry};

/// A named rule for picking one winner among routed candidates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Minimize `input_price + output_price`; first candidate wins ties.
    Cheapest,
    /// Maximize tier rank, then minimize price; first candidate wins ties.
    Smartest,
    /// Prefer balanced-tier candidates, then order by `(price, provider, model)`.
    Balanced,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Cheapest, Strategy::Smartest, Strategy::Balanced];

    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Picks the winning provider and model.
    ///
    /// Fails with [`OrkestraError::NoCandidates`] on empty input, with
    /// [`OrkestraError::Config`] if a provider appears more than once, and with
    /// [`OrkestraError::UnknownProvider`]/[`OrkestraError::UnknownModel`] if a
    /// decision names something outside the catalog.
    pub fn select(
        self,
        catalog: &Catalog,
        decisions: &[RoutingDecision],
    ) -> Result<SelectionResult, OrkestraError> {
        for (i, d) in decisions.iter().enumerate() {
            if decisions[..i].iter().any(|earlier| earlier.provider == d.provider) {
                return Err(OrkestraError::Config(format!(
                    "provider `{}` has more than one routing decision",
                    d.provider
                )));
            }
        }

        let candidates = decisions
            .iter()
            .map(|d| {
                catalog
                    .model(d.provider, &d.model)
                    .map(|entry| Candidate { decision: d, entry })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let winner = match self {
            Strategy::Cheapest => cheapest(&candidates),
            Strategy::Smartest => smartest(&candidates),
            Strategy::Balanced => balanced(&candidates),
        }
        .ok_or(OrkestraError::NoCandidates)?;

        debug!(
            strategy = self.as_str(),
            candidates = candidates.len(),
            provider = %winner.decision.provider,
            model = %winner.decision.model,
            "selected provider"
        );

        Ok(SelectionResult {
            provider: winner.decision.provider,
            model: winner.decision.model.clone(),
        })
    }
}

impl FromStr for Strategy {
    type Err = OrkestraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| OrkestraError::UnknownStrategy(s.to_string()))
    }
}

/// Parses `strategy` and applies it. The name is validated before any
/// decision is inspected.
pub fn select(
    strategy: &str,
    catalog: &Catalog,
    decisions: &[RoutingDecision],
) -> Result<SelectionResult, OrkestraError> {
    strategy.parse::<Strategy>()?.select(catalog, decisions)
}

#[derive(Clone, Copy)]
struct Candidate<'a> {
    decision: &'a RoutingDecision,
    entry: &'a ModelEntry,
}

impl Candidate<'_> {
    fn price(&self) -> f64 {
        self.entry.combined_price()
    }
}

fn cheapest<'a>(candidates: &[Candidate<'a>]) -> Option<Candidate<'a>> {
    let mut best: Option<Candidate<'a>> = None;
    for &candidate in candidates {
        match best {
            Some(current) if candidate.price() >= current.price() => {}
            _ => best = Some(candidate),
        }
    }
    best
}

fn smartest<'a>(candidates: &[Candidate<'a>]) -> Option<Candidate<'a>> {
    let mut best: Option<Candidate<'a>> = None;
    for &candidate in candidates {
        let better = match best {
            None => true,
            Some(current) => {
                let rank = candidate.entry.tier.rank();
                let current_rank = current.entry.tier.rank();
                rank > current_rank
                    || (rank == current_rank && candidate.price() < current.price())
            }
        };
        if better {
            best = Some(candidate);
        }
    }
    best
}

fn balanced<'a>(candidates: &[Candidate<'a>]) -> Option<Candidate<'a>> {
    let mut pool: Vec<Candidate<'a>> = candidates
        .iter()
        .copied()
        .filter(|c| c.entry.tier == Tier::Balanced)
        .collect();
    if pool.is_empty() {
        pool = candidates.to_vec();
    }
    pool.sort_by(|a, b| {
        a.price()
            .total_cmp(&b.price())
            .then_with(|| a.decision.provider.as_str().cmp(b.decision.provider.as_str()))
            .then_with(|| a.decision.model.cmp(&b.decision.model))
    });
    pool.first().copied()
}
