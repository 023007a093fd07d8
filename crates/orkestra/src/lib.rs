// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Orkestra routes each prompt to the cheapest adequate model.
//!
//! Build one [`Orkestra`] context per process, then wrap generation
//! backends in a [`Provider`] (one provider, smart or fixed model) or a
//! [`MultiProvider`] (route every provider, pick one by strategy).

pub mod context;
pub mod multi;
pub mod provider;
pub mod response;

pub use context::Orkestra;
pub use multi::MultiProvider;
pub use provider::{ChatOptions, ModelSelection, Provider};
pub use response::Response;

pub use orkestra_config::OrkestraConfig;
pub use orkestra_core::{OrkestraError, ProviderKind, RoutingDecision, SelectionResult, Stage};
pub use orkestra_registry::{Catalog, CostBreakdown, Manifest, Strategy};
