// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model catalog, pricing, and selection strategies for Orkestra.
//!
//! This crate provides:
//! - **Catalog**: the validated, immutable provider -> model registry with tiers,
//!   base models and fallback models
//! - **Pricing**: linear per-million-token cost calculation and savings breakdowns
//! - **Strategies**: deterministic choice of one provider+model among routed candidates
//! - **Manifest**: a serializable description of everything above

pub mod catalog;
pub mod manifest;
pub mod pricing;
pub mod strategies;

pub use catalog::{Catalog, ModelEntry, ProviderCatalog};
pub use manifest::{ArtifactInfo, Manifest, ModelManifest, ProviderManifest};
pub use pricing::{CostBreakdown, calculate_cost};
pub use strategies::{Strategy, select};
