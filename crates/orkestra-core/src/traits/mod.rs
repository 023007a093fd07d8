// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits at the seams between routing stages.
//!
//! Each stage depends on a trait rather than a concrete implementation, so
//! the ONNX embedder, nearest-neighbor classifier and provider clients can
//! be swapped (or mocked in tests) independently.

pub mod classifier;
pub mod embedding;
pub mod provider;

pub use classifier::Classifier;
pub use embedding::Embedder;
pub use provider::{GenerationBackend, TextStream};
