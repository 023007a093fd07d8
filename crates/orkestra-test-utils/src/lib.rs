// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Orkestra integration tests.
//!
//! Provides mock backends, a deterministic embedder, and router artifact
//! fixtures for fast, CI-runnable tests without model downloads or
//! provider APIs.
//!
//! # Components
//!
//! - [`MockBackend`] - Generation backend with pre-configured responses
//! - [`StubEmbedder`] - Keyword-driven embedder that counts its calls
//! - [`ArtifactFixture`] - Writes router artifacts into temp directories

pub mod fixtures;
pub mod mock_backend;
pub mod stub_embedder;

pub use fixtures::ArtifactFixture;
pub use mock_backend::MockBackend;
pub use stub_embedder::StubEmbedder;
