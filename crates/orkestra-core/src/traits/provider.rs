// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text generation backend trait for hosted providers (Google, Anthropic, OpenAI).

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::OrkestraError;
use crate::types::{Generation, GenerationRequest, ProviderKind};

/// A stream of generated text fragments.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, OrkestraError>> + Send>>;

/// A provider's text generation API.
///
/// Orkestra only decides *which* model to call; the wire protocol behind
/// this trait belongs to the implementor.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// The provider this backend talks to.
    fn provider(&self) -> ProviderKind;

    /// Generates a complete response with token usage.
    async fn call(&self, request: &GenerationRequest) -> Result<Generation, OrkestraError>;

    /// Generates a response as a stream of text fragments.
    async fn stream(&self, request: &GenerationRequest) -> Result<TextStream, OrkestraError>;
}
