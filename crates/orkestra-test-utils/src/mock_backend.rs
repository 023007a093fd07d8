// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock generation backend for deterministic testing.
//!
//! `MockBackend` implements `GenerationBackend` with pre-configured
//! responses and records every request it receives, so tests can assert
//! which model a facade actually called.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use tokio::sync::Mutex;

use orkestra_core::{
    Generation, GenerationBackend, GenerationRequest, OrkestraError, ProviderKind, TextStream,
    TokenUsage,
};

/// A mock backend that returns pre-configured responses.
///
/// Responses are popped from a FIFO queue. When the queue is empty,
/// a default "mock response" text is returned.
#[derive(Clone)]
pub struct MockBackend {
    provider: ProviderKind,
    responses: Arc<Mutex<VecDeque<Result<String, String>>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
    usage: TokenUsage,
}

impl MockBackend {
    /// Create a mock backend with an empty response queue.
    pub fn new(provider: ProviderKind) -> Self {
        Self {
            provider,
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            usage: TokenUsage {
                input_tokens: 10,
                output_tokens: 20,
            },
        }
    }

    /// Create a mock backend pre-loaded with the given responses.
    pub fn with_responses(provider: ProviderKind, responses: Vec<String>) -> Self {
        let backend = Self::new(provider);
        let queue = responses.into_iter().map(Ok).collect();
        Self {
            responses: Arc::new(Mutex::new(queue)),
            ..backend
        }
    }

    /// Token usage reported for every call.
    pub fn with_usage(mut self, input_tokens: u64, output_tokens: u64) -> Self {
        self.usage = TokenUsage {
            input_tokens,
            output_tokens,
        };
        self
    }

    /// Add a response to the end of the queue.
    pub async fn add_response(&self, text: impl Into<String>) {
        self.responses.lock().await.push_back(Ok(text.into()));
    }

    /// Queue a backend failure with the given message.
    pub async fn add_failure(&self, message: impl Into<String>) {
        self.responses.lock().await.push_back(Err(message.into()));
    }

    /// Every request received so far, in order.
    pub async fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().await.clone()
    }

    /// Models requested so far, in order.
    pub async fn called_models(&self) -> Vec<String> {
        self.requests
            .lock()
            .await
            .iter()
            .map(|r| r.model.clone())
            .collect()
    }

    async fn next_response(&self, request: &GenerationRequest) -> Result<String, OrkestraError> {
        self.requests.lock().await.push(request.clone());
        match self.responses.lock().await.pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(OrkestraError::Backend {
                provider: self.provider.to_string(),
                message,
                source: None,
            }),
            None => Ok("mock response".to_string()),
        }
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    fn provider(&self) -> ProviderKind {
        self.provider
    }

    async fn call(&self, request: &GenerationRequest) -> Result<Generation, OrkestraError> {
        let text = self.next_response(request).await?;
        Ok(Generation {
            text,
            usage: self.usage,
        })
    }

    async fn stream(&self, request: &GenerationRequest) -> Result<TextStream, OrkestraError> {
        let text = self.next_response(request).await?;
        // One fragment per word, keeping the separating spaces.
        let fragments: Vec<Result<String, OrkestraError>> = text
            .split_inclusive(' ')
            .map(|f| Ok(f.to_string()))
            .collect();
        Ok(Box::pin(stream::iter(fragments)))
    }
}
