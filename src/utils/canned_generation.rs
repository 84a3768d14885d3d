//! In-memory generation service for testing

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use crate::traits::*;
use crate::types::*;

/// A prompt received by [`CannedGenerationService`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPrompt {
    pub prompt: String,
    pub temperature: f32,
}

/// Generation service that replays queued responses and records every prompt
#[derive(Debug, Clone, Default)]
pub struct CannedGenerationService {
    responses: Arc<Mutex<VecDeque<GenerationResult<String>>>>,
    prompts: Arc<Mutex<Vec<RecordedPrompt>>>,
}

impl CannedGenerationService {
    /// Create a service with nothing queued
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service that answers its first call with `response`
    pub fn with_response(response: impl Into<String>) -> Self {
        let service = Self::new();
        service.push_response(response);
        service
    }

    /// Create a service whose first call fails with `error`
    pub fn with_error(error: GenerationError) -> Self {
        let service = Self::new();
        service.push_error(error);
        service
    }

    pub fn push_response(&self, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Ok(response.into()));
    }

    pub fn push_error(&self, error: GenerationError) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Err(error));
    }

    /// Prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<RecordedPrompt> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl GenerationService for CannedGenerationService {
    async fn generate(&self, prompt: &str, temperature: f32) -> GenerationResult<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedPrompt {
                prompt: prompt.to_string(),
                temperature,
            });

        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| {
                Err(GenerationError::Rejected(
                    "no canned response queued".to_string(),
                ))
            })
    }
}
