// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory stand-ins for the inference backend.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use keepsake_core::{CompletionEngine, EmbeddingEngine, KeepsakeError, SamplingParams};

/// Deterministic embedding engine.
///
/// Queued vectors are returned first (FIFO); once the queue is empty,
/// each text gets a stable vector derived from its bytes, so equal
/// inputs embed equally and different inputs (almost always) differ.
pub struct MockEmbedder {
    dim: usize,
    queued: Mutex<VecDeque<Vec<f32>>>,
    empty_for: Mutex<Option<String>>,
    calls: AtomicUsize,
    fail: AtomicBool,
    ready: AtomicBool,
}

impl MockEmbedder {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            queued: Mutex::new(VecDeque::new()),
            empty_for: Mutex::new(None),
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            ready: AtomicBool::new(true),
        }
    }

    /// Queue exact vectors to return, in order.
    pub fn push_vector(&self, vector: Vec<f32>) {
        self.queued.lock().unwrap().push_back(vector);
    }

    /// Make subsequent embed calls fail.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Return an empty vector for any text containing `needle`, so a
    /// single input can fail while its siblings embed normally.
    pub fn set_empty_for(&self, needle: &str) {
        *self.empty_for.lock().unwrap() = Some(needle.to_string());
    }

    /// Toggle the readiness probe.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Number of embed calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn derive_vector(&self, text: &str) -> Vec<f32> {
        let mut state: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in text.bytes() {
            state ^= byte as u64;
            state = state.wrapping_mul(0x0000_0100_0000_01b3);
        }
        (0..self.dim)
            .map(|i| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(i as u64);
                ((state >> 33) as f32 / u32::MAX as f32) - 0.5
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingEngine for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, KeepsakeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(KeepsakeError::inference("mock embedder failure"));
        }
        if let Some(needle) = self.empty_for.lock().unwrap().as_deref() {
            if text.contains(needle) {
                return Ok(Vec::new());
            }
        }
        if let Some(vector) = self.queued.lock().unwrap().pop_front() {
            return Ok(vector);
        }
        Ok(self.derive_vector(text))
    }

    async fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

/// Completion engine returning queued responses, then a default.
pub struct MockCompleter {
    queued: Mutex<VecDeque<String>>,
    default_response: String,
    calls: AtomicUsize,
    fail: AtomicBool,
    ready: AtomicBool,
}

impl MockCompleter {
    pub fn new(default_response: &str) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            default_response: default_response.to_string(),
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            ready: AtomicBool::new(true),
        }
    }

    pub fn push_response(&self, response: &str) {
        self.queued.lock().unwrap().push_back(response.to_string());
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionEngine for MockCompleter {
    async fn complete(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _params: &SamplingParams,
    ) -> Result<String, KeepsakeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(KeepsakeError::inference("mock completer failure"));
        }
        Ok(self
            .queued
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default_response.clone()))
    }

    async fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}
