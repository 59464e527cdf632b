//! Scripted text generator for orchestrator and route tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use cluecard_core::error::GenerationError;
use cluecard_core::textgen::{GenerationRequest, TextGenerator};

/// One canned outcome of a `generate` call.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Return this text.
    Text(String),
    /// Fail with this error.
    Fail(GenerationError),
    /// Sleep for this long before returning an empty body. Used to trip the
    /// orchestrator's per-attempt timeout.
    Hang(Duration),
}

impl ScriptedReply {
    /// Convenience: a well-formed `{"clues": [...]}` body.
    #[must_use]
    pub fn clues(clues: &[&str]) -> Self {
        Self::Text(serde_json::json!({ "clues": clues }).to_string())
    }
}

/// Plays back replies in order, then repeats the last one forever.
#[derive(Debug)]
pub struct ScriptedTextGenerator {
    script: Mutex<VecDeque<ScriptedReply>>,
    last: Mutex<Option<ScriptedReply>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedTextGenerator {
    /// Creates a generator that plays `replies` in order.
    ///
    /// # Panics
    ///
    /// Panics if `replies` is empty.
    #[must_use]
    pub fn new(replies: Vec<ScriptedReply>) -> Self {
        assert!(!replies.is_empty(), "a script needs at least one reply");
        Self {
            script: Mutex::new(replies.into()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Creates a generator that returns `reply` on every call.
    #[must_use]
    pub fn repeating(reply: ScriptedReply) -> Self {
        Self::new(vec![reply])
    }

    /// Number of `generate` calls made so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Snapshot of every request received, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_reply(&self) -> ScriptedReply {
        let mut script = self.script.lock().unwrap();
        let mut last = self.last.lock().unwrap();
        if let Some(reply) = script.pop_front() {
            *last = Some(reply.clone());
            reply
        } else {
            last.clone().expect("script was non-empty at construction")
        }
    }
}

#[async_trait]
impl TextGenerator for ScriptedTextGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.next_reply() {
            ScriptedReply::Text(text) => Ok(text),
            ScriptedReply::Fail(err) => Err(err),
            ScriptedReply::Hang(duration) => {
                tokio::time::sleep(duration).await;
                Ok(String::new())
            }
        }
    }
}
