//! Common test doubles for the model client and spec store, plus document fixtures.
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value as JsonValue, json};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use uispec::prelude::*;

/// One scripted model reply.
pub enum Reply {
    Json(JsonValue, Option<TokenUsage>),
    Text(String),
    Fail(ModelError),
    /// Never resolves; only an attempt deadline ends it.
    Hang,
}

impl Reply {
    pub fn json(value: JsonValue) -> Self {
        Reply::Json(value, None)
    }

    pub fn json_with_usage(value: JsonValue, prompt_tokens: u64, response_tokens: u64) -> Self {
        Reply::Json(
            value,
            Some(TokenUsage {
                prompt_tokens,
                response_tokens,
            }),
        )
    }
}

/// A `ModelClient` that plays back replies in order.
///
/// Once the script is exhausted every call fails with a transport error, so an
/// empty script is a model that always fails.
#[derive(Default)]
pub struct ScriptedModelClient {
    replies: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<String>>,
    json_calls: AtomicUsize,
    text_calls: AtomicUsize,
}

impl ScriptedModelClient {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Default::default()
        })
    }

    pub fn always_failing() -> Arc<Self> {
        Self::new([])
    }

    pub fn json_calls(&self) -> usize {
        self.json_calls.load(Ordering::SeqCst)
    }

    pub fn text_calls(&self) -> usize {
        self.text_calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    fn next(&self, prompt: &str) -> Option<Reply> {
        self.prompts.lock().push(prompt.to_string());
        self.replies.lock().pop_front()
    }
}

#[async_trait]
impl ModelClient for ScriptedModelClient {
    async fn generate_json(
        &self,
        prompt: &str,
    ) -> std::result::Result<ModelOutput<JsonValue>, ModelError> {
        self.json_calls.fetch_add(1, Ordering::SeqCst);
        match self.next(prompt) {
            Some(Reply::Json(data, usage)) => Ok(ModelOutput { data, usage }),
            Some(Reply::Text(text)) => Ok(ModelOutput::new(JsonValue::String(text))),
            Some(Reply::Fail(error)) => Err(error),
            Some(Reply::Hang) => std::future::pending().await,
            None => Err(ModelError::Transport("no scripted reply".to_string())),
        }
    }

    async fn generate_text(&self, prompt: &str) -> std::result::Result<ModelOutput<String>, ModelError> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        match self.next(prompt) {
            Some(Reply::Text(text)) => Ok(ModelOutput::new(text)),
            Some(Reply::Json(data, usage)) => Ok(ModelOutput {
                data: data.to_string(),
                usage,
            }),
            Some(Reply::Fail(error)) => Err(error),
            Some(Reply::Hang) => std::future::pending().await,
            None => Err(ModelError::Transport("no scripted reply".to_string())),
        }
    }
}

/// Keeps every saved document.
#[derive(Default)]
pub struct InMemorySpecStore {
    saved: Mutex<Vec<UiSpecDocument>>,
}

impl InMemorySpecStore {
    pub fn saved(&self) -> Vec<UiSpecDocument> {
        self.saved.lock().clone()
    }
}

#[async_trait]
impl SpecStore for InMemorySpecStore {
    async fn save(&self, document: &UiSpecDocument) -> std::result::Result<(), StoreError> {
        self.saved.lock().push(document.clone());
        Ok(())
    }
}

/// Rejects every save.
pub struct FailingSpecStore;

#[async_trait]
impl SpecStore for FailingSpecStore {
    async fn save(&self, _document: &UiSpecDocument) -> std::result::Result<(), StoreError> {
        Err(StoreError::Unavailable("database is down".to_string()))
    }
}

/// The smallest document the model may return: only the required fields.
pub fn minimal_document(session_id: &str, stage: Stage, components: &[&str]) -> JsonValue {
    json!({
        "sessionId": session_id,
        "stage": stage.as_str(),
        "widgets": components
            .iter()
            .map(|component| json!({ "component": component }))
            .collect::<Vec<_>>(),
    })
}

/// A document in which every optional field is already present.
pub fn complete_document() -> JsonValue {
    json!({
        "sessionId": "session-1",
        "stage": "diverge",
        "oodm": { "entities": ["idea"] },
        "dependencyGraph": { "nodes": ["w1"], "edges": [] },
        "widgets": [{
            "id": "w1",
            "component": "idea_cards",
            "position": 3,
            "layout": { "span": 2 },
            "config": { "maxCards": 12 },
            "inputs": [],
            "outputs": ["ideas"],
            "reactiveBindings": [],
            "metadata": {
                "timing": "early",
                "versatility": "high",
                "bottleneck": ["fixation"],
                "description": "Capture ideas"
            }
        }],
        "layout": { "type": "grid" },
        "metadata": { "version": 2 }
    })
}

pub fn request(stage: Stage) -> GenerationRequest {
    GenerationRequest::new("session-1", "I can't decide whether to move abroad.", stage)
}

pub fn generator_with(client: Arc<ScriptedModelClient>) -> SpecificationGenerator {
    SpecificationGenerator::builder(client)
        .build()
        .expect("default configuration is valid")
}
