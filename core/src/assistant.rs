//! Conversational assistant: a bounded tool-calling loop over a hosted
//! chat model.
//!
//! The model itself sits behind `ChatModel`. Each question runs:
//!   user turn → model → (tool calls → dispatcher → tool results → model)*
//! until the model answers in plain text. Tool rounds are capped at
//! `max_tool_turns`; a model that keeps asking for tools past the cap
//! fails the question with `ToolLoopExhausted`, and the transcript is
//! rolled back to where it stood before the question.

use crate::{
    dispatch::{tool_definitions, ToolDefinition, ToolDispatcher},
    error::{EquityError, EquityResult},
    types::Geoid,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::{Arc, OnceLock};
use uuid::Uuid;

pub const SYSTEM_PROMPT: &str = "\
You are a housing equity data assistant for Ingham County, Michigan.

You help users understand housing equity, gentrification risk, and foreclosure risk across Census Block Groups.

When users ask about areas, always include the 12-digit GEOID numbers in your response so they can be highlighted on the map.

For example:
- \"Block Group 260650001001 has an equity score of 45.2\"
- \"The top 5 areas by foreclosure risk are: 260650001002, 260650001003...\"

Important context:
- Equity Score (0-100): Higher = better housing equity
- Gentrification Risk (0-100): Higher = more at risk of displacement
- Foreclosure Risk (0-100): Higher = more at risk

You can answer questions about specific areas, compare areas, find top/bottom performers, run what-if simulations, and explain what drives the scores.

Stay focused on the housing equity data. Do not discuss unrelated topics.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id:        String,
    pub name:      String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ChatMessage {
    User {
        content: String,
    },
    Assistant {
        content:    String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    Tool {
        call_id:  String,
        name:     String,
        content:  Value,
        is_error: bool,
    },
}

/// What the model produced for one completion request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub text:       String,
    pub tool_calls: Vec<ToolCall>,
}

impl ModelReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), tool_calls: Vec::new() }
    }

    pub fn tool_call(name: &str, arguments: Value) -> Self {
        Self {
            text:       String::new(),
            tool_calls: vec![ToolCall {
                id: format!("call_{}", Uuid::new_v4().simple()),
                name: name.to_string(),
                arguments,
            }],
        }
    }
}

/// Seam to a hosted chat-completion API.
pub trait ChatModel {
    fn complete(
        &mut self,
        system: &str,
        transcript: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> anyhow::Result<ModelReply>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantAnswer {
    pub session_id:         Uuid,
    pub text:               String,
    /// GEOIDs quoted in the answer text, in first-seen order.
    pub highlighted_geoids: Vec<Geoid>,
    /// GEOIDs returned by the tools used to build the answer.
    pub referenced_geoids:  Vec<Geoid>,
    pub tool_rounds:        u32,
}

pub struct Assistant<M: ChatModel> {
    session_id:     Uuid,
    dispatcher:     Arc<ToolDispatcher>,
    model:          M,
    tools:          Vec<ToolDefinition>,
    transcript:     Vec<ChatMessage>,
    max_tool_turns: u32,
}

impl<M: ChatModel> Assistant<M> {
    pub fn new(dispatcher: Arc<ToolDispatcher>, model: M) -> Self {
        let max_tool_turns = dispatcher.config().max_tool_turns;
        Self {
            session_id: Uuid::new_v4(),
            dispatcher,
            model,
            tools: tool_definitions(),
            transcript: Vec::new(),
            max_tool_turns,
        }
    }

    pub fn with_max_tool_turns(mut self, max_tool_turns: u32) -> Self {
        self.max_tool_turns = max_tool_turns;
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Answer one user question, running tools as the model requests.
    ///
    /// On failure the transcript is restored to its state before the
    /// question, so no tool call is ever left without a result.
    pub fn ask(&mut self, question: &str) -> EquityResult<AssistantAnswer> {
        let checkpoint = self.transcript.len();
        let answer = self.converse(question);
        if answer.is_err() {
            self.transcript.truncate(checkpoint);
        }
        answer
    }

    fn converse(&mut self, question: &str) -> EquityResult<AssistantAnswer> {
        self.transcript.push(ChatMessage::User { content: question.to_string() });

        let mut rounds = 0u32;
        let mut referenced: Vec<Geoid> = Vec::new();
        loop {
            let reply = self
                .model
                .complete(SYSTEM_PROMPT, &self.transcript, &self.tools)
                .map_err(|e| EquityError::Model(e.to_string()))?;

            self.transcript.push(ChatMessage::Assistant {
                content:    reply.text.clone(),
                tool_calls: reply.tool_calls.clone(),
            });

            if reply.tool_calls.is_empty() {
                log::debug!("session={} answered after {rounds} tool round(s)", self.session_id);
                return Ok(AssistantAnswer {
                    session_id:         self.session_id,
                    highlighted_geoids: extract_geoids(&reply.text),
                    referenced_geoids:  referenced,
                    text:               reply.text,
                    tool_rounds:        rounds,
                });
            }

            if rounds == self.max_tool_turns {
                log::warn!(
                    "session={} tool loop hit the {}-round limit",
                    self.session_id,
                    self.max_tool_turns
                );
                return Err(EquityError::ToolLoopExhausted { max_turns: self.max_tool_turns });
            }
            rounds += 1;

            for call in reply.tool_calls {
                let message = self.run_tool(&call, &mut referenced);
                self.transcript.push(message);
            }
        }
    }

    /// Execute one tool call. Failures become error payloads for the model.
    fn run_tool(&self, call: &ToolCall, referenced: &mut Vec<Geoid>) -> ChatMessage {
        let (content, is_error) = match self.dispatcher.dispatch(&call.name, &call.arguments) {
            Ok(outcome) => {
                if let Some(result) = outcome.result() {
                    push_unique(referenced, result.geoids());
                }
                match serde_json::to_value(&outcome) {
                    Ok(v) => (v, false),
                    Err(e) => (json!({ "error": e.to_string() }), true),
                }
            }
            Err(e) => (json!({ "error": e.to_string() }), true),
        };

        ChatMessage::Tool {
            call_id: call.id.clone(),
            name: call.name.clone(),
            content,
            is_error,
        }
    }
}

fn push_unique(into: &mut Vec<Geoid>, geoids: Vec<Geoid>) {
    for geoid in geoids {
        if !into.contains(&geoid) {
            into.push(geoid);
        }
    }
}

fn geoid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b[0-9]{12}\b").expect("GEOID pattern compiles"))
}

/// Every standalone 12-digit number in `text`, de-duplicated in
/// first-seen order.
pub fn extract_geoids(text: &str) -> Vec<Geoid> {
    let mut found = Vec::new();
    push_unique(
        &mut found,
        geoid_pattern().find_iter(text).map(|m| m.as_str().to_string()).collect(),
    );
    found
}
