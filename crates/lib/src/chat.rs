//! Chat session: transcript and the submit/response state machine.
//!
//! The session owns the in-memory transcript (append-only; insertion order is
//! display order) and guards the request cycle: one turn in flight at a time,
//! blank input ignored, late or cancelled responses discarded. Nothing here is
//! persisted; the transcript lives and dies with the session.

use crate::relay::protocol::ChatEnvelope;
use crate::reply;
use chrono::{DateTime, Utc};

/// Fallback shown when a success envelope carries no usable reply text.
pub const NO_REPLY_FALLBACK: &str = "I could not process your request. Please try again.";

/// Apology shown when the request itself failed.
pub const ERROR_APOLOGY: &str = "Sorry, I encountered an error. Please try again.";

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Bot,
}

/// A single transcript entry. Immutable once created.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Where the conversation is in its request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPhase {
    /// No messages yet; welcome and suggestions are shown.
    Empty,
    /// The user is typing their next message.
    Composing,
    /// One request in flight; further submissions are ignored.
    Sending,
    /// At least one exchange done, ready for the next input.
    Idle,
}

/// Token for an in-flight turn. Resolving a turn that is no longer pending
/// (superseded or cancelled) is a harmless no-op.
#[derive(Debug, Clone)]
pub struct Turn {
    id: u64,
    /// The submitted text, as sent to the relay.
    pub message: String,
}

/// One conversation: transcript, phase, and the pending-turn guard.
pub struct ChatSession {
    id: String,
    transcript: Vec<ChatMessage>,
    suggestions: Vec<String>,
    phase: ChatPhase,
    pending: Option<u64>,
    next_turn: u64,
    next_message: u64,
}

impl ChatSession {
    pub fn new(suggestions: Vec<String>) -> Self {
        Self {
            id: format!("chat-{}", uuid::Uuid::new_v4()),
            transcript: Vec::new(),
            suggestions,
            phase: ChatPhase::Empty,
            pending: None,
            next_turn: 0,
            next_message: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn phase(&self) -> ChatPhase {
        self.phase
    }

    /// Messages in display order.
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Suggested prompts; offered only before the first message.
    pub fn suggestions(&self) -> &[String] {
        match self.phase {
            ChatPhase::Empty => &self.suggestions,
            _ => &[],
        }
    }

    /// The user started typing. No-op while a request is in flight.
    pub fn compose(&mut self) {
        if matches!(self.phase, ChatPhase::Empty | ChatPhase::Idle) {
            self.phase = ChatPhase::Composing;
        }
    }

    /// Submit user input. Blank input and submissions while a request is in
    /// flight are ignored. An accepted submission appends the user message
    /// immediately and returns the token for the new in-flight turn.
    pub fn submit(&mut self, text: &str) -> Option<Turn> {
        if self.phase == ChatPhase::Sending || text.trim().is_empty() {
            return None;
        }
        let message = text.to_string();
        self.append(ChatRole::User, message.clone());
        self.phase = ChatPhase::Sending;
        self.next_turn += 1;
        self.pending = Some(self.next_turn);
        Some(Turn {
            id: self.next_turn,
            message,
        })
    }

    /// Submit the suggestion at `index`; equivalent to typing it.
    pub fn submit_suggestion(&mut self, index: usize) -> Option<Turn> {
        let text = self.suggestions().get(index)?.clone();
        self.submit(&text)
    }

    /// A success envelope for `turn` arrived: append the derived bot message
    /// and reopen input. Returns the appended message, or None when the turn
    /// was stale and the envelope was discarded.
    pub fn reply_received(&mut self, turn: &Turn, envelope: &ChatEnvelope) -> Option<&ChatMessage> {
        if !self.finish_turn(turn) {
            return None;
        }
        let content = match envelope.message.as_deref() {
            Some(text) => reply::derive_display_text(text),
            None => NO_REPLY_FALLBACK.to_string(),
        };
        self.append(ChatRole::Bot, content);
        self.transcript.last()
    }

    /// The request for `turn` failed. The failure's nature is not surfaced:
    /// the transcript gets the fixed apology and input reopens.
    pub fn reply_failed(&mut self, turn: &Turn) -> Option<&ChatMessage> {
        if !self.finish_turn(turn) {
            return None;
        }
        self.append(ChatRole::Bot, ERROR_APOLOGY.to_string());
        self.transcript.last()
    }

    /// Forget the in-flight turn (e.g. the session is going away). A response
    /// arriving later is discarded without touching the transcript.
    pub fn cancel_pending(&mut self) {
        self.pending = None;
        if self.phase == ChatPhase::Sending {
            self.phase = ChatPhase::Idle;
        }
    }

    fn finish_turn(&mut self, turn: &Turn) -> bool {
        if self.pending != Some(turn.id) {
            return false;
        }
        self.pending = None;
        self.phase = ChatPhase::Idle;
        true
    }

    fn append(&mut self, role: ChatRole, content: String) {
        self.next_message += 1;
        self.transcript.push(ChatMessage {
            id: format!("msg-{}", self.next_message),
            role,
            content,
            created_at: Utc::now(),
        });
    }
}
