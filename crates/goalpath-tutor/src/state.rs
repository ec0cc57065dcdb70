//! Tutor session state machine
//!
//! ```text
//! Idle ──open──▶ Connecting ──ok──▶ Connected
//!                  ▲   │                │
//!            timer │   └──fail──┐       │ drop / send failure
//!                  │            ▼       ▼
//!                  └──────── Disconnected
//!
//! any state ──close──▶ Closed (terminal)
//! ```
//!
//! The machine performs no IO. Each input returns the [`Effect`]s the driver
//! must carry out. Every connection attempt gets a new generation number, and
//! transport events tagged with an older generation are ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::message::{
    ChatMessage, InboundFrame, MessageOrigin, OutboundFrame, DISCONNECT_TEXT, WELCOME_TEXT,
};

/// Connection state visible to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelState {
    #[default]
    Idle,
    Connecting,
    Connected,
    Disconnected,
    Closed,
}

impl std::fmt::Display for ChannelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ChannelState::Idle => "idle",
            ChannelState::Connecting => "connecting",
            ChannelState::Connected => "connected",
            ChannelState::Disconnected => "disconnected",
            ChannelState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Work requested from the driver
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// A message was appended to the history
    Append(ChatMessage),
    StateChanged(ChannelState),
    /// Open a socket for `user_id`, tagged with `generation`
    Connect { generation: u64, user_id: String },
    /// Write a serialized frame on the connection of `generation`
    Transmit { generation: u64, payload: String },
    /// Replace the reconnect timer with one firing after `delay`
    ScheduleReconnect { generation: u64, delay: Duration },
    /// Disarm the reconnect timer, keeping any live connection
    CancelReconnect,
    /// Drop the connection and cancel any pending timer
    Release,
}

/// Sans-IO tutor session
#[derive(Debug)]
pub struct TutorSession {
    state: ChannelState,
    user_id: Option<String>,
    generation: u64,
    history: Vec<ChatMessage>,
    reconnect_delay: Duration,
}

impl TutorSession {
    pub fn new(reconnect_delay: Duration) -> Self {
        Self {
            state: ChannelState::Idle,
            user_id: None,
            generation: 0,
            history: Vec::new(),
            reconnect_delay,
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Start connecting as `user_id`. Ignored without an identity, after
    /// close, and while a connection is already open or opening.
    pub fn open(&mut self, user_id: &str) -> Vec<Effect> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            tracing::warn!("No user id available, tutor channel not opened");
            return Vec::new();
        }
        match self.state {
            ChannelState::Closed => {
                tracing::debug!("Tutor channel is closed, ignoring open");
                Vec::new()
            }
            ChannelState::Connecting | ChannelState::Connected => {
                tracing::debug!("Tutor channel already {}", self.state);
                Vec::new()
            }
            ChannelState::Idle | ChannelState::Disconnected => {
                self.user_id = Some(user_id.to_string());
                self.begin_attempt()
            }
        }
    }

    /// Handshake of `generation` completed
    pub fn connected(&mut self, generation: u64, now: DateTime<Utc>) -> Vec<Effect> {
        if !self.is_current(generation) || self.state != ChannelState::Connecting {
            return Vec::new();
        }
        tracing::info!("Connected to AI tutor (attempt {})", generation);
        let welcome = self.append(MessageOrigin::System, WELCOME_TEXT, now);
        vec![
            self.transition(ChannelState::Connected),
            Effect::Append(welcome),
        ]
    }

    /// Handshake failed, the socket dropped, or a frame could not be written
    pub fn disconnected(&mut self, generation: u64, now: DateTime<Utc>) -> Vec<Effect> {
        if !self.is_current(generation)
            || !matches!(
                self.state,
                ChannelState::Connecting | ChannelState::Connected
            )
        {
            return Vec::new();
        }
        let notice = self.append(MessageOrigin::System, DISCONNECT_TEXT, now);
        let mut effects = vec![
            self.transition(ChannelState::Disconnected),
            Effect::Append(notice),
        ];
        if self.user_id.is_some() {
            tracing::info!(
                "Disconnected from AI tutor, retrying in {:?}",
                self.reconnect_delay
            );
            effects.push(Effect::ScheduleReconnect {
                generation,
                delay: self.reconnect_delay,
            });
        } else {
            tracing::info!("Disconnected from AI tutor, no identity to reconnect with");
        }
        effects
    }

    /// The reconnect timer scheduled for `generation` fired
    pub fn reconnect_due(&mut self, generation: u64) -> Vec<Effect> {
        if !self.is_current(generation) || self.state != ChannelState::Disconnected {
            return Vec::new();
        }
        self.begin_attempt()
    }

    /// Append and transmit a user message. Only valid while connected and
    /// for text that is not blank.
    pub fn send(&mut self, text: &str, now: DateTime<Utc>) -> Vec<Effect> {
        if self.state != ChannelState::Connected {
            tracing::debug!("Tutor channel {}, message not sent", self.state);
            return Vec::new();
        }
        if text.trim().is_empty() {
            return Vec::new();
        }

        let message = self.append(MessageOrigin::User, text, now);
        let frame = OutboundFrame::user_message(text, message.timestamp);
        let mut effects = vec![Effect::Append(message)];
        match serde_json::to_string(&frame) {
            Ok(payload) => effects.push(Effect::Transmit {
                generation: self.generation,
                payload,
            }),
            Err(e) => tracing::error!("Failed to encode tutor frame: {}", e),
        }
        effects
    }

    /// A text frame arrived on the connection of `generation`
    pub fn received(&mut self, generation: u64, text: &str, now: DateTime<Utc>) -> Vec<Effect> {
        if !self.is_current(generation) || self.state != ChannelState::Connected {
            return Vec::new();
        }
        let Some(frame) = InboundFrame::parse(text) else {
            return Vec::new();
        };
        let timestamp = frame.timestamp().unwrap_or(now);
        let reply = self.append(MessageOrigin::Assistant, frame.message, timestamp);
        vec![Effect::Append(reply)]
    }

    /// The user's identity is gone (logout or expired session). The live
    /// connection, if any, is kept, but no further attempt is made once it
    /// drops. A later [`open`](Self::open) supplies a new identity.
    pub fn forget_identity(&mut self) -> Vec<Effect> {
        if self.user_id.take().is_none() || self.state == ChannelState::Closed {
            return Vec::new();
        }
        tracing::info!("Tutor identity cleared, automatic reconnects stopped");
        if self.state == ChannelState::Disconnected {
            vec![Effect::CancelReconnect]
        } else {
            Vec::new()
        }
    }

    /// Permanently close the session
    pub fn close(&mut self) -> Vec<Effect> {
        if self.state == ChannelState::Closed {
            return Vec::new();
        }
        tracing::info!("Tutor channel closed");
        vec![self.transition(ChannelState::Closed), Effect::Release]
    }

    fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    fn begin_attempt(&mut self) -> Vec<Effect> {
        let Some(user_id) = self.user_id.clone() else {
            return Vec::new();
        };
        self.generation += 1;
        tracing::debug!("Connecting to AI tutor as {} (attempt {})", user_id, self.generation);
        vec![
            self.transition(ChannelState::Connecting),
            Effect::Connect {
                generation: self.generation,
                user_id,
            },
        ]
    }

    fn transition(&mut self, state: ChannelState) -> Effect {
        self.state = state;
        Effect::StateChanged(state)
    }

    /// Append with the timestamp clamped to keep history non-decreasing
    fn append(
        &mut self,
        origin: MessageOrigin,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> ChatMessage {
        let timestamp = match self.history.last() {
            Some(last) if last.timestamp > timestamp => last.timestamp,
            _ => timestamp,
        };
        let message = ChatMessage::new(origin, text, timestamp);
        self.history.push(message.clone());
        message
    }
}
