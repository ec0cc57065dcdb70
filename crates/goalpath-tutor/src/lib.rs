//! GoalPath Tutor - chat channel to the AI tutor
//!
//! A [`TutorChannel`] keeps one WebSocket open to the tutor service for the
//! signed-in user, records the conversation, and reconnects after a fixed
//! delay whenever the connection drops.
//!
//! # Architecture
//!
//! ```text
//!   open/send/close         ┌──────────────┐   effects   ┌───────────────┐
//!  ───────────────────────▶ │ TutorSession │ ──────────▶ │  TutorChannel │
//!                           │ (sans-IO)    │ ◀────────── │  (tokio)      │
//!                           └──────────────┘   events    └───────┬───────┘
//!                                                                │
//!                                                       ┌────────▼────────┐
//!                                                       │ TutorTransport  │
//!                                                       │ (WebSocket)     │
//!                                                       └─────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use goalpath_tutor::{TutorChannel, TutorConfig};
//!
//! # async fn run() {
//! let channel = TutorChannel::websocket(TutorConfig::default());
//! let mut replies = channel.subscribe_messages();
//! channel.open("65a1f0c2");
//!
//! channel.send("How should I structure my first week?");
//! while let Ok(message) = replies.recv().await {
//!     println!("[{}] {}", message.origin, message.text);
//! }
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(rust_2018_idioms, missing_debug_implementations, clippy::all)]

pub mod channel;
pub mod config;
pub mod error;
pub mod message;
pub mod state;
pub mod transport;

pub use channel::TutorChannel;
pub use config::TutorConfig;
pub use error::{ChannelError, Result};
pub use message::{ChatMessage, MessageOrigin};
pub use state::{ChannelState, Effect, TutorSession};
pub use transport::{Connection, TutorTransport, WebSocketTransport};

/// Tutor crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
