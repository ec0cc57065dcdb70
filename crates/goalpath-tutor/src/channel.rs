//! Tutor channel driver
//!
//! Runs the [`TutorSession`] state machine on tokio: one task per connection
//! attempt (handshake, reader and writer), plus a single reconnect timer slot.
//! Session locks are never held across an `.await`.

use chrono::Utc;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::TutorConfig;
use crate::error::{ChannelError, Result};
use crate::message::ChatMessage;
use crate::state::{ChannelState, Effect, TutorSession};
use crate::transport::{Connection, TutorTransport, WebSocketTransport};

/// Capacity of the appended-message broadcast
const MESSAGE_BUFFER: usize = 256;

/// Persistent, auto-reconnecting chat session with the AI tutor.
///
/// Dropping the channel closes it.
#[derive(Debug)]
pub struct TutorChannel {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    config: TutorConfig,
    transport: Arc<dyn TutorTransport>,
    session: Mutex<TutorSession>,
    state_tx: watch::Sender<ChannelState>,
    messages_tx: broadcast::Sender<ChatMessage>,
    /// Frame queue of the live connection, tagged with its generation
    outbound: Mutex<Option<(u64, mpsc::UnboundedSender<String>)>>,
    connection: Mutex<Option<JoinHandle<()>>>,
    reconnect: Mutex<Option<JoinHandle<()>>>,
    pending_timers: Arc<AtomicUsize>,
}

impl TutorChannel {
    pub fn new(config: TutorConfig, transport: Arc<dyn TutorTransport>) -> Self {
        let (state_tx, _) = watch::channel(ChannelState::Idle);
        let (messages_tx, _) = broadcast::channel(MESSAGE_BUFFER);
        let session = TutorSession::new(config.reconnect_delay());
        Self {
            inner: Arc::new(Inner {
                config,
                transport,
                session: Mutex::new(session),
                state_tx,
                messages_tx,
                outbound: Mutex::new(None),
                connection: Mutex::new(None),
                reconnect: Mutex::new(None),
                pending_timers: Arc::new(AtomicUsize::new(0)),
            }),
        }
    }

    /// Channel over the real WebSocket transport
    pub fn websocket(config: TutorConfig) -> Self {
        Self::new(config, Arc::new(WebSocketTransport))
    }

    /// Start connecting as `user_id`; a blank id is logged and ignored.
    /// Must be called from within a tokio runtime.
    pub fn open(&self, user_id: &str) {
        self.inner.apply(|session| session.open(user_id));
    }

    /// Send a user message. Returns whether it was appended to the history.
    pub fn send(&self, text: &str) -> bool {
        let effects = {
            let mut session = self.inner.session.lock();
            session.send(text, Utc::now())
        };
        let appended = effects.iter().any(|e| matches!(e, Effect::Append(_)));
        self.inner.run(effects);
        appended
    }

    /// Stop reconnecting on behalf of the current user, e.g. after the
    /// session expired. An open connection stays up until it drops.
    pub fn forget_identity(&self) {
        self.inner.apply(|session| session.forget_identity());
    }

    /// Close permanently, dropping the connection and any pending reconnect
    pub fn close(&self) {
        self.inner.apply(|session| session.close());
    }

    pub fn state(&self) -> ChannelState {
        self.inner.session.lock().state()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ChannelState::Connected
    }

    /// Snapshot of the chat history in append order
    pub fn history(&self) -> Vec<ChatMessage> {
        self.inner.session.lock().history().to_vec()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ChannelState> {
        self.inner.state_tx.subscribe()
    }

    /// Receive every message appended from now on
    pub fn subscribe_messages(&self) -> broadcast::Receiver<ChatMessage> {
        self.inner.messages_tx.subscribe()
    }

    /// Number of reconnect timers currently armed (0 or 1)
    pub fn pending_reconnects(&self) -> usize {
        self.inner.pending_timers.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &TutorConfig {
        &self.inner.config
    }
}

impl Drop for TutorChannel {
    fn drop(&mut self) {
        self.close();
    }
}

impl Inner {
    /// Feed one input to the session and carry out the resulting effects
    fn apply(self: &Arc<Self>, input: impl FnOnce(&mut TutorSession) -> Vec<Effect>) {
        let effects = input(&mut self.session.lock());
        self.run(effects);
    }

    fn run(self: &Arc<Self>, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Append(message) => {
                    // No subscribers is fine; history keeps the message
                    let _ = self.messages_tx.send(message);
                }
                Effect::StateChanged(state) => {
                    self.state_tx.send_replace(state);
                }
                Effect::Connect {
                    generation,
                    user_id,
                } => self.spawn_connection(generation, user_id),
                Effect::Transmit {
                    generation,
                    payload,
                } => self.transmit(generation, payload),
                Effect::ScheduleReconnect { generation, delay } => {
                    self.schedule_reconnect(generation, delay)
                }
                Effect::CancelReconnect => self.cancel_reconnect(),
                Effect::Release => self.release(),
            }
        }
    }

    fn transmit(self: &Arc<Self>, generation: u64, payload: String) {
        let delivered = match self.outbound.lock().as_ref() {
            Some((current, tx)) if *current == generation => tx.send(payload).is_ok(),
            _ => false,
        };
        if !delivered {
            tracing::warn!("Tutor connection unavailable, frame not sent");
            self.apply(|session| session.disconnected(generation, Utc::now()));
        }
    }

    fn spawn_connection(self: &Arc<Self>, generation: u64, user_id: String) {
        let inner = Arc::clone(self);
        let handle = tokio::spawn(async move {
            if let Err(e) = inner.run_connection(generation, &user_id).await {
                tracing::warn!("Tutor connection failed: {}", e);
            }
            inner.apply(|session| session.disconnected(generation, Utc::now()));
        });
        if let Some(previous) = self.connection.lock().replace(handle) {
            previous.abort();
        }
    }

    /// Connect, then pump frames both ways until either side ends
    async fn run_connection(self: &Arc<Self>, generation: u64, user_id: &str) -> Result<()> {
        let url = self.config.endpoint_for(user_id)?;
        let Connection {
            mut sink,
            mut stream,
        } = self.transport.connect(&url).await?;

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let effects = {
            let mut session = self.session.lock();
            let current = session.generation() == generation
                && session.state() == ChannelState::Connecting;
            if current {
                *self.outbound.lock() = Some((generation, tx));
                Some(session.connected(generation, Utc::now()))
            } else {
                None
            }
        };
        let Some(effects) = effects else {
            tracing::debug!("Dropping stale tutor connection (attempt {})", generation);
            return Ok(());
        };
        self.run(effects);

        let writer = async {
            while let Some(frame) = rx.recv().await {
                sink.send(frame).await?;
            }
            Ok::<_, ChannelError>(())
        };

        let reader = async {
            while let Some(frame) = stream.next().await {
                let text = frame?;
                self.apply(|session| session.received(generation, &text, Utc::now()));
            }
            Ok::<_, ChannelError>(())
        };

        let result = tokio::select! {
            r = writer => r,
            r = reader => r,
        };

        let _ = sink.close().await;
        self.clear_outbound(generation);
        tracing::debug!("Tutor connection {} ended", generation);
        result
    }

    fn clear_outbound(&self, generation: u64) {
        let mut outbound = self.outbound.lock();
        if matches!(outbound.as_ref(), Some((current, _)) if *current == generation) {
            *outbound = None;
        }
    }

    fn schedule_reconnect(self: &Arc<Self>, generation: u64, delay: Duration) {
        let inner = Arc::clone(self);
        let guard = TimerGuard::arm(Arc::clone(&self.pending_timers));
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            drop(guard);
            inner.apply(|session| session.reconnect_due(generation));
        });
        if let Some(previous) = self.reconnect.lock().replace(handle) {
            previous.abort();
        }
    }

    fn cancel_reconnect(&self) {
        if let Some(timer) = self.reconnect.lock().take() {
            timer.abort();
        }
    }

    fn release(&self) {
        self.outbound.lock().take();
        if let Some(connection) = self.connection.lock().take() {
            connection.abort();
        }
        self.cancel_reconnect();
    }
}

/// Counts an armed reconnect timer until it fires or its task is dropped
#[derive(Debug)]
struct TimerGuard(Arc<AtomicUsize>);

impl TimerGuard {
    fn arm(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
