//! Socket transport behind the tutor channel
//!
//! A [`TutorTransport`] opens a [`Connection`]: a sink of outgoing text frames
//! and a stream of incoming ones. [`WebSocketTransport`] is the production
//! implementation over `tokio-tungstenite`.

use async_trait::async_trait;
use futures::{future, Sink, SinkExt, Stream, StreamExt};
use std::pin::Pin;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use crate::error::{ChannelError, Result};

/// Outgoing text frames
pub type FrameSink = Pin<Box<dyn Sink<String, Error = ChannelError> + Send>>;

/// Incoming text frames; the stream ends when the peer closes
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// An open tutor connection
pub struct Connection {
    pub sink: FrameSink,
    pub stream: FrameStream,
}

impl Connection {
    pub fn new(sink: FrameSink, stream: FrameStream) -> Self {
        Self { sink, stream }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}

/// Opens connections to the tutor service
#[async_trait]
pub trait TutorTransport: Send + Sync + std::fmt::Debug {
    async fn connect(&self, url: &Url) -> Result<Connection>;
}

/// WebSocket transport
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketTransport;

#[async_trait]
impl TutorTransport for WebSocketTransport {
    async fn connect(&self, url: &Url) -> Result<Connection> {
        tracing::debug!("Opening WebSocket {}", url);
        let (ws_stream, _) = tokio_tungstenite::connect_async(url.as_str()).await?;
        let (ws_sink, ws_stream) = ws_stream.split();

        let sink = ws_sink.with(|text: String| future::ready(Ok::<_, ChannelError>(Message::Text(text))));

        let stream = ws_stream.filter_map(|msg| {
            future::ready(match msg {
                Ok(Message::Text(text)) => Some(Ok(text)),
                Ok(Message::Binary(data)) => {
                    tracing::debug!("Ignoring binary frame: {} bytes", data.len());
                    None
                }
                // Pings are answered by tungstenite; Close ends the stream
                Ok(_) => None,
                Err(e) => Some(Err(ChannelError::from(e))),
            })
        });

        Ok(Connection::new(Box::pin(sink), Box::pin(stream)))
    }
}
