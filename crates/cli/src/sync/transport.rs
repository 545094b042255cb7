// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for the real-time push channel.
//!
//! Provides a trait-based transport layer that enables:
//! - Real WebSocket connections for production
//! - Mock transports for unit testing
//!
//! A [`Connector`] opens authenticated connections; each successful attempt
//! yields a fresh [`Transport`]. Transports take `&self` so the session task
//! can wait on `recv` while group joins and invocations `send` concurrently.

use std::future::Future;
use std::pin::Pin;

use futures_util::stream::{SplitSink, SplitStream};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{header, HeaderValue, StatusCode};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use fls_core::protocol::{ClientMessage, ServerMessage};

/// Boxed future returned by transport and executor traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The server refused the credential.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Connection closed unexpectedly.
    #[error("connection closed")]
    ConnectionClosed,

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    SerializationError(String),
}

impl TransportError {
    /// Returns true if retrying with the same credential cannot succeed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TransportError::Unauthorized(_))
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// An established push connection.
pub trait Transport: Send + Sync + 'static {
    /// Send a message to the server.
    fn send(&self, msg: ClientMessage) -> BoxFuture<'_, TransportResult<()>>;

    /// Receive the next message from the server.
    ///
    /// Returns `None` if the connection is closed.
    fn recv(&self) -> BoxFuture<'_, TransportResult<Option<ServerMessage>>>;

    /// Close the connection.
    fn close(&self) -> BoxFuture<'_, TransportResult<()>>;
}

/// Opens push connections.
pub trait Connector: Send + Sync + 'static {
    type Transport: Transport;

    /// Connect to `url`, presenting `token` as a bearer credential.
    fn connect<'a>(
        &'a self,
        url: &'a str,
        token: &'a str,
    ) -> BoxFuture<'a, TransportResult<Self::Transport>>;
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket connector using tokio-tungstenite.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

/// WebSocket transport implementation using tokio-tungstenite.
pub struct WebSocketTransport {
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
}

impl Connector for WebSocketConnector {
    type Transport = WebSocketTransport;

    fn connect<'a>(
        &'a self,
        url: &'a str,
        token: &'a str,
    ) -> BoxFuture<'a, TransportResult<WebSocketTransport>> {
        Box::pin(async move {
            use futures_util::StreamExt;
            use tokio_tungstenite::tungstenite::Error as WsError;

            let mut request = url
                .into_client_request()
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
            let bearer = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
            request.headers_mut().insert(header::AUTHORIZATION, bearer);

            let (ws_stream, _) = match tokio_tungstenite::connect_async(request).await {
                Ok(conn) => conn,
                Err(WsError::Http(response))
                    if matches!(
                        response.status(),
                        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
                    ) =>
                {
                    return Err(TransportError::Unauthorized(format!(
                        "server answered {}",
                        response.status()
                    )));
                }
                Err(e) => return Err(TransportError::ConnectionFailed(e.to_string())),
            };

            let (sink, stream) = ws_stream.split();
            Ok(WebSocketTransport {
                sink: Mutex::new(sink),
                stream: Mutex::new(stream),
            })
        })
    }
}

impl Transport for WebSocketTransport {
    fn send(&self, msg: ClientMessage) -> BoxFuture<'_, TransportResult<()>> {
        Box::pin(async move {
            use futures_util::SinkExt;

            let json = msg
                .to_json()
                .map_err(|e| TransportError::SerializationError(e.to_string()))?;

            let mut sink = self.sink.lock().await;
            sink.send(Message::Text(json.into()))
                .await
                .map_err(|e| TransportError::SendFailed(e.to_string()))?;

            // Flush to ensure the data is actually sent and we detect connection failures
            sink.flush()
                .await
                .map_err(|e| TransportError::SendFailed(e.to_string()))
        })
    }

    fn recv(&self) -> BoxFuture<'_, TransportResult<Option<ServerMessage>>> {
        Box::pin(async move {
            use futures_util::StreamExt;

            let mut stream = self.stream.lock().await;

            loop {
                match stream.next().await {
                    // An undecodable frame is reported on its own; the stream stays usable
                    Some(Ok(Message::Text(text))) => {
                        return ServerMessage::from_json(&text)
                            .map(Some)
                            .map_err(|e| TransportError::SerializationError(e.to_string()));
                    }
                    Some(Ok(Message::Close(_))) | None => return Ok(None),
                    // Ping/pong and binary frames carry nothing for us
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Err(TransportError::ReceiveFailed(e.to_string())),
                }
            }
        })
    }

    fn close(&self) -> BoxFuture<'_, TransportResult<()>> {
        Box::pin(async move {
            use futures_util::SinkExt;

            self.sink
                .lock()
                .await
                .close()
                .await
                .map_err(|e| TransportError::SendFailed(e.to_string()))
        })
    }
}
