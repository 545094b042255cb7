// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket hub implementation.
//!
//! Authenticates the upgrade request, then routes group membership and
//! invocations for each connection. Invocations come back out as events
//! fanned out to the target group.

use std::collections::HashSet;
use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast::error::RecvError;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::{header::AUTHORIZATION, StatusCode};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use fls_core::protocol::{ClientMessage, ServerMessage};

use crate::state::{Envelope, HubState};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Run the hub on the given address.
pub async fn run(addr: SocketAddr, state: HubState) -> Result<(), BoxError> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on: {}", addr);
    serve(listener, state).await
}

/// Accept connections from an already bound listener until it fails.
pub async fn serve(listener: TcpListener, state: HubState) -> Result<(), BoxError> {
    loop {
        let (stream, peer_addr) = listener.accept().await?;
        let state = state.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }
}

/// Handle a single WebSocket connection.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: HubState,
) -> Result<(), BoxError> {
    let gate = state.clone();
    let check = move |request: &Request, response: Response| {
        let header = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        if gate.authorize(header) {
            Ok(response)
        } else {
            Err(unauthorized())
        }
    };
    let ws_stream = match tokio_tungstenite::accept_hdr_async(stream, check).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("Rejected handshake from {}: {}", peer_addr, e);
            return Ok(());
        }
    };
    info!("New WebSocket connection from: {}", peer_addr);

    let (mut ws_sink, mut ws_stream) = ws_stream.split();
    let mut broadcast_rx = state.subscribe();
    let mut groups = HashSet::new();

    loop {
        tokio::select! {
            msg = ws_stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = match ClientMessage::from_json(&text) {
                            Ok(msg) => handle_client_message(msg, &state, &mut groups),
                            Err(e) => Some(ServerMessage::error(format!("invalid message: {}", e))),
                        };
                        if let Some(reply) = reply {
                            ws_sink.send(Message::Text(reply.to_json()?.into())).await?;
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("Client {} disconnected", peer_addr);
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        ws_sink.send(Message::Pong(data)).await?;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!("WebSocket error from {}: {}", peer_addr, e);
                        break;
                    }
                    None => {
                        info!("Client {} stream ended", peer_addr);
                        break;
                    }
                }
            }

            broadcast = broadcast_rx.recv() => {
                match broadcast {
                    Ok(envelope) => {
                        if !delivers_to(&envelope, &groups) {
                            continue;
                        }
                        let json = envelope.message.to_json()?;
                        if let Err(e) = ws_sink.send(Message::Text(json.into())).await {
                            warn!("Failed to send event to {}: {}", peer_addr, e);
                            break;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        warn!("Client {} lagged by {} messages", peer_addr, n);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    info!("Connection closed: {}", peer_addr);
    Ok(())
}

fn unauthorized() -> ErrorResponse {
    let mut response = ErrorResponse::new(Some("unauthorized".to_string()));
    *response.status_mut() = StatusCode::UNAUTHORIZED;
    response
}

/// Whether a connection in `groups` should receive `envelope`.
pub(crate) fn delivers_to(envelope: &Envelope, groups: &HashSet<String>) -> bool {
    match &envelope.group {
        Some(group) => groups.contains(group),
        None => true,
    }
}

/// Process a client message and return an optional direct reply.
///
/// `Invoke` is re-published as an event named after the method. The
/// target group is read from `args.group`; without one it goes to every
/// connection.
pub(crate) fn handle_client_message(
    msg: ClientMessage,
    state: &HubState,
    groups: &mut HashSet<String>,
) -> Option<ServerMessage> {
    debug!("Received message: {:?}", msg);

    match msg {
        ClientMessage::JoinGroup { group } => {
            debug!("Joined group {}", group);
            groups.insert(group);
            None
        }

        ClientMessage::LeaveGroup { group } => {
            debug!("Left group {}", group);
            groups.remove(&group);
            None
        }

        ClientMessage::Invoke { method, args } => {
            if method.is_empty() {
                return Some(ServerMessage::error("invoke requires a method name"));
            }
            let group = args
                .get("group")
                .and_then(|g| g.as_str())
                .map(str::to_string);
            let receivers = state.publish(group, ServerMessage::event(method, args));
            debug!("Published to {} connections", receivers);
            None
        }

        ClientMessage::Ping { id } => Some(ServerMessage::pong(id)),
    }
}
