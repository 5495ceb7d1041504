//! WebSocket Connection Handler
//!
//! Upgrades an inbound request, wires the session into the hub, and runs
//! the two pumps until the connection goes away.

use axum::{
    extract::{ws::WebSocket, State, WebSocketUpgrade},
    response::Response,
};
use futures::StreamExt;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::connection::{WsFrameSink, WsFrameStream};
use super::hub::SessionHandle;
use super::session::{read_pump, write_pump};
use crate::presentation::http::extractors::Identity;
use crate::startup::AppState;

/// WebSocket upgrade handler.
///
/// Identity arrives already authenticated; this handler never sees
/// credentials.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    identity: Identity,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, identity, state))
}

/// Run one connected session to completion.
async fn handle_socket(socket: WebSocket, identity: Identity, state: AppState) {
    let session_id = Uuid::new_v4();
    let (sink, stream) = socket.split();

    // The hub holds the only long-lived sender; dropping it on unregister
    // or eviction is what ends the writer below.
    let (outbound_tx, outbound_rx) = mpsc::channel(state.settings.board.outbound_queue_capacity);

    state.hub.register(SessionHandle::new(
        session_id,
        identity.user_id,
        identity.username.clone(),
        outbound_tx,
    ));

    tracing::debug!(
        %session_id,
        user_id = identity.user_id,
        "WebSocket session started"
    );

    let writer = tokio::spawn(write_pump(outbound_rx, WsFrameSink::new(sink)));

    read_pump(
        session_id,
        identity.user_id,
        state.hub.clone(),
        state.messages.clone(),
        WsFrameStream::new(stream),
    )
    .await;

    // The reader has unregistered the session; once the hub drops the
    // sender the writer drains, sends its close frame, and exits.
    let _ = writer.await;

    tracing::info!(
        %session_id,
        user_id = identity.user_id,
        "client disconnected"
    );
}
