//! WebSocket upgrade handler and connection loop.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{info, warn};

use litquest_realtime::connection::authenticator::AuthenticatedConnection;
use litquest_realtime::message::events::{ClientEvent, ServerEvent};
use litquest_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for the WebSocket upgrade.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// JWT access token. Carried as a query parameter because browsers
    /// cannot set headers on WebSocket upgrades.
    pub token: String,
}

/// GET /ws?token={jwt}
pub async fn ws_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    // Authenticate before upgrading; a bad token never gets a socket.
    let auth = state
        .engine
        .authenticator()
        .authenticate(&query.token)
        .map_err(ApiError)?;

    Ok(ws.on_upgrade(move |socket| handle_connection(state, auth, socket)))
}

/// Drives one established WebSocket connection to completion.
async fn handle_connection(state: AppState, auth: AuthenticatedConnection, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (handle, mut outbound_rx) = state.engine.manager().register(auth.user_id, auth.role);
    let conn_id = handle.id;

    info!(
        conn_id = %conn_id,
        user_id = %auth.user_id,
        "WebSocket connection established"
    );

    state.engine.dispatcher().emit_to_connection(
        &conn_id,
        &ServerEvent::Authenticated {
            user_id: auth.user_id,
            email: auth.email.clone(),
            connection_id: conn_id,
        },
    );

    // Follow the greeting with the current unread count so clients can
    // render their badge without a separate REST round trip.
    match state
        .engine
        .coordinator()
        .unread_count_for(auth.user_id)
        .await
    {
        Ok(unread_count) => {
            state
                .engine
                .dispatcher()
                .emit_to_connection(&conn_id, &ServerEvent::UnreadCount { unread_count });
        }
        Err(e) => {
            warn!(conn_id = %conn_id, error = %e, "Failed to fetch unread count at connect");
        }
    }

    // Forward queued frames to the socket; dropping the receiver on exit
    // marks the handle dead on the next send attempt.
    let writer = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    let ctx = RequestContext::new(auth.user_id, auth.email.clone(), auth.role, auth.tenant_id);

    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Text(text)) => {
                handle_client_event(&state, &ctx, &conn_id, &text).await;
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    writer.abort();
    state.engine.manager().unregister(&conn_id);

    info!(
        conn_id = %conn_id,
        user_id = %auth.user_id,
        "WebSocket connection closed"
    );
}

/// Parses and executes one inbound client event.
async fn handle_client_event(
    state: &AppState,
    ctx: &RequestContext,
    conn_id: &uuid::Uuid,
    raw: &str,
) {
    let event: ClientEvent = match serde_json::from_str(raw) {
        Ok(e) => e,
        Err(e) => {
            emit_error(state, conn_id, "INVALID_EVENT", &format!("{e}"));
            return;
        }
    };

    match event {
        ClientEvent::MarkRead { notification_id } => {
            if let Err(e) = state
                .engine
                .coordinator()
                .mark_read(ctx, notification_id)
                .await
            {
                emit_error(state, conn_id, &e.kind.to_string(), &e.message);
            }
        }
        ClientEvent::MarkAllRead => {
            if let Err(e) = state.engine.coordinator().mark_all_read(ctx).await {
                emit_error(state, conn_id, &e.kind.to_string(), &e.message);
            }
        }
        ClientEvent::Subscribe { channel } => {
            if let Err(code) = state.engine.manager().subscribe(conn_id, &channel) {
                emit_error(
                    state,
                    conn_id,
                    code,
                    &format!("Cannot subscribe to channel: {channel}"),
                );
            }
        }
        ClientEvent::Unsubscribe { channel } => {
            state.engine.manager().unsubscribe(conn_id, &channel);
        }
        ClientEvent::Ping { timestamp } => {
            state
                .engine
                .dispatcher()
                .emit_to_connection(conn_id, &ServerEvent::Pong { timestamp });
        }
    }
}

fn emit_error(state: &AppState, conn_id: &uuid::Uuid, code: &str, message: &str) {
    state.engine.dispatcher().emit_to_connection(
        conn_id,
        &ServerEvent::Error {
            code: code.to_string(),
            message: message.to_string(),
        },
    );
}
