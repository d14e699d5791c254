//! WebSocket transport for live topics
//!
//! GET /api/live/ws?topics=order:12,restaurant:3 — upgrade to WebSocket.
//! Every requested topic is authorized before the upgrade; one bad topic
//! rejects the whole connection. After the upgrade the socket only ever
//! receives: the server pushes serialized [`LiveMessage`]s and answers
//! pings, nothing a client sends mutates state.

use axum::Extension;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use shared::live::LiveMessage;
use tokio::sync::{broadcast, mpsc};

use crate::auth::Identity;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::live::Topic;
use crate::state::AppState;
use crate::tenant::TenantScope;

#[derive(Debug, Deserialize)]
pub struct LiveParams {
    /// Comma-separated topic names
    topics: String,
}

/// GET /api/live/ws — subscribe to live order events
pub async fn handle_live_ws(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<LiveParams>,
    ws: WebSocketUpgrade,
) -> AppResult<impl IntoResponse> {
    let scope = TenantScope::resolve(&identity)?;

    let mut topics = Vec::new();
    for raw in params.topics.split(',').filter(|s| !s.is_empty()) {
        let topic: Topic = raw
            .parse()
            .map_err(|_| AppError::Validation(format!("unknown topic '{raw}'")))?;
        authorize_topic(&state, &identity, &scope, topic).await?;
        topics.push(topic);
    }
    if topics.is_empty() {
        return Err(AppError::Validation(
            "at least one topic is required".to_string(),
        ));
    }

    Ok(ws.on_upgrade(move |socket| handle_connection(socket, state, identity, topics)))
}

/// Check one subscription against the caller's identity.
///
/// Restaurant feeds are staff dashboards; order feeds are open to staff
/// in scope and to the customer who placed the order. Out-of-scope
/// orders read as absent, not as forbidden.
async fn authorize_topic(
    state: &AppState,
    identity: &Identity,
    scope: &TenantScope,
    topic: Topic,
) -> AppResult<()> {
    match topic {
        Topic::Restaurant(tenant_id) => {
            identity.require_staff()?;
            if !scope.covers(tenant_id) {
                return Err(AppError::Forbidden(
                    "restaurant feed outside your tenant".to_string(),
                ));
            }
        }
        Topic::Order(order_id) => {
            let order = db::orders::get_scoped(&state.pool, scope, order_id)
                .await?
                .ok_or_else(|| AppError::NotFound("order not found".to_string()))?;
            if identity.is_customer() && order.placed_by != identity.subject {
                return Err(AppError::Forbidden(
                    "order feed belongs to another session".to_string(),
                ));
            }
        }
    }
    Ok(())
}

async fn handle_connection(
    socket: WebSocket,
    state: AppState,
    identity: Identity,
    topics: Vec<Topic>,
) {
    tracing::info!(
        session = %identity.session_id,
        subscriber = %identity.name,
        topics = topics.len(),
        "live subscriber connected"
    );

    let (mut ws_sink, mut ws_stream) = socket.split();

    // Fan all subscribed topics into one channel; one forwarder task per
    // topic. Forwarders stop when msg_rx is dropped at disconnect.
    let (msg_tx, mut msg_rx) = mpsc::channel::<LiveMessage>(32);
    for topic in &topics {
        let mut rx = state.live.subscribe(*topic);
        let tx = msg_tx.clone();
        let topic = *topic;
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(msg) => {
                        if tx.send(msg).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // At-most-once delivery: skipped events are not
                        // replayed, the client re-syncs by querying.
                        tracing::warn!(topic = %topic, skipped, "live subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }
    drop(msg_tx);

    loop {
        tokio::select! {
            msg = ws_stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        // App-level keepalive used by browser clients
                        if text.trim() == r#"{"type":"ping"}"# {
                            let pong = r#"{"type":"pong"}"#;
                            if ws_sink.send(Message::Text(pong.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = ws_sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(session = %identity.session_id, "WebSocket error: {e}");
                        break;
                    }
                    _ => {} // Binary, Pong — ignore
                }
            }

            msg = msg_rx.recv() => {
                match msg {
                    Some(live_msg) => {
                        if let Ok(json) = serde_json::to_string(&live_msg)
                            && ws_sink.send(Message::Text(json.into())).await.is_err()
                        {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    let _ = ws_sink.close().await;
    tracing::info!(session = %identity.session_id, "live subscriber disconnected");
}
