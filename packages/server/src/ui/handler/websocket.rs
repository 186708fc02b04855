//! WebSocket connection handlers.
//!
//! 1 接続につき read loop と write loop の 2 タスクを起動します。
//! 両タスクが共有するのは送信キューとセッションレジストリだけです。

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use serde::Deserialize;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{Instant, Interval, MissedTickBehavior},
};

use crate::{
    domain::{PusherReceiver, UserId},
    infrastructure::dto::conversion::decode_inbound,
    ui::state::AppState,
};

/// Query parameters of the handshake: `/ws?userId=<id>&token=<jwt>`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectQuery {
    pub user_id: Option<String>,
    pub token: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let (Some(raw_user_id), Some(token)) = (non_empty(query.user_id), non_empty(query.token))
    else {
        tracing::warn!("Rejected handshake: missing userId or token");
        return Err(StatusCode::BAD_REQUEST);
    };

    let user_id = match UserId::try_from(raw_user_id) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("Rejected handshake: invalid userId: {}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    if let Err(e) = state.jwt_verifier.verify_for(&token, &user_id) {
        tracing::warn!("Rejected handshake for '{}': {}", user_id, e);
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user_id)))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, user_id: UserId) {
    let (session, rx) = state.connect_session_usecase.execute(user_id).await;
    tracing::info!(
        "User '{}' connected (session {})",
        session.user_id,
        session.session_id
    );

    let (sender, receiver) = socket.split();

    let (stop_tx, stop_rx) = watch::channel(false);
    let mut send_task = pusher_loop(rx, sender, state.settings.heartbeat_interval);
    let mut recv_task = tokio::spawn(read_loop(
        receiver,
        state.clone(),
        session.user_id.clone(),
        state.settings.idle_timeout,
        stop_rx,
    ));

    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => {
            // 処理中のイベントは配信まで終わらせ、次のフレームを待つ前に止める
            let _ = stop_tx.send(true);
            if let Err(e) = recv_task.await {
                tracing::warn!("Read loop of '{}' ended abnormally: {}", session.user_id, e);
            }
        }
    };

    let removed = state.disconnect_session_usecase.execute(&session).await;
    tracing::info!(
        "User '{}' disconnected (session {}, unregistered: {})",
        session.user_id,
        session.session_id,
        removed
    );
}

/// Reads frames until the peer closes, the transport fails, the idle timeout
/// fires, or `stop` is raised.
///
/// Each frame's dispatch (including every enqueue it causes) completes before
/// the next frame is read. `stop` is only observed while waiting for a frame,
/// so an event that was already persisted is always fanned out.
async fn read_loop(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    user_id: UserId,
    idle_timeout: Option<Duration>,
    mut stop: watch::Receiver<bool>,
) {
    loop {
        let next = tokio::select! {
            _ = stop.changed() => {
                tracing::debug!("Write loop of '{}' ended, stopping read loop", user_id);
                break;
            }
            next = next_frame(&mut receiver, idle_timeout) => next,
        };

        let next = match next {
            Ok(next) => next,
            Err(limit) => {
                tracing::info!("User '{}' idle for {:?}, closing", user_id, limit);
                break;
            }
        };

        let msg = match next {
            Some(Ok(msg)) => msg,
            Some(Err(e)) => {
                tracing::warn!("WebSocket error for '{}': {}", user_id, e);
                break;
            }
            None => break,
        };

        match msg {
            Message::Text(text) => match decode_inbound(text.as_str()) {
                Ok(event) => {
                    state.inbound_dispatcher.dispatch(&user_id, event).await;
                }
                Err(e) => {
                    tracing::warn!("Undecodable frame from '{}': {}", user_id, e);
                }
            },
            Message::Binary(_) => {
                tracing::debug!("Ignoring binary frame from '{}'", user_id);
            }
            Message::Ping(_) | Message::Pong(_) => {
                tracing::debug!("Heartbeat from '{}'", user_id);
            }
            Message::Close(_) => {
                tracing::info!("User '{}' requested close", user_id);
                break;
            }
        }
    }
}

/// Next frame, or `Err(limit)` when nothing arrives within `idle_timeout`
async fn next_frame(
    receiver: &mut SplitStream<WebSocket>,
    idle_timeout: Option<Duration>,
) -> Result<Option<Result<Message, axum::Error>>, Duration> {
    match idle_timeout {
        Some(limit) => tokio::time::timeout(limit, receiver.next())
            .await
            .map_err(|_| limit),
        None => Ok(receiver.next().await),
    }
}

/// Drains the session's outbound queue into the WebSocket, pinging every `heartbeat`.
///
/// Ends when the queue is closed (session replaced or removed) or a write fails.
fn pusher_loop(
    mut rx: PusherReceiver,
    mut sender: SplitSink<WebSocket, Message>,
    heartbeat: Option<Duration>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = heartbeat.map(|period| {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        loop {
            tokio::select! {
                payload = rx.recv() => {
                    let Some(payload) = payload else {
                        tracing::debug!("Outbound queue closed");
                        break;
                    };
                    if sender.send(Message::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
                _ = next_tick(&mut ticker) => {
                    if sender.send(Message::Ping(Default::default())).await.is_err() {
                        break;
                    }
                }
            }
        }

        let _ = sender.close().await;
    })
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
