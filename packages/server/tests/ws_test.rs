//! In-process integration tests: a real axum server on an ephemeral port,
//! driven by WebSocket and HTTP clients.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use chathub_server::{
    config::HubSettings,
    domain::{
        ChatId, GatewayError, Message as ChatMessage, MessageGateway, MessageId, MessageStatus,
        MessageType, UserId,
    },
    infrastructure::{
        auth::JwtVerifier,
        gateway::InMemoryMessageGateway,
        message_pusher::{SessionRegistry, WebSocketMessagePusher},
    },
    ui::{AppState, Server},
};
use async_trait::async_trait;
use chathub_shared::time::{Clock, SystemClock};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::{net::TcpStream, time::timeout};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{Error as WsError, Message},
};

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

const SECRET: &[u8] = b"integration-secret";

struct TestHub {
    addr: SocketAddr,
    gateway: Arc<InMemoryMessageGateway>,
    state: Arc<AppState>,
    verifier: JwtVerifier,
}

impl TestHub {
    async fn start() -> Self {
        Self::start_with(HubSettings::default(), None).await
    }

    /// Chats: c1 = {u1, u2}, c2 = {u1, u3}.
    /// `participants_delay` slows down every participant lookup of the hub.
    async fn start_with(settings: HubSettings, participants_delay: Option<Duration>) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let gateway = Arc::new(InMemoryMessageGateway::new(clock.clone()));
        gateway
            .create_chat(chat("c1"), [user("u1"), user("u2")])
            .await;
        gateway
            .create_chat(chat("c2"), [user("u1"), user("u3")])
            .await;

        let message_gateway: Arc<dyn MessageGateway> = match participants_delay {
            Some(delay) => Arc::new(SlowParticipantsGateway {
                inner: gateway.clone(),
                delay,
            }),
            None => gateway.clone(),
        };

        let verifier = JwtVerifier::new(SECRET);
        let state = Arc::new(AppState::new(
            message_gateway,
            Arc::new(WebSocketMessagePusher::new(SessionRegistry::new())),
            verifier.clone(),
            settings,
            clock,
        ));
        let router = Server::new(state.clone()).router();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            addr,
            gateway,
            state,
            verifier,
        }
    }

    fn token(&self, user_id: &str) -> String {
        self.verifier.issue(&user(user_id), 3600).unwrap()
    }

    fn ws_url(&self, query: &str) -> String {
        format!("ws://{}/ws?{}", self.addr, query)
    }

    async fn session_count(&self, user_id: &str) -> usize {
        self.state
            .message_pusher
            .connected_sessions()
            .await
            .iter()
            .filter(|s| s.user_id.as_str() == user_id)
            .count()
    }

    /// Connect `user_id` and wait until its session is registered
    async fn connect(&self, user_id: &str) -> Ws {
        let url = self.ws_url(&format!("userId={}&token={}", user_id, self.token(user_id)));
        let (ws, _) = connect_async(url).await.unwrap();
        self.wait_for_session(user_id).await;
        ws
    }

    async fn wait_for_session(&self, user_id: &str) {
        for _ in 0..100 {
            if self.session_count(user_id).await == 1 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("session of {user_id} was never registered");
    }

    async fn handshake_status(&self, query: &str) -> u16 {
        match connect_async(self.ws_url(query)).await {
            Err(WsError::Http(response)) => response.status().as_u16(),
            other => panic!("expected an HTTP rejection, got {:?}", other.map(|_| ())),
        }
    }
}

/// Gateway whose participant lookups take `delay`
struct SlowParticipantsGateway {
    inner: Arc<InMemoryMessageGateway>,
    delay: Duration,
}

#[async_trait]
impl MessageGateway for SlowParticipantsGateway {
    async fn create_message(
        &self,
        sender_id: &UserId,
        chat_id: &ChatId,
        content: &str,
        message_type: MessageType,
    ) -> Result<ChatMessage, GatewayError> {
        self.inner
            .create_message(sender_id, chat_id, content, message_type)
            .await
    }

    async fn fetch_chat_history(&self, chat_id: &ChatId) -> Result<Vec<ChatMessage>, GatewayError> {
        self.inner.fetch_chat_history(chat_id).await
    }

    async fn update_message_status(
        &self,
        message_id: &MessageId,
        status: MessageStatus,
    ) -> Result<ChatMessage, GatewayError> {
        self.inner.update_message_status(message_id, status).await
    }

    async fn list_participants(&self, chat_id: &ChatId) -> Result<Vec<UserId>, GatewayError> {
        tokio::time::sleep(self.delay).await;
        self.inner.list_participants(chat_id).await
    }
}

fn user(id: &str) -> UserId {
    UserId::try_from(id).unwrap()
}

fn chat(id: &str) -> ChatId {
    ChatId::try_from(id).unwrap()
}

/// Next text frame as JSON, skipping heartbeats
async fn next_frame(ws: &mut Ws) -> Value {
    loop {
        let msg = timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn assert_silent(ws: &mut Ws) {
    let result = timeout(Duration::from_millis(200), async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => return text.as_str().to_string(),
                Some(Ok(_)) => continue,
                _ => return String::new(),
            }
        }
    })
    .await;
    assert!(result.is_err(), "unexpected frame: {:?}", result);
}

async fn send_json(ws: &mut Ws, frame: Value) {
    ws.send(Message::text(frame.to_string())).await.unwrap();
}

#[tokio::test]
async fn test_handshake_rejections() {
    // テスト項目: パラメータ不足は 400、不正・期限切れ・他人のトークンは 401 で拒否される
    // given (前提条件):
    let hub = TestHub::start().await;
    let expired = hub.verifier.issue(&user("u1"), -3600).unwrap();
    let foreign = JwtVerifier::new(b"other-secret").issue(&user("u1"), 3600).unwrap();

    // when (操作):
    let missing_token = hub.handshake_status("userId=u1").await;
    let empty_user = hub.handshake_status(&format!("userId=&token={}", hub.token("u1"))).await;
    let garbage = hub.handshake_status("userId=u1&token=garbage").await;
    let expired = hub.handshake_status(&format!("userId=u1&token={}", expired)).await;
    let wrong_key = hub.handshake_status(&format!("userId=u1&token={}", foreign)).await;
    let mismatch = hub
        .handshake_status(&format!("userId=u1&token={}", hub.token("u2")))
        .await;

    // then (期待する結果):
    assert_eq!(missing_token, 400);
    assert_eq!(empty_user, 400);
    assert_eq!(garbage, 401);
    assert_eq!(expired, 401);
    assert_eq!(wrong_key, 401);
    assert_eq!(mismatch, 401);
    assert!(hub.state.message_pusher.connected_sessions().await.is_empty());
}

#[tokio::test]
async fn test_chat_and_read_receipt_flow() {
    // テスト項目: u1 のチャットが c1 の参加者に届き、u2 の既読が u1 にだけ届く
    // given (前提条件):
    let hub = TestHub::start().await;
    let mut u1 = hub.connect("u1").await;
    let mut u2 = hub.connect("u2").await;
    let mut u3 = hub.connect("u3").await;

    // when (操作):
    send_json(&mut u1, json!({"type": "chat", "chatId": "c1", "content": "hi"})).await;
    let u1_chat = next_frame(&mut u1).await;
    let u2_chat = next_frame(&mut u2).await;
    let u2_notification = next_frame(&mut u2).await;
    let message_id = u1_chat["data"]["id"].as_str().unwrap().to_string();

    send_json(&mut u2, json!({"type": "read_receipt", "data": message_id})).await;
    let u1_status = next_frame(&mut u1).await;

    // then (期待する結果):
    assert_eq!(u1_chat["type"], "chat");
    assert_eq!(u1_chat["chatId"], "c1");
    assert_eq!(u1_chat["content"], "hi");
    assert_eq!(u1_chat["data"]["senderId"], "u1");
    assert_eq!(u1_chat["data"]["status"], "SENT");
    assert_eq!(u2_chat, u1_chat);
    assert_eq!(u2_notification["type"], "notification");
    assert_eq!(u2_notification["content"], "New message: hi");

    assert_eq!(u1_status["type"], "status_update");
    assert_eq!(u1_status["chatId"], "c1");
    assert_eq!(u1_status["content"], "Message has been read");
    assert_eq!(u1_status["data"]["status"], "READ");

    let stored = hub
        .gateway
        .get_message(&MessageId::try_from(message_id).unwrap())
        .await
        .unwrap();
    assert_eq!(stored.status, MessageStatus::Read);

    assert_silent(&mut u2).await;
    assert_silent(&mut u3).await;
}

#[tokio::test]
async fn test_offline_recipient_gets_no_replay() {
    // テスト項目: オフラインの u3 には配信されず、再接続後も再送されない
    // given (前提条件):
    let hub = TestHub::start().await;
    let mut u1 = hub.connect("u1").await;

    // when (操作):
    send_json(&mut u1, json!({"type": "chat", "chatId": "c2", "content": "anyone?"})).await;
    let echoed = next_frame(&mut u1).await;
    let mut u3 = hub.connect("u3").await;

    // then (期待する結果):
    assert_eq!(echoed["type"], "chat");
    assert_eq!(hub.gateway.count_messages().await, 1);
    assert_silent(&mut u3).await;
}

#[tokio::test]
async fn test_undecodable_frame_keeps_connection_open() {
    // テスト項目: 解析できないフレームや未知の type は無視され、接続は維持される
    // given (前提条件):
    let hub = TestHub::start().await;
    let mut u1 = hub.connect("u1").await;

    // when (操作):
    u1.send(Message::text("not json")).await.unwrap();
    send_json(&mut u1, json!({"type": "typing", "chatId": "c1"})).await;
    send_json(&mut u1, json!({"type": "chat", "chatId": "c1", "content": "still here"})).await;
    let frame = next_frame(&mut u1).await;

    // then (期待する結果):
    assert_eq!(frame["content"], "still here");
    assert_eq!(hub.gateway.count_messages().await, 1);
}

#[tokio::test]
async fn test_reconnect_replaces_previous_session() {
    // テスト項目: 同じユーザーの再接続で古い接続は終了し、新しい接続だけが配信を受ける
    // given (前提条件):
    let hub = TestHub::start().await;
    let mut first = hub.connect("u2").await;
    let mut u1 = hub.connect("u1").await;

    // when (操作):
    let url = hub.ws_url(&format!("userId=u2&token={}", hub.token("u2")));
    let (mut second, _) = connect_async(url).await.unwrap();
    // 古い接続は送信キューのクローズを検知して閉じられる
    let first_closed = timeout(Duration::from_secs(2), async {
        loop {
            match first.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await;
    send_json(&mut u1, json!({"type": "chat", "chatId": "c1", "content": "hello again"})).await;
    let _ = next_frame(&mut u1).await;
    let delivered = next_frame(&mut second).await;

    // then (期待する結果):
    assert!(first_closed.is_ok());
    assert_eq!(delivered["content"], "hello again");
    assert_eq!(hub.session_count("u2").await, 1);
}

#[tokio::test]
async fn test_http_endpoints() {
    // テスト項目: health・セッション一覧・履歴 API が期待どおりに応答する
    // given (前提条件):
    let hub = TestHub::start().await;
    let mut u1 = hub.connect("u1").await;
    send_json(&mut u1, json!({"type": "chat", "chatId": "c1", "content": "first"})).await;
    let _ = next_frame(&mut u1).await;
    send_json(&mut u1, json!({"type": "chat", "chatId": "c1", "content": "second"})).await;
    let _ = next_frame(&mut u1).await;
    let client = reqwest::Client::new();
    let base = format!("http://{}", hub.addr);

    // when (操作):
    let health: Value = client
        .get(format!("{base}/api/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let sessions: Value = client
        .get(format!("{base}/debug/sessions"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let history = client
        .get(format!("{base}/api/chats/c1/messages"))
        .bearer_auth(hub.token("u2"))
        .send()
        .await
        .unwrap();
    let history_status = history.status().as_u16();
    let history: Value = history.json().await.unwrap();
    let unauthenticated = client
        .get(format!("{base}/api/chats/c1/messages"))
        .send()
        .await
        .unwrap()
        .status()
        .as_u16();
    let outsider = client
        .get(format!("{base}/api/chats/c1/messages"))
        .bearer_auth(hub.token("u3"))
        .send()
        .await
        .unwrap()
        .status()
        .as_u16();
    let unknown_chat = client
        .get(format!("{base}/api/chats/nope/messages"))
        .bearer_auth(hub.token("u1"))
        .send()
        .await
        .unwrap()
        .status()
        .as_u16();

    // then (期待する結果):
    assert_eq!(health, json!({"status": "ok"}));
    assert_eq!(sessions.as_array().unwrap().len(), 1);
    assert_eq!(sessions[0]["userId"], "u1");
    assert!(sessions[0]["connectedAt"].as_str().unwrap().ends_with('Z'));

    assert_eq!(history_status, 200);
    let contents: Vec<&str> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["second", "first"]);
    assert_eq!(unauthenticated, 401);
    assert_eq!(outsider, 403);
    assert_eq!(unknown_chat, 404);
}

#[tokio::test]
async fn test_reconnect_during_dispatch_still_fans_out() {
    // テスト項目: 配信処理の途中で送信者が再接続しても、保存済みのメッセージは参加者に届く
    // given (前提条件): 参加者の取得に 400ms かかる
    let hub = TestHub::start_with(HubSettings::default(), Some(Duration::from_millis(400))).await;
    let mut first = hub.connect("u1").await;
    let mut u2 = hub.connect("u2").await;

    // when (操作):
    send_json(&mut first, json!({"type": "chat", "chatId": "c1", "content": "hi"})).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    let url = hub.ws_url(&format!("userId=u1&token={}", hub.token("u1")));
    let (_second, _) = connect_async(url).await.unwrap();
    let chat_frame = next_frame(&mut u2).await;
    let notification = next_frame(&mut u2).await;

    // then (期待する結果):
    assert_eq!(hub.gateway.count_messages().await, 1);
    assert_eq!(chat_frame["type"], "chat");
    assert_eq!(chat_frame["content"], "hi");
    assert_eq!(notification["type"], "notification");
    assert_eq!(notification["content"], "New message: hi");
}

#[tokio::test]
async fn test_idle_connection_is_closed_and_unregistered() {
    // テスト項目: 何も送ってこない接続は idle timeout で閉じられ、レジストリから削除される
    // given (前提条件):
    let settings = HubSettings {
        outbound_queue_capacity: 16,
        heartbeat_interval: None,
        idle_timeout: Some(Duration::from_millis(300)),
    };
    let hub = TestHub::start_with(settings, None).await;
    let _silent = hub.connect("u1").await;

    // when (操作):
    let mut unregistered = false;
    for _ in 0..200 {
        if hub.session_count("u1").await == 0 {
            unregistered = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    // then (期待する結果):
    assert!(unregistered);
}

#[tokio::test]
async fn test_heartbeat_ping_is_sent() {
    // テスト項目: heartbeat 間隔ごとにサーバーから Ping が送られる
    // given (前提条件):
    let settings = HubSettings {
        outbound_queue_capacity: 16,
        heartbeat_interval: Some(Duration::from_millis(100)),
        idle_timeout: None,
    };
    let hub = TestHub::start_with(settings, None).await;
    let mut u1 = hub.connect("u1").await;

    // when (操作):
    let pinged = timeout(Duration::from_secs(1), async {
        loop {
            match u1.next().await {
                Some(Ok(Message::Ping(_))) => return true,
                Some(Ok(_)) => continue,
                _ => return false,
            }
        }
    })
    .await;

    // then (期待する結果):
    assert_eq!(pinged, Ok(true));
    assert_eq!(hub.session_count("u1").await, 1);
}
