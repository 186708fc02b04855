//! Shared application state.

use std::sync::Arc;

use chathub_shared::time::Clock;

use crate::{
    config::HubSettings,
    domain::{MessageGateway, MessagePusher},
    infrastructure::auth::JwtVerifier,
    usecase::{
        ConnectSessionUseCase, DisconnectSessionUseCase, FanoutRouter, GetChatHistoryUseCase,
        InboundDispatcher, MarkMessageReadUseCase, NotifyUseCase, SendChatMessageUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// ConnectSessionUseCase（セッション接続のユースケース）
    pub connect_session_usecase: Arc<ConnectSessionUseCase>,
    /// DisconnectSessionUseCase（セッション切断のユースケース）
    pub disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    /// InboundDispatcher（受信イベントの振り分け）
    pub inbound_dispatcher: Arc<InboundDispatcher>,
    /// NotifyUseCase（外部コラボレーター向け通知 API）
    pub notify_usecase: Arc<NotifyUseCase>,
    /// GetChatHistoryUseCase（チャット履歴取得のユースケース）
    pub get_chat_history_usecase: Arc<GetChatHistoryUseCase>,
    /// MessagePusher（接続中セッションの参照用）
    pub message_pusher: Arc<dyn MessagePusher>,
    pub jwt_verifier: JwtVerifier,
    pub settings: HubSettings,
}

impl AppState {
    /// Wire every usecase on top of a gateway and a pusher.
    pub fn new(
        message_gateway: Arc<dyn MessageGateway>,
        message_pusher: Arc<dyn MessagePusher>,
        jwt_verifier: JwtVerifier,
        settings: HubSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        // 1. Fan-out Router
        let router = Arc::new(FanoutRouter::new(
            message_gateway.clone(),
            message_pusher.clone(),
        ));

        // 2. 受信イベントのハンドラー
        let send_chat_message = Arc::new(SendChatMessageUseCase::new(
            message_gateway.clone(),
            router.clone(),
        ));
        let mark_message_read = Arc::new(MarkMessageReadUseCase::new(
            message_gateway.clone(),
            router.clone(),
        ));

        // 3. 接続管理・通知・履歴
        Self {
            connect_session_usecase: Arc::new(ConnectSessionUseCase::new(
                message_pusher.clone(),
                clock,
                settings.outbound_queue_capacity,
            )),
            disconnect_session_usecase: Arc::new(DisconnectSessionUseCase::new(
                message_pusher.clone(),
            )),
            inbound_dispatcher: Arc::new(InboundDispatcher::new(
                send_chat_message,
                mark_message_read,
            )),
            notify_usecase: Arc::new(NotifyUseCase::new(router)),
            get_chat_history_usecase: Arc::new(GetChatHistoryUseCase::new(message_gateway)),
            message_pusher,
            jwt_verifier,
            settings,
        }
    }
}
