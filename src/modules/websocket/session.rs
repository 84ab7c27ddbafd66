/// WebSocket session actor.
///
/// One per connection. Holds the authenticated identity, the set of
/// channels the client currently has open, and the outbound channel that
/// bridges serialized frames back to the connection task in handler.rs.
/// Async store calls run through `ctx.spawn()` + `into_actor()`.
use actix::prelude::*;
use std::collections::HashSet;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::ENV;
use crate::modules::chat::channel::ChannelId;
use crate::modules::chat::handle::ChatSvc;
use crate::utils::{Claims, TypeClaims};

use super::events::*;
use super::message::{ClientMessage, ServerMessage};
use super::server::ChatServer;
use super::typing::TypingService;

pub struct ChatSession {
    pub id: Uuid,

    /// Identity after a successful auth frame; None until then.
    pub email: Option<String>,

    pub server: Addr<ChatServer>,

    /// Outbound frames to the client (bridged through handler.rs).
    pub tx: mpsc::UnboundedSender<String>,

    /// Channels this client has open. Open/close are idempotent against
    /// this set before anything is sent to the server actor.
    open_channels: HashSet<ChannelId>,

    /// None in test environments without a store behind them.
    pub chat_service: Option<actix_web::web::Data<ChatSvc>>,
    pub typing_service: Option<actix_web::web::Data<TypingService>>,
}

fn send_raw(tx: &mpsc::UnboundedSender<String>, msg: &ServerMessage) {
    match serde_json::to_string(msg) {
        Ok(json) => {
            let _ = tx.send(json);
        }
        Err(e) => {
            tracing::error!("Failed to serialize ServerMessage: {}", e);
        }
    }
}

impl ChatSession {
    pub fn new(
        server: Addr<ChatServer>,
        tx: mpsc::UnboundedSender<String>,
        chat_service: actix_web::web::Data<ChatSvc>,
        typing_service: actix_web::web::Data<TypingService>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            email: None,
            server,
            tx,
            open_channels: HashSet::new(),
            chat_service: Some(chat_service),
            typing_service: Some(typing_service),
        }
    }

    fn send_to_client(&self, msg: &ServerMessage) {
        send_raw(&self.tx, msg);
    }

    fn send_error(&self, message: &str) {
        self.send_to_client(&ServerMessage::Error { message: message.to_string() });
    }

    fn require_auth(&self) -> Option<String> {
        if self.email.is_none() {
            self.send_error("You must authenticate before performing this action");
            tracing::warn!("Session {} not authenticated, rejecting request", self.id);
        }
        self.email.clone()
    }

    fn handle_client_message(&mut self, msg: &ClientMessage, ctx: &mut Context<Self>) {
        match msg {
            ClientMessage::Auth { token } => {
                self.handle_auth(token);
            }

            ClientMessage::OpenChat { recipient_email } => {
                self.handle_open_chat(recipient_email.clone(), ctx);
            }

            ClientMessage::CloseChat { recipient_email } => {
                self.handle_close_chat(recipient_email);
            }

            ClientMessage::SendMessage { recipient_email, content } => {
                self.handle_send_message(recipient_email.clone(), content.clone(), ctx);
            }

            ClientMessage::TypingStart { recipient_email } => {
                self.handle_typing(recipient_email, true, ctx);
            }

            ClientMessage::TypingStop { recipient_email } => {
                self.handle_typing(recipient_email, false, ctx);
            }

            ClientMessage::Ping => {
                self.send_to_client(&ServerMessage::Pong);
            }
        }
    }

    fn handle_auth(&mut self, token: &str) {
        if self.email.is_some() {
            self.send_error("Session already authenticated");
            return;
        }

        let claims = match Claims::decode(token, ENV.jwt_secret.as_ref()) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!("JWT verification failed (session {}): {}", self.id, e);
                self.send_to_client(&ServerMessage::AuthFailed {
                    reason: "Token invalid or expired".to_string(),
                });
                return;
            }
        };

        if claims._type.as_ref() != Some(&TypeClaims::AccessToken) {
            self.send_to_client(&ServerMessage::AuthFailed {
                reason: "Access token required".to_string(),
            });
            return;
        }

        let email = claims.sub;
        self.email = Some(email.clone());
        self.server.do_send(Authenticate { session_id: self.id, email: email.clone() });
        self.send_to_client(&ServerMessage::AuthSuccess { email });
    }

    /// Opens a conversation: joins the channel room, replays history and
    /// issues the initial read-mark sweep. Re-opening an open channel just
    /// replays again.
    fn handle_open_chat(&mut self, recipient_email: String, ctx: &mut Context<Self>) {
        let Some(email) = self.require_auth() else {
            return;
        };

        let channel = match ChannelId::between(&email, &recipient_email) {
            Ok(channel) => channel,
            Err(e) => {
                self.send_error(&e.to_string());
                return;
            }
        };

        if self.open_channels.insert(channel.clone()) {
            self.server.do_send(JoinChannel { email: email.clone(), channel_id: channel.clone() });
        }

        let Some(service) = self.chat_service.clone() else {
            self.send_error("Chat service unavailable");
            return;
        };

        let typing = self.typing_service.clone();
        let tx = self.tx.clone();
        ctx.spawn(
            async move {
                match service.get_chat(&email, &recipient_email).await {
                    Ok(messages) => {
                        send_raw(
                            &tx,
                            &ServerMessage::ChatHistory {
                                channel_id: channel.as_str().to_string(),
                                messages: serde_json::to_value(&messages).unwrap_or_default(),
                            },
                        );
                    }
                    Err(e) => {
                        tracing::error!("Failed to load history for {}: {}", channel, e);
                        send_raw(
                            &tx,
                            &ServerMessage::Error {
                                message: "Could not load chat history".to_string(),
                            },
                        );
                        return;
                    }
                }

                if let Err(e) = service.mark_messages_as_read(&email, &recipient_email).await {
                    tracing::error!("Initial read-mark sweep failed for {}: {}", channel, e);
                }

                // Replay the peer's current typing state so a freshly
                // opened chat does not miss an in-flight signal.
                if let (Some(typing), Some(peer)) = (typing, channel.peer_of(&email)) {
                    match typing.is_typing(&channel, peer).await {
                        Ok(true) => send_raw(
                            &tx,
                            &ServerMessage::UserTyping {
                                channel_id: channel.as_str().to_string(),
                                email: peer.to_string(),
                            },
                        ),
                        Ok(false) => {}
                        Err(e) => {
                            tracing::warn!("Failed to read typing state for {}: {}", channel, e);
                        }
                    }
                }
            }
            .into_actor(self),
        );
    }

    fn handle_close_chat(&mut self, recipient_email: &str) {
        let Some(email) = self.require_auth() else {
            return;
        };

        let Ok(channel) = ChannelId::between(&email, recipient_email) else {
            return;
        };

        // Closing twice is a no-op, not an error.
        if self.open_channels.remove(&channel) {
            self.server.do_send(LeaveChannel { email, channel_id: channel });
        }
    }

    fn handle_send_message(
        &self,
        recipient_email: String,
        content: String,
        ctx: &mut Context<Self>,
    ) {
        let Some(email) = self.require_auth() else {
            return;
        };

        let Some(service) = self.chat_service.clone() else {
            self.send_error("Chat service unavailable");
            return;
        };

        let tx = self.tx.clone();
        let session_id = self.id;

        ctx.spawn(
            async move {
                // Persist first; the service broadcasts to the room itself.
                if let Err(e) = service.send_message(&email, &recipient_email, &content).await {
                    tracing::error!("Failed to send message (session {}): {}", session_id, e);
                    send_raw(
                        &tx,
                        &ServerMessage::Error {
                            message: "Could not send the message. Please try again.".to_string(),
                        },
                    );
                }
            }
            .into_actor(self),
        );
    }

    fn handle_typing(&self, recipient_email: &str, typing: bool, ctx: &mut Context<Self>) {
        let Some(email) = self.require_auth() else {
            return;
        };

        let channel = match ChannelId::between(&email, recipient_email) {
            Ok(channel) => channel,
            Err(e) => {
                self.send_error(&e.to_string());
                return;
            }
        };

        // The writer is excluded from the broadcast; only the other
        // participant sees the signal.
        let event = if typing {
            ServerMessage::UserTyping {
                channel_id: channel.as_str().to_string(),
                email: email.clone(),
            }
        } else {
            ServerMessage::UserStoppedTyping {
                channel_id: channel.as_str().to_string(),
                email: email.clone(),
            }
        };

        self.server.do_send(BroadcastToChannel {
            channel_id: channel.clone(),
            message: event,
            skip_user: Some(email.clone()),
        });

        if let Some(service) = self.typing_service.clone() {
            ctx.spawn(
                async move {
                    if let Err(e) = service.set_typing(&channel, &email, typing).await {
                        tracing::warn!("Failed to store typing state for {}: {}", channel, e);
                    }
                }
                .into_actor(self),
            );
        }
    }

    /// Read-mark sweep while a chat is open: an inbound message addressed
    /// to this user on an open channel is marked read immediately.
    fn sweep_on_new_message(&self, msg: &ServerMessage, ctx: &mut Context<Self>) {
        let ServerMessage::NewMessage { channel_id, message } = msg else {
            return;
        };

        let Some(email) = self.email.clone() else {
            return;
        };

        if !self.open_channels.iter().any(|c| c.as_str() == channel_id) {
            return;
        }

        if message.get("recipient").and_then(|v| v.as_str()) != Some(email.as_str()) {
            return;
        }

        let Some(sender) = message.get("sender").and_then(|v| v.as_str()).map(String::from) else {
            return;
        };

        let Some(service) = self.chat_service.clone() else {
            return;
        };

        ctx.spawn(
            async move {
                if let Err(e) = service.mark_messages_as_read(&email, &sender).await {
                    tracing::error!("Read-mark sweep failed: {}", e);
                }
            }
            .into_actor(self),
        );
    }
}

impl Actor for ChatSession {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::debug!("WebSocket session started: {}", self.id);
        self.server.do_send(Connect { id: self.id, addr: ctx.address() });
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::debug!("WebSocket session stopped: {}", self.id);
        self.server.do_send(Disconnect { id: self.id });
    }
}

impl Message for ClientMessage {
    type Result = ();
}

impl Handler<ClientMessage> for ChatSession {
    type Result = ();

    fn handle(&mut self, msg: ClientMessage, ctx: &mut Context<Self>) {
        self.handle_client_message(&msg, ctx);
    }
}

/// Events from the server actor: sweep if it is a fresh inbound message on
/// an open channel, then forward to the client.
impl Handler<ServerMessage> for ChatSession {
    type Result = ();

    fn handle(&mut self, msg: ServerMessage, ctx: &mut Context<Self>) {
        self.sweep_on_new_message(&msg, ctx);
        self.send_to_client(&msg);
    }
}
