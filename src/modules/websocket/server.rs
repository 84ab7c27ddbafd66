/// WebSocket server actor.
///
/// Owns the registry of live sessions, the user -> sessions index
/// (multi-device), and the channel rooms. Delivery through here is
/// best-effort: a message queued for a session that dies in flight is
/// dropped silently, history stays in the store.
use actix::prelude::*;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::events::*;
use super::message::ServerMessage;
use super::session::ChatSession;
use crate::modules::chat::channel::ChannelId;

pub struct ChatServer {
    /// session_id -> session actor address
    sessions: HashMap<Uuid, Addr<ChatSession>>,

    /// email -> set of session_ids (one user may be connected from
    /// several devices)
    users: HashMap<String, HashSet<Uuid>>,

    /// channel -> set of subscribed emails
    rooms: HashMap<ChannelId, HashSet<String>>,
}

impl ChatServer {
    pub fn new() -> Self {
        Self { sessions: HashMap::new(), users: HashMap::new(), rooms: HashMap::new() }
    }

    fn send_to_session(&self, session_id: &Uuid, message: ServerMessage) {
        if let Some(session_addr) = self.sessions.get(session_id) {
            session_addr.do_send(message);
        }
    }
}

impl Actor for ChatServer {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("Chat server started");
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("Chat server stopped");
    }
}

impl Handler<Connect> for ChatServer {
    type Result = ();

    fn handle(&mut self, msg: Connect, _: &mut Context<Self>) {
        tracing::debug!("New WebSocket session connected: {}", msg.id);
        self.sessions.insert(msg.id, msg.addr);
    }
}

impl Handler<Disconnect> for ChatServer {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _: &mut Context<Self>) {
        tracing::debug!("WebSocket session disconnected: {}", msg.id);

        self.sessions.remove(&msg.id);

        // Drop the session from its user; forget the user entirely once
        // their last session is gone.
        let mut user_to_remove: Option<String> = None;
        for (email, sessions) in self.users.iter_mut() {
            if sessions.remove(&msg.id) {
                if sessions.is_empty() {
                    user_to_remove = Some(email.clone());
                }
                break;
            }
        }

        if let Some(email) = user_to_remove {
            self.users.remove(&email);

            for room_users in self.rooms.values_mut() {
                room_users.remove(&email);
            }
            self.rooms.retain(|_, users| !users.is_empty());

            tracing::info!("User {} fully disconnected, removed from all channels", email);
        }
    }
}

impl Handler<Authenticate> for ChatServer {
    type Result = ();

    fn handle(&mut self, msg: Authenticate, _: &mut Context<Self>) {
        let sessions = self.users.entry(msg.email.clone()).or_default();
        sessions.insert(msg.session_id);

        tracing::info!("User {} now has {} active session(s)", msg.email, sessions.len());
    }
}

impl Handler<JoinChannel> for ChatServer {
    type Result = ();

    fn handle(&mut self, msg: JoinChannel, _: &mut Context<Self>) {
        self.rooms.entry(msg.channel_id.clone()).or_default().insert(msg.email.clone());

        tracing::debug!(
            "User {} joined channel {} ({} subscribed)",
            msg.email,
            msg.channel_id,
            self.rooms.get(&msg.channel_id).map_or(0, HashSet::len)
        );
    }
}

impl Handler<LeaveChannel> for ChatServer {
    type Result = ();

    fn handle(&mut self, msg: LeaveChannel, _: &mut Context<Self>) {
        if let Some(room) = self.rooms.get_mut(&msg.channel_id) {
            room.remove(&msg.email);

            if room.is_empty() {
                self.rooms.remove(&msg.channel_id);
                tracing::debug!("Channel {} empty, removed", msg.channel_id);
            }
        }
    }
}

impl Handler<BroadcastToChannel> for ChatServer {
    type Result = ();

    fn handle(&mut self, msg: BroadcastToChannel, _: &mut Context<Self>) {
        let Some(room_users) = self.rooms.get(&msg.channel_id) else {
            tracing::debug!("Broadcast to channel {} with no subscribers", msg.channel_id);
            return;
        };

        let mut sent_count = 0;
        for email in room_users {
            if msg.skip_user.as_deref() == Some(email.as_str()) {
                continue;
            }

            if let Some(session_ids) = self.users.get(email) {
                for session_id in session_ids {
                    self.send_to_session(session_id, msg.message.clone());
                    sent_count += 1;
                }
            }
        }

        tracing::debug!("Broadcast to channel {}: {} session(s)", msg.channel_id, sent_count);
    }
}

/// Let ServerMessage travel from the server actor to session actors.
impl Message for ServerMessage {
    type Result = ();
}

impl Default for ChatServer {
    fn default() -> Self {
        Self::new()
    }
}
