/// Messages exchanged between the session actors and the server actor.
use actix::prelude::*;
use uuid::Uuid;

use super::message::ServerMessage;
use super::session::ChatSession;
use crate::modules::chat::channel::ChannelId;

/// A new WebSocket connection registered with the server.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    pub id: Uuid,
    pub addr: Addr<ChatSession>,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub id: Uuid,
}

/// A session resolved its credential to an identity.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Authenticate {
    pub session_id: Uuid,
    pub email: String,
}

/// Subscribe a user to a channel's live events.
#[derive(Message)]
#[rtype(result = "()")]
pub struct JoinChannel {
    pub email: String,
    pub channel_id: ChannelId,
}

/// Unsubscribe. Leaving a channel the user is not in is a no-op.
#[derive(Message)]
#[rtype(result = "()")]
pub struct LeaveChannel {
    pub email: String,
    pub channel_id: ChannelId,
}

/// Deliver a message to every user subscribed to the channel, optionally
/// excluding one (typing signals never echo back to the writer).
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct BroadcastToChannel {
    pub channel_id: ChannelId,
    pub message: ServerMessage,
    pub skip_user: Option<String>,
}
