/// WebSocket message protocol.
///
/// Both directions are tagged unions with an explicit `type` discriminant
/// set by the producer, so consumers match on the tag instead of probing
/// for fields.
use serde::{Deserialize, Serialize};

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Authenticate the connection with a JWT access token.
    #[serde(rename_all = "camelCase")]
    Auth { token: String },

    /// Open the conversation with a friend: replays history, subscribes to
    /// live messages and typing, and starts the read-mark sweep.
    #[serde(rename_all = "camelCase")]
    OpenChat { recipient_email: String },

    /// Leave the conversation. Closing an already-closed chat is a no-op.
    #[serde(rename_all = "camelCase")]
    CloseChat { recipient_email: String },

    #[serde(rename_all = "camelCase")]
    SendMessage { recipient_email: String, content: String },

    #[serde(rename_all = "camelCase")]
    TypingStart { recipient_email: String },

    #[serde(rename_all = "camelCase")]
    TypingStop { recipient_email: String },

    /// Keep-alive.
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    AuthSuccess { email: String },

    #[serde(rename_all = "camelCase")]
    AuthFailed { reason: String },

    /// Full ordered history, sent once when a chat is opened.
    #[serde(rename_all = "camelCase")]
    ChatHistory { channel_id: String, messages: serde_json::Value },

    /// A message appended to an open channel.
    #[serde(rename_all = "camelCase")]
    NewMessage { channel_id: String, message: serde_json::Value },

    /// The other side swept the channel; everything addressed to them up
    /// to this point is now read.
    #[serde(rename_all = "camelCase")]
    MessagesRead { channel_id: String, reader: String },

    #[serde(rename_all = "camelCase")]
    UserTyping { channel_id: String, email: String },

    #[serde(rename_all = "camelCase")]
    UserStoppedTyping { channel_id: String, email: String },

    Pong,

    #[serde(rename_all = "camelCase")]
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    // === ClientMessage deserialization ===

    #[test]
    fn client_auth_deserialize() {
        let json = r#"{"type":"auth","token":"my-jwt-token"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::Auth { token } if token == "my-jwt-token"));
    }

    #[test]
    fn client_open_chat_deserialize() {
        let json = r#"{"type":"openChat","recipientEmail":"bob@example.com"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(
            matches!(msg, ClientMessage::OpenChat { recipient_email } if recipient_email == "bob@example.com")
        );
    }

    #[test]
    fn client_send_message_deserialize() {
        let json =
            r#"{"type":"sendMessage","recipientEmail":"bob@example.com","content":"hi there"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::SendMessage { recipient_email, content } => {
                assert_eq!(recipient_email, "bob@example.com");
                assert_eq!(content, "hi there");
            }
            _ => panic!("Expected SendMessage variant"),
        }
    }

    #[test]
    fn client_typing_deserialize() {
        let start = r#"{"type":"typingStart","recipientEmail":"bob@example.com"}"#;
        let stop = r#"{"type":"typingStop","recipientEmail":"bob@example.com"}"#;
        assert!(matches!(
            serde_json::from_str::<ClientMessage>(start).unwrap(),
            ClientMessage::TypingStart { .. }
        ));
        assert!(matches!(
            serde_json::from_str::<ClientMessage>(stop).unwrap(),
            ClientMessage::TypingStop { .. }
        ));
    }

    #[test]
    fn client_ping_deserialize() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));
    }

    #[test]
    fn unknown_type_is_an_error() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"unknownType"}"#).is_err());
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let json = r#"{"type":"sendMessage","recipientEmail":"bob@example.com"}"#;
        assert!(serde_json::from_str::<ClientMessage>(json).is_err());
    }

    // === ServerMessage serialization ===

    #[test]
    fn server_new_message_serialize() {
        let msg = ServerMessage::NewMessage {
            channel_id: "alice@example.com:bob@example.com".to_string(),
            message: serde_json::json!({"content": "hi"}),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"newMessage""#));
        assert!(json.contains(r#""content":"hi""#));
    }

    #[test]
    fn server_messages_read_serialize() {
        let msg = ServerMessage::MessagesRead {
            channel_id: "alice@example.com:bob@example.com".to_string(),
            reader: "bob@example.com".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"messagesRead""#));
        assert!(json.contains(r#""reader":"bob@example.com""#));
    }

    #[test]
    fn server_pong_serialize() {
        let json = serde_json::to_string(&ServerMessage::Pong).unwrap();
        assert_eq!(json, r#"{"type":"pong"}"#);
    }

    #[test]
    fn server_typing_roundtrip() {
        let original = ServerMessage::UserTyping {
            channel_id: "a@example.com:b@example.com".to_string(),
            email: "b@example.com".to_string(),
        };
        let json = serde_json::to_string(&original).unwrap();
        assert!(json.contains(r#""type":"userTyping""#));

        match serde_json::from_str::<ServerMessage>(&json).unwrap() {
            ServerMessage::UserTyping { email, .. } => assert_eq!(email, "b@example.com"),
            _ => panic!("Roundtrip failed"),
        }
    }
}
