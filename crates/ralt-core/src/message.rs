//! UI-agnostic chat message types
//!
//! Messages are shared between front ends and are also sent back to the
//! backend as conversation context, so their serialized shape is part of the
//! wire format.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::AgentKind;

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    Agent,
    Error,
}

/// A single entry in the session log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: String,
    pub timestamp: DateTime<Local>,

    // Populated only for agent replies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities_used: Vec<String>,
}

impl Message {
    fn bare(id: u64, kind: MessageKind, content: String) -> Self {
        Self {
            id,
            kind,
            content,
            timestamp: Local::now(),
            agent: None,
            metadata: None,
            model_used: None,
            capabilities_used: Vec::new(),
        }
    }

    pub fn user(id: u64, content: impl Into<String>) -> Self {
        Self::bare(id, MessageKind::User, content.into())
    }

    pub fn error(id: u64, content: impl Into<String>) -> Self {
        Self::bare(id, MessageKind::Error, content.into())
    }

    pub fn agent(id: u64, agent: AgentKind, reply: crate::api::ChatReply) -> Self {
        Self {
            agent: Some(agent),
            metadata: Some(reply.metadata),
            model_used: reply.model_used,
            capabilities_used: reply.capabilities_used,
            ..Self::bare(id, MessageKind::Agent, reply.response)
        }
    }
}

/// Hands out millisecond timestamps as message ids, bumped so that ids stay
/// strictly increasing within one session.
#[derive(Debug, Default, Clone)]
pub struct MessageIdGen {
    last: u64,
}

impl MessageIdGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> u64 {
        let now = Local::now().timestamp_millis().max(0) as u64;
        self.last = now.max(self.last + 1);
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ChatReply;
    use serde_json::json;

    #[test]
    fn test_ids_strictly_increase() {
        let mut ids = MessageIdGen::new();
        let mut prev = ids.next_id();
        for _ in 0..1000 {
            let id = ids.next_id();
            assert!(id > prev);
            prev = id;
        }
    }

    #[test]
    fn test_ids_are_time_derived() {
        let before = Local::now().timestamp_millis() as u64;
        let id = MessageIdGen::new().next_id();
        assert!(id >= before);
    }

    #[test]
    fn test_user_message_serializes_with_type_field() {
        let msg = Message::user(7, "hello");
        let value = serde_json::to_value(&msg).unwrap();

        assert_eq!(value["id"], 7);
        assert_eq!(value["type"], "user");
        assert_eq!(value["content"], "hello");
        assert!(value.get("metadata").is_none());
        assert!(value.get("capabilities_used").is_none());
    }

    #[test]
    fn test_agent_message_carries_reply_fields() {
        let reply = ChatReply {
            response: "hi there".to_string(),
            metadata: json!({"response_source": "openrouter"}),
            model_used: Some("gpt-4o".to_string()),
            capabilities_used: vec!["chat".to_string()],
        };
        let msg = Message::agent(1, AgentKind::General, reply);

        assert_eq!(msg.kind, MessageKind::Agent);
        assert_eq!(msg.content, "hi there");
        assert_eq!(msg.agent, Some(AgentKind::General));
        assert_eq!(msg.model_used.as_deref(), Some("gpt-4o"));

        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "agent");
        assert_eq!(value["agent"], "general");
        assert_eq!(value["metadata"]["response_source"], "openrouter");
    }

    #[test]
    fn test_message_deserializes_from_wire_shape() {
        let msg: Message = serde_json::from_value(json!({
            "id": 3,
            "type": "error",
            "content": "Error: boom",
            "timestamp": "2025-07-30T22:00:00+00:00"
        }))
        .unwrap();

        assert_eq!(msg.kind, MessageKind::Error);
        assert!(msg.agent.is_none());
        assert!(msg.capabilities_used.is_empty());
    }
}
