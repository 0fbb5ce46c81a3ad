//! Session state and its transitions.
//!
//! The session owns the selected agent, the draft, the ready/processing
//! status and the append-only message log. Transitions are plain
//! synchronous methods; performing the network call is left to the caller
//! (see [`crate::controller::Controller`] or the TUI event loop), which feeds
//! the outcome back through [`Session::settle`].

use tracing::{info, warn};

use crate::agent::AgentKind;
use crate::api::ChatReply;
use crate::error::RequestFailed;
use crate::message::{Message, MessageIdGen};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentStatus {
    #[default]
    Ready,
    Processing,
}

impl AgentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            AgentStatus::Ready => "Ready",
            AgentStatus::Processing => "Processing...",
        }
    }
}

/// A request accepted by [`Session::begin_send`] and not yet settled
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSend {
    pub text: String,
    pub agent: AgentKind,
    /// Log as it was before the user message was appended
    pub context: Vec<Message>,
}

/// Convert a char index to a byte index for UTF-8 safe edits
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[derive(Debug, Clone)]
pub struct Session {
    selected_agent: AgentKind,
    draft: String,
    cursor: usize, // char position in draft
    status: AgentStatus,
    messages: Vec<Message>,
    ids: MessageIdGen,
    backend_url: String,
    // agent the outstanding request was sent to
    pending_agent: Option<AgentKind>,
}

impl Session {
    pub fn new(backend_url: &str) -> Self {
        Self {
            selected_agent: AgentKind::DEFAULT,
            draft: String::new(),
            cursor: 0,
            status: AgentStatus::Ready,
            messages: Vec::new(),
            ids: MessageIdGen::new(),
            backend_url: backend_url.to_string(),
            pending_agent: None,
        }
    }

    pub fn selected_agent(&self) -> AgentKind {
        self.selected_agent
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn status(&self) -> AgentStatus {
        self.status
    }

    pub fn is_processing(&self) -> bool {
        self.status == AgentStatus::Processing
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    /// Whether `begin_send` would accept the current draft
    pub fn can_send(&self) -> bool {
        !self.is_processing() && !self.draft.trim().is_empty()
    }

    /// Switch agents. The log is left alone, and an outstanding request keeps
    /// the agent it was sent with.
    pub fn select_agent(&mut self, agent: AgentKind) {
        if agent != self.selected_agent {
            info!(from = %self.selected_agent, to = %agent, "Agent selected");
            self.selected_agent = agent;
        }
    }

    pub fn select_next_agent(&mut self) {
        let all = AgentKind::all();
        let i = (self.selected_agent.index() + 1).min(all.len() - 1);
        self.select_agent(all[i]);
    }

    pub fn select_prev_agent(&mut self) {
        let all = AgentKind::all();
        let i = self.selected_agent.index().saturating_sub(1);
        self.select_agent(all[i]);
    }

    // Draft editing

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
        self.cursor = self.draft.chars().count();
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.draft, self.cursor);
        self.draft.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn delete_back(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.draft, self.cursor);
            self.draft.remove(byte_pos);
        }
    }

    pub fn delete_forward(&mut self) {
        if self.cursor < self.draft.chars().count() {
            let byte_pos = char_to_byte_index(&self.draft, self.cursor);
            self.draft.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.draft.chars().count());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.draft.chars().count();
    }

    /// Accept the draft for sending.
    ///
    /// Returns `None` without touching any state when the draft is blank or a
    /// request is already outstanding. Otherwise appends the user message,
    /// clears the draft, enters `Processing` and returns what to send.
    pub fn begin_send(&mut self) -> Option<PendingSend> {
        if self.draft.trim().is_empty() {
            return None;
        }
        if self.is_processing() {
            warn!("Send ignored: a request is already in flight");
            return None;
        }

        let context = self.messages.clone();
        let text = std::mem::take(&mut self.draft);
        self.cursor = 0;

        let id = self.ids.next_id();
        self.messages.push(Message::user(id, text.clone()));
        self.status = AgentStatus::Processing;
        self.pending_agent = Some(self.selected_agent);

        info!(agent = %self.selected_agent, context_len = context.len(), "Message sent");

        Some(PendingSend {
            text,
            agent: self.selected_agent,
            context,
        })
    }

    /// Record the outcome of the outstanding request and return to `Ready`.
    /// Ignored when nothing is outstanding.
    pub fn settle(&mut self, outcome: Result<ChatReply, RequestFailed>) {
        if !self.is_processing() {
            warn!("Settle ignored: no request in flight");
            return;
        }

        let id = self.ids.next_id();
        let message = match outcome {
            Ok(reply) => {
                let agent = self.pending_agent.unwrap_or(self.selected_agent);
                Message::agent(id, agent, reply)
            }
            Err(err) => Message::error(id, self.failure_text(&err)),
        };
        self.messages.push(message);

        self.status = AgentStatus::Ready;
        self.pending_agent = None;
        info!(log_len = self.messages.len(), "Request settled");
    }

    /// User-facing text for a failed request
    pub fn failure_text(&self, err: &RequestFailed) -> String {
        format!(
            "Error: {}. Check that the backend is running at {}",
            err, self.backend_url
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageKind;
    use serde_json::json;

    const URL: &str = "http://localhost:5001";

    fn reply(text: &str) -> ChatReply {
        ChatReply {
            response: text.to_string(),
            metadata: json!({}),
            model_used: Some("x".to_string()),
            capabilities_used: Vec::new(),
        }
    }

    #[test]
    fn test_successful_round_trip() {
        let mut session = Session::new(URL);
        session.set_draft("hello");

        let pending = session.begin_send().unwrap();
        assert_eq!(pending.text, "hello");
        assert_eq!(pending.agent, AgentKind::General);
        assert!(pending.context.is_empty());
        assert!(session.is_processing());
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.draft(), "");

        session.settle(Ok(reply("hi there")));

        assert_eq!(session.status(), AgentStatus::Ready);
        let log = session.messages();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].kind, MessageKind::User);
        assert_eq!(log[0].content, "hello");
        assert_eq!(log[1].kind, MessageKind::Agent);
        assert_eq!(log[1].content, "hi there");
        assert_eq!(log[1].model_used.as_deref(), Some("x"));
        assert!(log[1].id > log[0].id);
    }

    #[test]
    fn test_failed_round_trip_appends_error_with_hint() {
        let mut session = Session::new(URL);
        session.set_draft("hello");
        session.begin_send().unwrap();

        session.settle(Err(RequestFailed::status("/api/chat", 500)));

        assert!(!session.is_processing());
        let log = session.messages();
        assert_eq!(log.len(), 2);
        assert_eq!(log[1].kind, MessageKind::Error);
        assert!(log[1].content.starts_with("Error: HTTP error! status: 500"));
        assert!(log[1].content.contains("http://localhost:5001"));
    }

    #[test]
    fn test_blank_draft_is_noop() {
        for draft in ["", "   ", "\t\n "] {
            let mut session = Session::new(URL);
            session.set_draft(draft);

            assert!(!session.can_send());
            assert!(session.begin_send().is_none());
            assert!(session.messages().is_empty());
            assert_eq!(session.status(), AgentStatus::Ready);
        }
    }

    #[test]
    fn test_send_while_processing_is_refused() {
        let mut session = Session::new(URL);
        session.set_draft("first");
        session.begin_send().unwrap();

        session.set_draft("second");
        assert!(!session.can_send());
        assert!(session.begin_send().is_none());
        assert_eq!(session.messages().len(), 1);
        // draft is kept for after the request settles
        assert_eq!(session.draft(), "second");
    }

    #[test]
    fn test_settle_without_request_is_ignored() {
        let mut session = Session::new(URL);
        session.settle(Ok(reply("stray")));
        assert!(session.messages().is_empty());
    }

    #[test]
    fn test_context_is_prior_log() {
        let mut session = Session::new(URL);
        session.set_draft("one");
        session.begin_send().unwrap();
        session.settle(Ok(reply("reply one")));

        session.set_draft("two");
        let pending = session.begin_send().unwrap();

        assert_eq!(pending.context.len(), 2);
        assert_eq!(pending.context[0].content, "one");
        assert_eq!(pending.context[1].content, "reply one");
        assert_eq!(session.messages().len(), 3);
    }

    #[test]
    fn test_select_agent_keeps_log() {
        let mut session = Session::new(URL);
        session.set_draft("hello");
        session.begin_send().unwrap();
        session.settle(Ok(reply("hi")));
        let before = session.messages().to_vec();

        session.select_agent(AgentKind::Research);

        assert_eq!(session.selected_agent(), AgentKind::Research);
        assert_eq!(session.messages(), before.as_slice());
    }

    #[test]
    fn test_reply_is_attributed_to_sending_agent() {
        let mut session = Session::new(URL);
        session.select_agent(AgentKind::Code);
        session.set_draft("fix this");
        session.begin_send().unwrap();

        session.select_agent(AgentKind::Creative);
        session.settle(Ok(reply("done")));

        assert_eq!(session.messages()[1].agent, Some(AgentKind::Code));
        assert_eq!(session.selected_agent(), AgentKind::Creative);
    }

    #[test]
    fn test_agent_navigation_clamps() {
        let mut session = Session::new(URL);
        session.select_prev_agent();
        assert_eq!(session.selected_agent(), AgentKind::General);

        for _ in 0..10 {
            session.select_next_agent();
        }
        assert_eq!(session.selected_agent(), AgentKind::Creative);
    }

    #[test]
    fn test_draft_editing_is_utf8_safe() {
        let mut session = Session::new(URL);
        for c in "héllo".chars() {
            session.insert_char(c);
        }
        assert_eq!(session.cursor(), 5);

        session.cursor_left();
        session.cursor_left();
        session.delete_back();
        assert_eq!(session.draft(), "hélo");

        session.cursor_home();
        session.delete_forward();
        assert_eq!(session.draft(), "élo");

        session.cursor_end();
        session.insert_char('!');
        assert_eq!(session.draft(), "élo!");

        session.cursor_right();
        assert_eq!(session.cursor(), 4);
    }
}
