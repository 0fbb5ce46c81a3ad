use crate::api::ChatBackend;
use crate::session::Session;

/// Drives a [`Session`] against a [`ChatBackend`], awaiting each request in
/// place. Suited to one-shot and scripted use; the TUI runs the same
/// transitions without blocking its event loop.
pub struct Controller<B: ChatBackend> {
    session: Session,
    backend: B,
}

impl<B: ChatBackend> Controller<B> {
    pub fn new(backend: B) -> Self {
        let session = Session::new(backend.base_url());
        Self { session, backend }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Send the current draft and wait for it to settle. Returns `false` when
    /// the draft was rejected and no request was issued.
    pub async fn handle_send(&mut self) -> bool {
        let Some(pending) = self.session.begin_send() else {
            return false;
        };

        let outcome = self
            .backend
            .send_message(&pending.text, pending.agent, &pending.context)
            .await;
        self.session.settle(outcome);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentKind;
    use crate::api::ChatReply;
    use crate::error::{ApiResult, RequestFailed};
    use crate::message::{Message, MessageKind};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Records every call and answers with a canned outcome
    struct FakeBackend {
        outcome: ApiResult<ChatReply>,
        calls: AtomicUsize,
        last_context: Mutex<Vec<Message>>,
    }

    impl FakeBackend {
        fn new(outcome: ApiResult<ChatReply>) -> Self {
            Self {
                outcome,
                calls: AtomicUsize::new(0),
                last_context: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatBackend for FakeBackend {
        async fn send_message(
            &self,
            _text: &str,
            _agent: AgentKind,
            context: &[Message],
        ) -> ApiResult<ChatReply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_context.lock().unwrap() = context.to_vec();
            self.outcome.clone()
        }

        fn base_url(&self) -> &str {
            "http://localhost:5001"
        }
    }

    fn hi_there() -> ApiResult<ChatReply> {
        Ok(ChatReply {
            response: "hi there".to_string(),
            metadata: json!({}),
            model_used: Some("x".to_string()),
            capabilities_used: vec![],
        })
    }

    #[tokio::test]
    async fn test_hello_scenario() {
        let mut controller = Controller::new(FakeBackend::new(hi_there()));
        controller.session_mut().set_draft("hello");

        assert!(controller.handle_send().await);

        let log = controller.session().messages();
        assert_eq!(log.len(), 2);
        assert_eq!((log[0].kind, log[0].content.as_str()), (MessageKind::User, "hello"));
        assert_eq!((log[1].kind, log[1].content.as_str()), (MessageKind::Agent, "hi there"));
        assert!(!controller.session().is_processing());
    }

    #[tokio::test]
    async fn test_server_error_scenario() {
        let failing = FakeBackend::new(Err(RequestFailed::status("/api/chat", 500)));
        let mut controller = Controller::new(failing);
        controller.session_mut().set_draft("hello");

        assert!(controller.handle_send().await);

        let log = controller.session().messages();
        assert_eq!(log.len(), 2);
        assert_eq!(log[1].kind, MessageKind::Error);
        let content = &log[1].content;
        assert!(content.starts_with("Error:"));
        let http = content.find("http").unwrap();
        assert!(content[http..].contains("5001"));
        assert!(!controller.session().is_processing());
    }

    #[tokio::test]
    async fn test_whitespace_issues_no_request() {
        let mut controller = Controller::new(FakeBackend::new(hi_there()));
        controller.session_mut().set_draft("   ");

        assert!(!controller.handle_send().await);

        assert!(controller.session().messages().is_empty());
        assert_eq!(controller.backend().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_log_grows_by_two_per_round_trip() {
        let mut controller = Controller::new(FakeBackend::new(hi_there()));

        for (round, text) in ["a", "b", "c"].iter().enumerate() {
            controller.session_mut().set_draft(*text);
            controller.handle_send().await;
            assert_eq!(controller.session().messages().len(), (round + 1) * 2);
        }

        assert_eq!(controller.backend().calls.load(Ordering::SeqCst), 3);
        // third request carried the first two exchanges
        assert_eq!(controller.backend().last_context.lock().unwrap().len(), 4);
    }

    /// Backend that flags when it has been reached, then fails
    struct ObservingBackend {
        processing: Arc<AtomicBool>,
    }

    #[async_trait]
    impl ChatBackend for ObservingBackend {
        async fn send_message(
            &self,
            _text: &str,
            _agent: AgentKind,
            _context: &[Message],
        ) -> ApiResult<ChatReply> {
            self.processing.store(true, Ordering::SeqCst);
            Err(RequestFailed::transport("/api/chat", "connection refused"))
        }

        fn base_url(&self) -> &str {
            "http://localhost:5001"
        }
    }

    #[tokio::test]
    async fn test_processing_spans_exactly_the_request() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut controller = Controller::new(ObservingBackend {
            processing: flag.clone(),
        });
        controller.session_mut().set_draft("hello");

        // begin_send is what flips the status; do it by hand to look inside
        let pending = controller.session_mut().begin_send().unwrap();
        assert!(controller.session().is_processing());

        let outcome = controller
            .backend()
            .send_message(&pending.text, pending.agent, &pending.context)
            .await;
        assert!(flag.load(Ordering::SeqCst));
        assert!(controller.session().is_processing());

        controller.session_mut().settle(outcome);
        assert!(!controller.session().is_processing());
    }
}
