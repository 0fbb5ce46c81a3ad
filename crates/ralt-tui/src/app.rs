use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use ralt_core::error::ApiResult;
use ralt_core::{AgentKind, ApiClient, ChatReply, HealthReport, RequestFailed, Session};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Backend reachability as last observed by a health check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendHealth {
    Checking,
    Online(Option<String>), // reported version
    Offline,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub session: Session,
    pub client: ApiClient,

    // In-flight work
    pub request_task: Option<JoinHandle<ApiResult<ChatReply>>>,
    pub health_task: Option<JoinHandle<ApiResult<HealthReport>>>,
    pub backend_health: BackendHealth,

    // Chat view
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of the chat panel
    pub chat_width: u16,  // inner width, for wrap estimates
    pub agent_state: ListState,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub agents_area: Option<Rect>,
}

impl App {
    pub fn with_client(client: ApiClient) -> Self {
        let session = Session::new(client.base_url());

        let mut agent_state = ListState::default();
        agent_state.select(Some(session.selected_agent().index()));

        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            session,
            client,

            request_task: None,
            health_task: None,
            backend_health: BackendHealth::Checking,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            agent_state,

            animation_frame: 0,

            chat_area: None,
            agents_area: None,
        }
    }

    /// Kick off a background health check; the result lands on a later tick.
    pub fn start_health_check(&mut self) {
        if self.health_task.is_some() {
            return;
        }
        self.backend_health = BackendHealth::Checking;
        let client = self.client.clone();
        self.health_task = Some(tokio::spawn(async move { client.health_check().await }));
    }

    /// Send the draft if the session accepts it, running the request in the
    /// background so the UI keeps drawing.
    pub fn send(&mut self) {
        let Some(pending) = self.session.begin_send() else {
            return;
        };

        let client = self.client.clone();
        self.request_task = Some(tokio::spawn(async move {
            client
                .send_message(&pending.text, pending.agent, &pending.context)
                .await
        }));

        self.scroll_chat_to_bottom();
    }

    /// Settle finished background tasks. Called on every tick.
    pub async fn poll_tasks(&mut self) {
        if self.request_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.request_task.take() {
                let outcome = match task.await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!("Chat request task failed: {}", e);
                        Err(RequestFailed::transport("/api/chat", e))
                    }
                };
                self.session.settle(outcome);
                self.scroll_chat_to_bottom();
            }
        }

        if self.health_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.health_task.take() {
                self.backend_health = match task.await {
                    Ok(Ok(report)) => {
                        info!(status = ?report.status, "Backend is reachable");
                        BackendHealth::Online(report.version)
                    }
                    _ => BackendHealth::Offline,
                };
            }
        }
    }

    pub fn select_agent(&mut self, agent: AgentKind) {
        self.session.select_agent(agent);
        self.agent_state.select(Some(agent.index()));
    }

    pub fn agent_nav_down(&mut self) {
        self.session.select_next_agent();
        self.agent_state.select(Some(self.session.selected_agent().index()));
    }

    pub fn agent_nav_up(&mut self) {
        self.session.select_prev_agent();
        self.agent_state.select(Some(self.session.selected_agent().index()));
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.is_processing() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max = self.chat_line_count().saturating_sub(self.visible_height());
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_half_page_down(&mut self) {
        self.scroll_down((self.visible_height() / 2).max(1));
    }

    pub fn scroll_half_page_up(&mut self) {
        self.scroll_up((self.visible_height() / 2).max(1));
    }

    pub fn scroll_chat_to_top(&mut self) {
        self.chat_scroll = 0;
    }

    /// Scroll chat to bottom so the newest message (or the progress line) is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        self.chat_scroll = self
            .chat_line_count()
            .saturating_sub(self.visible_height());
    }

    fn visible_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }

    /// Number of chat rows as drawn, so scrolling can reach the last one
    pub fn chat_line_count(&self) -> u16 {
        // Width is unknown until the first draw
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let rows = ui::chat_lines(&self.session, self.animation_frame, wrap_width).len();
        u16::try_from(rows).unwrap_or(u16::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::with_client(ApiClient::new("http://localhost:5001"))
    }

    #[test]
    fn test_starts_in_editing_with_default_agent() {
        let app = app();
        assert_eq!(app.input_mode, InputMode::Editing);
        assert_eq!(app.session.selected_agent(), AgentKind::General);
        assert_eq!(app.agent_state.selected(), Some(0));
    }

    #[test]
    fn test_agent_nav_tracks_list_state() {
        let mut app = app();
        app.agent_nav_down();
        app.agent_nav_down();
        assert_eq!(app.session.selected_agent(), AgentKind::Web);
        assert_eq!(app.agent_state.selected(), Some(2));

        app.select_agent(AgentKind::Creative);
        assert_eq!(app.agent_state.selected(), Some(5));
    }

    #[test]
    fn test_blank_send_spawns_nothing() {
        let mut app = app();
        app.session.set_draft("  ");
        app.send();
        assert!(app.request_task.is_none());
        assert!(app.session.messages().is_empty());
    }

    #[test]
    fn test_line_count_wraps_long_content() {
        let mut app = app();
        app.chat_width = 20;
        app.session.set_draft("x".repeat(25));
        app.session.begin_send();

        // header + 2 rows of the split word + blank + 2 progress lines
        assert_eq!(app.chat_line_count(), 6);
    }

    #[tokio::test]
    async fn test_failed_request_settles_on_poll() {
        let mut app = App::with_client(ApiClient::new("http://127.0.0.1:9"));
        app.session.set_draft("hello");
        app.send();
        assert!(app.session.is_processing());

        while app.session.is_processing() {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            app.poll_tasks().await;
        }

        let log = app.session.messages();
        assert_eq!(log.len(), 2);
        assert!(log[1].content.starts_with("Error:"));
        assert!(log[1].content.contains("http://127.0.0.1:9"));
        assert!(app.request_task.is_none());
    }
}
