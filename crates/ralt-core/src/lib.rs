pub mod agent;
pub mod api;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod message;
pub mod session;

// Re-export main types for convenience
pub use agent::{AgentDescriptor, AgentKind};
pub use api::{AgentInfo, ApiClient, ChatBackend, ChatReply, HealthReport, RemoteAgent, StatusReport};
pub use config::Config;
pub use controller::Controller;
pub use error::{FailureCause, RequestFailed};
pub use message::{Message, MessageKind};
pub use session::{AgentStatus, PendingSend, Session};
