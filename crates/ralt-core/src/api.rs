//! HTTP client for the agent backend.
//!
//! Every operation goes through [`ApiClient::request`], which applies one
//! failure policy: a transport error, a non-success status or a body that
//! does not decode all become [`RequestFailed`]. There is no retry and no
//! status-specific handling.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, error};

use crate::agent::AgentKind;
use crate::config::Config;
use crate::error::{ApiResult, RequestFailed};
use crate::message::Message;

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    agent_type: &'a str,
    context: &'a [Message],
}

/// Successful reply to a chat message
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub metadata: Value,
    #[serde(default)]
    pub model_used: Option<String>,
    #[serde(default)]
    pub capabilities_used: Vec<String>,
}

/// The backend's description of one agent
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct AgentInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// One entry of the agent listing, keyed by the backend's identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAgent {
    pub id: String,
    pub info: AgentInfo,
}

impl RemoteAgent {
    /// The matching local agent, if the identifier is one we know
    pub fn kind(&self) -> Option<AgentKind> {
        AgentKind::parse(&self.id)
    }
}

#[derive(Deserialize)]
struct AgentsResponse {
    #[serde(default)]
    agents: BTreeMap<String, AgentInfo>,
}

#[derive(Deserialize)]
struct AgentResponse {
    agent: AgentInfo,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct StatusReport {
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct HealthReport {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// Per-call options merged over the client defaults
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Self::default()
        }
    }
}

/// Anything that can answer a chat message. Lets the controller run against
/// the real backend or an in-process stand-in.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send_message(
        &self,
        text: &str,
        agent: AgentKind,
        context: &[Message],
    ) -> ApiResult<ChatReply>;

    /// Address shown to the user when a request fails
    fn base_url(&self) -> &str;
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build a client honoring the configured timeout. Falls back to no
    /// timeout if the HTTP client cannot be built with one.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Self {
        let client = match timeout {
            Some(t) => Client::builder().timeout(t).build().unwrap_or_else(|e| {
                error!("Could not apply request timeout: {}", e);
                Client::new()
            }),
            None => Client::new(),
        };

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_timeout(&config.base_url(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    /// Shared request primitive for every endpoint.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, endpoint);

        let mut headers = Self::default_headers();
        headers.extend(options.headers);

        debug!(method = %options.method, %url, "Sending backend request");

        let mut builder = self
            .client
            .request(options.method, &url)
            .headers(headers);
        if let Some(body) = &options.body {
            builder = builder.body(body.to_string());
        }

        let result = async {
            let response = builder
                .send()
                .await
                .map_err(|e| RequestFailed::from_reqwest(endpoint, e))?;

            if !response.status().is_success() {
                return Err(RequestFailed::status(endpoint, response.status().as_u16()));
            }

            response
                .json::<T>()
                .await
                .map_err(|e| RequestFailed::from_reqwest(endpoint, e))
        }
        .await;

        if let Err(e) = &result {
            error!(endpoint, cause = ?e.cause, "API request failed: {}", e);
        }
        result
    }

    pub async fn send_message(
        &self,
        text: &str,
        agent: AgentKind,
        context: &[Message],
    ) -> ApiResult<ChatReply> {
        let body = ChatRequest {
            message: text,
            agent_type: agent.as_str(),
            context,
        };
        let body = serde_json::to_value(&body)
            .map_err(|e| RequestFailed::decode("/api/chat", e))?;

        self.request("/api/chat", RequestOptions::post(body)).await
    }

    /// Agents known to the backend, in the client's display order with
    /// unrecognized identifiers last.
    pub async fn get_agents(&self) -> ApiResult<Vec<RemoteAgent>> {
        let response: AgentsResponse = self.request("/api/agents", RequestOptions::get()).await?;

        let mut agents: Vec<RemoteAgent> = response
            .agents
            .into_iter()
            .map(|(id, info)| RemoteAgent { id, info })
            .collect();
        // BTreeMap already yields ids alphabetically; the sort is stable
        agents.sort_by_key(|a| a.kind().map(|k| k.index()).unwrap_or(usize::MAX));

        Ok(agents)
    }

    pub async fn get_agent_capabilities(&self, agent: &str) -> ApiResult<Vec<String>> {
        let endpoint = format!("/api/agent/{}/capabilities", agent);
        let response: AgentResponse = self.request(&endpoint, RequestOptions::get()).await?;
        Ok(response.agent.capabilities)
    }

    pub async fn get_status(&self) -> ApiResult<StatusReport> {
        self.request("/api/status", RequestOptions::get()).await
    }

    pub async fn health_check(&self) -> ApiResult<HealthReport> {
        self.request("/api/health", RequestOptions::get()).await
    }
}

#[async_trait]
impl ChatBackend for ApiClient {
    async fn send_message(
        &self,
        text: &str,
        agent: AgentKind,
        context: &[Message],
    ) -> ApiResult<ChatReply> {
        ApiClient::send_message(self, text, agent, context).await
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
