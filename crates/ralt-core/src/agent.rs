use serde::{Deserialize, Serialize};
use std::fmt;

/// Agent persona selectable in the client. Only a routing label for the
/// backend; no behavior lives on this side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    General,
    Vision,
    Web,
    Code,
    Research,
    Creative,
}

/// Static description of an agent, defined at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentDescriptor {
    pub kind: AgentKind,
    pub name: &'static str,
    pub description: &'static str,
    pub capabilities: &'static [&'static str],
    /// Accent colour as `#RRGGBB`
    pub accent: &'static str,
    /// Model the backend routes this agent to
    pub model: &'static str,
}

const AGENTS: [AgentDescriptor; 6] = [
    AgentDescriptor {
        kind: AgentKind::General,
        name: "General Chat",
        description: "General conversation and assistance",
        capabilities: &["chat", "qa", "general_assistance"],
        accent: "#3B82F6",
        model: "gpt-4o",
    },
    AgentDescriptor {
        kind: AgentKind::Vision,
        name: "Vision Agent",
        description: "Image and visual content analysis",
        capabilities: &["image_analysis", "ocr", "visual_qa"],
        accent: "#A855F7",
        model: "gpt-4o-vision",
    },
    AgentDescriptor {
        kind: AgentKind::Web,
        name: "Web Navigator",
        description: "Web navigation and automation",
        capabilities: &["web_scraping", "automation", "research"],
        accent: "#22C55E",
        model: "gpt-4o",
    },
    AgentDescriptor {
        kind: AgentKind::Code,
        name: "Code Assistant",
        description: "Programming and development",
        capabilities: &["code_generation", "debugging", "review"],
        accent: "#F97316",
        model: "deepseek-coder",
    },
    AgentDescriptor {
        kind: AgentKind::Research,
        name: "Research Agent",
        description: "Deep research and analysis",
        capabilities: &["deep_research", "data_analysis", "synthesis"],
        accent: "#6366F1",
        model: "claude-3.5-sonnet",
    },
    AgentDescriptor {
        kind: AgentKind::Creative,
        name: "Creative Agent",
        description: "Creative and multimedia content",
        capabilities: &["content_creation", "design", "storytelling"],
        accent: "#EC4899",
        model: "gpt-4o",
    },
];

impl AgentKind {
    pub const DEFAULT: AgentKind = AgentKind::General;

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::General => "general",
            AgentKind::Vision => "vision",
            AgentKind::Web => "web",
            AgentKind::Code => "code",
            AgentKind::Research => "research",
            AgentKind::Creative => "creative",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "general" => Some(AgentKind::General),
            "vision" => Some(AgentKind::Vision),
            "web" => Some(AgentKind::Web),
            "code" => Some(AgentKind::Code),
            "research" => Some(AgentKind::Research),
            "creative" => Some(AgentKind::Creative),
            _ => None,
        }
    }

    pub fn all() -> Vec<AgentKind> {
        AGENTS.iter().map(|a| a.kind).collect()
    }

    /// Position in the fixed display order
    pub fn index(&self) -> usize {
        AGENTS
            .iter()
            .position(|a| a.kind == *self)
            .unwrap_or_default()
    }

    pub fn descriptor(&self) -> &'static AgentDescriptor {
        &AGENTS[self.index()]
    }

    pub fn display_name(&self) -> &'static str {
        self.descriptor().name
    }
}

impl Default for AgentKind {
    fn default() -> Self {
        AgentKind::DEFAULT
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The full agent table in display order.
pub fn descriptors() -> &'static [AgentDescriptor] {
    &AGENTS
}
