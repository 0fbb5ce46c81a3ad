//! Static display catalogs shared by every front end.
//!
//! These tables never change at runtime; front ends read them directly.

/// Kind of output the backend can be asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputType {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub accent: &'static str,
}

/// Prompt category with the number of curated prompts it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub count: u32,
}

/// Application colour palette, `#RRGGBB` strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub background: &'static str,
    pub surface: &'static str,
}

pub const THEME: Theme = Theme {
    primary: "#8B5CF6",
    secondary: "#EC4899",
    background: "#0F172A",
    surface: "#1E293B",
};

pub const OUTPUT_TYPES: [OutputType; 8] = [
    OutputType { id: "quality", name: "Quality", icon: "⭐", accent: "#EAB308" },
    OutputType { id: "image", name: "Image", icon: "🖼", accent: "#EF4444" },
    OutputType { id: "slides", name: "Slides", icon: "📊", accent: "#14B8A6" },
    OutputType { id: "webpage", name: "Webpage", icon: "🌐", accent: "#3B82F6" },
    OutputType { id: "visualization", name: "Visualization", icon: "📈", accent: "#22C55E" },
    OutputType { id: "playbook", name: "Playbook", icon: "📋", accent: "#F59E0B" },
    OutputType { id: "video", name: "Video", icon: "🎥", accent: "#A855F7" },
    OutputType { id: "audio", name: "Audio", icon: "🎵", accent: "#06B6D4" },
];

pub const CATEGORIES: [Category; 7] = [
    Category { id: "recommend", name: "Recommend", count: 24 },
    Category { id: "featured", name: "Featured", count: 18 },
    Category { id: "research", name: "Research", count: 32 },
    Category { id: "data", name: "Data", count: 28 },
    Category { id: "edu", name: "Edu", count: 15 },
    Category { id: "productivity", name: "Productivity", count: 22 },
    Category { id: "programming", name: "Programming", count: 31 },
];

/// Parse a `#RRGGBB` string into its components.
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}
