use super::types::Theme;

const DEFAULT_MAX_CONTENT_CHARS: usize = 15_000;
const DEFAULT_LANGUAGE: &str = "English";

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySpec {
    pub key: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeSpec {
    pub theme: Theme,
    pub name: &'static str,
    pub description: &'static str,
    /// Kind of content that should select this theme.
    pub applies_to: &'static str,
}

pub const CATEGORIES: [CategorySpec; 6] = [
    CategorySpec { key: "model", name: "Model Releases", icon: "🤖", description: "new models, checkpoints and benchmark results" },
    CategorySpec { key: "product", name: "Product Updates", icon: "💼", description: "company news and product launches" },
    CategorySpec { key: "research", name: "Research", icon: "📚", description: "papers, datasets and academic results" },
    CategorySpec { key: "tools", name: "Tools & Frameworks", icon: "🛠️", description: "developer tools, libraries and frameworks" },
    CategorySpec { key: "funding", name: "Funding & Deals", icon: "💰", description: "investment rounds, acquisitions and partnerships" },
    CategorySpec { key: "events", name: "Industry Events", icon: "📅", description: "conferences, policy and community happenings" },
];

pub const THEMES: [ThemeSpec; 8] = [
    ThemeSpec { theme: Theme::Blue, name: "Soft Blue", description: "calm technical tone", applies_to: "models, frameworks, developer tools" },
    ThemeSpec { theme: Theme::Indigo, name: "Deep Indigo", description: "corporate tone", applies_to: "company news, product launches" },
    ThemeSpec { theme: Theme::Purple, name: "Elegant Purple", description: "creative tone", applies_to: "creative work, AIGC, design" },
    ThemeSpec { theme: Theme::Green, name: "Fresh Green", description: "health tone", applies_to: "medical and health AI" },
    ThemeSpec { theme: Theme::Orange, name: "Warm Orange", description: "attention tone", applies_to: "hot or controversial topics" },
    ThemeSpec { theme: Theme::Pink, name: "Rose Pink", description: "lifestyle tone", applies_to: "consumer apps and everyday use" },
    ThemeSpec { theme: Theme::Teal, name: "Cool Teal", description: "financial tone", applies_to: "funding, M&A, finance" },
    ThemeSpec { theme: Theme::Gray, name: "Neutral Gray", description: "academic tone", applies_to: "research, papers, data" },
];

/// Tables and knobs shared by the prompt builder, the response parser and the fallback policy.
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub categories: Vec<CategorySpec>,
    pub themes: Vec<ThemeSpec>,
    pub default_theme: Theme,
    pub max_content_chars: usize,
    pub language: String,
    /// Sole summary line when the model reply cannot be decoded.
    pub acquired_notice: String,
    /// Leading summary line of a transport-failure result.
    pub degraded_notice: String,
    /// Reason attached to the explicit empty result.
    pub empty_reason: String,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            categories: CATEGORIES.to_vec(),
            themes: THEMES.to_vec(),
            default_theme: Theme::Blue,
            max_content_chars: DEFAULT_MAX_CONTENT_CHARS,
            language: DEFAULT_LANGUAGE.to_string(),
            acquired_notice: "AI news retrieved".to_string(),
            degraded_notice: "AI news analysis hit a technical problem; showing a digest of the original content".to_string(),
            empty_reason: "content empty".to_string(),
        }
    }
}

impl AnalysisSettings {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(lang) = std::env::var("AI_DAILY_LANGUAGE") {
            if !lang.trim().is_empty() {
                cfg.language = lang.trim().to_string();
            }
        }
        if let Ok(max) = std::env::var("AI_DAILY_MAX_CONTENT_CHARS") {
            if let Ok(parsed) = max.parse::<usize>() {
                cfg.max_content_chars = parsed;
            }
        }
        cfg
    }

    pub fn category(&self, key: &str) -> Option<&CategorySpec> {
        self.categories.iter().find(|c| c.key == key)
    }

    pub fn theme(&self, theme: Theme) -> Option<&ThemeSpec> {
        self.themes.iter().find(|t| t.theme == theme)
    }
}
