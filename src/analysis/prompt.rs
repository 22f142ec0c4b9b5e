use chrono::NaiveDate;

use crate::feed::text::truncate_chars;
use crate::feed::types::CanonicalContent;

use super::settings::AnalysisSettings;
use super::types::{AnalysisResult, Category, Item, Theme};

/// Builds the single user message sent to the model. Pure: same inputs, same prompt.
pub struct PromptBuilder<'a> {
    settings: &'a AnalysisSettings,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(settings: &'a AnalysisSettings) -> Self {
        Self { settings }
    }

    pub fn build(&self, content: &CanonicalContent, target: NaiveDate) -> String {
        let s = self.settings;
        let body = truncate_chars(&content.content, s.max_content_chars);

        let categories: String = s
            .categories
            .iter()
            .map(|c| format!("   - {} {} ({}): {}\n", c.icon, c.name, c.key, c.description))
            .collect();
        let keys = s.categories.iter().map(|c| c.key).collect::<Vec<_>>().join("/");

        let themes: String = s.themes.iter().map(|t| format!("   - {}: {} - {}\n", t.theme, t.name, t.description)).collect();
        let rules: String = s.themes.iter().map(|t| format!("   - {} -> {}\n", t.applies_to, t.theme)).collect();
        let theme_values = Theme::ALL.iter().map(Theme::as_str).collect::<Vec<_>>().join(", ");

        let example = self.example_json(target);

        format!(
            "You are a professional AI news analyst. Analyze the AI daily digest below in depth.

[Target date]
{target}

[Source content]
Title: {title}
Link: {link}

Full content:
{body}

---

[Tasks]

1. Status
   - If the content exists and is meaningful, set \"status\" to \"success\"
   - If the content is empty or meaningless, set \"status\" to \"empty\"

2. Summary (summary)
   - Write 3-5 of the most important AI news points of the day
   - Keep each point short, one sentence
   - Order them by importance

3. Categories (categories)
   Group the news into these categories (any may be left out):
{categories}
   Each category has:
   - key: one of {keys}
   - name: category name
   - icon: category icon
   - items: the news items in this category

   Each item has:
   - title: a short headline
   - summary: the key point in one sentence
   - url: related link, if any
   - tags: related tags such as company or product names

4. Keywords (keywords)
   - Extract 5-10 trending keywords: companies, people, technical terms, products
   - No duplicates, ordered by importance

5. Theme (theme)
   Pick exactly one of: {theme_values}
{themes}
   Mapping rule, by the dominant kind of content:
{rules}
[Output format]

Write all text values in {language}.
Output exactly one JSON object with this shape and nothing else:

```json
{example}
```

Important: output only the JSON object, with no other text. Make sure it is valid JSON.
",
            title = content.title,
            link = content.link,
            language = s.language,
        )
    }

    fn example_json(&self, target: NaiveDate) -> String {
        let s = self.settings;
        let mut sample = AnalysisResult::new(target, s.default_theme);
        sample.summary = vec![
            "First key point".to_string(),
            "Second key point".to_string(),
            "Third key point".to_string(),
        ];
        sample.keywords = ["Anthropic", "Google", "Claude", "MedGemma", "LangChain"]
            .into_iter()
            .map(str::to_string)
            .collect();
        sample.categories = s
            .categories
            .iter()
            .take(2)
            .enumerate()
            .map(|(i, c)| Category {
                key: c.key.to_string(),
                name: c.name.to_string(),
                icon: c.icon.to_string(),
                items: if i == 0 {
                    vec![Item {
                        title: "MedGemma 1.5 released".to_string(),
                        summary: "Google ships a 4B-parameter medical multimodal model with 3D imaging support".to_string(),
                        url: "https://news.smol.ai/issues/26-01-13-not-much/".to_string(),
                        tags: vec!["Google".to_string(), "MedGemma".to_string(), "Medical AI".to_string()],
                    }]
                } else {
                    Vec::new()
                },
            })
            .collect();
        // serializing a plain struct of strings cannot fail
        serde_json::to_string_pretty(&sample).unwrap_or_default()
    }
}
