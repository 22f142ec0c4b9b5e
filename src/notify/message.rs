use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

use super::Notice;

/// Links and page content a mail may refer to.
#[derive(Debug, Clone, Default)]
pub struct MailContext {
    /// Public URL of the day's page, when the site URL is known.
    pub page_url: Option<String>,
    /// Generated page HTML, inlined into success mails when readable.
    pub page_html: Option<String>,
    /// CI run that produced this notice.
    pub actions_url: Option<String>,
}

/// `https://github.com/<repo>/actions/runs/<id>` from the GitHub Actions environment.
pub fn actions_url(server: Option<&str>, repository: Option<&str>, run_id: Option<&str>) -> Option<String> {
    let (repo, run) = (repository?, run_id?);
    if repo.is_empty() || run.is_empty() {
        return None;
    }
    let server = server.filter(|s| !s.is_empty()).unwrap_or("https://github.com");
    Some(format!("{}/{repo}/actions/runs/{run}", server.trim_end_matches('/')))
}

pub fn subject(notice: &Notice) -> String {
    match notice {
        Notice::Success { date, .. } => format!("✅ AI Daily generated - {date}"),
        Notice::Empty { date, .. } => format!("📭 AI Daily has no data - {date}"),
        Notice::Failure { date, .. } => format!("❌ AI Daily failed - {date}"),
    }
}

pub fn html_body(notice: &Notice, ctx: &MailContext, now: DateTime<Utc>) -> String {
    let stamp = now.format("%Y-%m-%d %H:%M:%S");
    match notice {
        Notice::Success { date, summary_count } => {
            let content = match (&ctx.page_html, &ctx.page_url) {
                (Some(html), _) => inline_page(html),
                (None, Some(url)) => format!(
                    "<p>AI Daily was generated but could not be shown inline.</p>\n<p>{}</p>",
                    button(url, "Open the AI Daily page", "#42A5F5")
                ),
                (None, None) => "<p>AI Daily was generated.</p>".to_string(),
            };
            wrap(
                "#42A5F5, #1A3A52",
                "✅",
                "AI Daily generated",
                &format!("<p>Date: {date} | Highlights: {summary_count}</p>\n{content}"),
                &format!("Generated automatically at {stamp} UTC"),
            )
        }
        Notice::Empty { date, reason } => {
            let actions = ctx.actions_url.as_deref().map(|u| button(u, "View run log", "#FFA726")).unwrap_or_default();
            wrap(
                "#FFA726, #3D2415",
                "📭",
                "No news for this day",
                &format!(
                    "<p><strong>📅 Target date:</strong> {date}</p>\n<p><strong>📝 Reason:</strong> {}</p>\n{actions}",
                    text(reason)
                ),
                "Sent automatically by the scheduled run",
            )
        }
        Notice::Failure { date, error } => {
            let actions = ctx.actions_url.as_deref().map(|u| button(u, "🔍 View run log", "#E91E63")).unwrap_or_default();
            wrap(
                "#F06292, #C62828",
                "❌",
                "Generation failed",
                &format!(
                    "<p><strong>📅 Target date:</strong> {date}</p>\n<p><strong>⏰ Time:</strong> {stamp} UTC</p>\n<p><strong>Error:</strong></p>\n<pre style=\"background: #263238; color: #ECEFF1; padding: 16px; border-radius: 8px; overflow-x: auto;\">{}</pre>\n{actions}",
                    text(error)
                ),
                "Check the run log for details",
            )
        }
    }
}

fn button(url: &str, label: &str, color: &str) -> String {
    format!(
        "<a href=\"{}\" style=\"display: inline-block; padding: 12px 24px; background: {color}; color: white; text-decoration: none; border-radius: 8px;\">{}</a>",
        attr(url),
        text(label)
    )
}

fn wrap(gradient: &str, icon: &str, title: &str, inner: &str, footer: &str) -> String {
    format!(
        r#"<html>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 0; background: #f5f5f5;">
    <div style="max-width: 800px; margin: 0 auto; padding: 20px;">
        <div style="background: linear-gradient(135deg, {gradient}); padding: 30px; text-align: center; border-radius: 12px; margin-bottom: 20px;">
            <span style="font-size: 48px;">{icon}</span>
            <h1 style="color: white; margin: 16px 0 0; font-size: 24px;">{title}</h1>
        </div>
        <div style="background: white; padding: 20px; border-radius: 12px;">
{inner}
        </div>
        <div style="text-align: center; margin-top: 30px; color: #999; font-size: 12px;">
            <p>{footer}</p>
        </div>
    </div>
</body>
</html>
"#
    )
}

const MAIL_STYLES: &str = "<style>
body { background: #f5f5f5; }
.summary-card, .category-section { background: white; padding: 16px; border-radius: 12px; margin-bottom: 20px; }
.news-card { border: 1px solid #f0f0f0; padding: 12px; border-radius: 8px; margin-bottom: 12px; }
.news-title, .category-title, .section-title { color: #333; }
.news-summary, .summary-item { color: #666; }
.item-link { background: #42A5F5; color: white; padding: 4px 12px; border-radius: 6px; text-decoration: none; }
.tag { background: #f0f0f0; color: #666; padding: 2px 8px; border-radius: 4px; font-size: 12px; }
.background-glow, .geometric-lines { display: none; }
</style>";

/// Mail clients ignore external stylesheets; swap ours for a small inline block.
fn inline_page(html: &str) -> String {
    html.replace("<link rel=\"stylesheet\" href=\"css/styles.css\">", "")
        .replacen("</head>", &format!("{MAIL_STYLES}</head>"), 1)
}
