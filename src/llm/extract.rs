use serde_json::Value;

/// Pulls the model text out of a chat response body, whatever vendor shape it has.
/// Attempts are independent; the first non-empty string wins, the raw body is the floor.
pub fn model_text(body: &Value) -> String {
    openai_shape(body)
        .or_else(|| anthropic_shape(body))
        .or_else(|| top_level(body))
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

fn openai_shape(body: &Value) -> Option<&str> {
    non_empty(body.pointer("/choices/0/message/content"))
}

fn anthropic_shape(body: &Value) -> Option<&str> {
    non_empty(body.pointer("/content/0/text"))
}

fn top_level(body: &Value) -> Option<&str> {
    ["result", "text", "data"].into_iter().find_map(|k| non_empty(body.get(k)))
}

fn non_empty(v: Option<&Value>) -> Option<&str> {
    v.and_then(Value::as_str).filter(|s| !s.is_empty())
}
