use crate::llm::LlmResponse;
use serde_json::{Map, Value};

/// Pull the JSON body out of model text that may carry markdown fences or
/// surrounding prose. Returns None when no object-shaped region exists.
pub fn extract_json(text: &str) -> Option<String> {
    let trimmed = text.trim();

    if let Some(rest) = trimmed.strip_prefix("```") {
        // ```json ... ``` or ``` ... ```: drop the fence line, then
        // everything from the closing fence on.
        let body = rest.split_once('\n').map_or(rest, |(_, b)| b);
        let body = body.rfind("```").map_or(body, |end| &body[..end]);
        return Some(body.trim().to_string());
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(trimmed[start..=end].trim().to_string())
}

/// Decode a response into a JSON object. A structured payload wins when the
/// transport provides one; otherwise the text body is parsed. Anything
/// unusable (decode failure, non-object payload) yields an empty map, never
/// an error, so every caller can apply its own fallback uniformly.
pub fn parse_object(response: &LlmResponse) -> Map<String, Value> {
    match response {
        LlmResponse::Structured(Value::Object(object)) => object.clone(),
        LlmResponse::Structured(_) => Map::new(),
        LlmResponse::Text(text) => {
            let candidate = extract_json(text).unwrap_or_else(|| text.trim().to_string());
            match serde_json::from_str::<Value>(&candidate) {
                Ok(Value::Object(object)) => object,
                _ => Map::new(),
            }
        }
    }
}
