use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// `{ "success": false, "error": { "code": .., "message": .., "details": .. } }`
#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

/// Bodies the backend sends alongside an error status.
///
/// Some deployments wrap failures in `{ "success": false, "error": { .. } }`,
/// others answer with `{ "message": ".." }` or plain text.
pub fn error_message(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "Empty response from server".to_string();
    }

    if let Ok(envelope) = serde_json::from_str::<ApiErrorResponse>(trimmed) {
        return envelope.error.message;
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        if let Some(Value::String(message)) = map.get("message").or_else(|| map.get("error")) {
            return message.clone();
        }
    }

    trimmed.to_string()
}
