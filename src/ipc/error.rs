use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

/// Transient status message for the UI toast channel. Not persisted;
/// distinct from the Notification inbox.
pub fn toast(kind: &str, message: impl Into<String>) -> serde_json::Value {
    json!({
        "kind": kind,
        "message": message.into(),
    })
}
