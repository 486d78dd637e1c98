use serde_json::{json, Value as JsonValue};

use crate::ipc::error::ok;
use crate::ipc::helpers::*;
use crate::ipc::types::{AppState, Request};
use crate::seed;
use crate::store;

fn notifications_list(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let _ = acting_user(params)?;
    let notifications = load(st, store::NOTIFICATIONS_KEY, seed::notifications)?;
    let unread = notifications.list().iter().filter(|n| !n.read).count();
    Ok(json!({
        "notifications": serde_json::to_value(notifications.list()).unwrap_or_default(),
        "unreadCount": unread,
    }))
}

fn notifications_mark_all_read(
    state: &AppState,
    params: &JsonValue,
) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let _ = acting_user(params)?;
    let mut notifications = load(st, store::NOTIFICATIONS_KEY, seed::notifications)?;
    let ids: Vec<String> = notifications
        .list()
        .iter()
        .map(|n| n.id.clone())
        .collect();
    for id in ids {
        notifications.update(&id, |n| n.read = true);
    }
    notifications.save(st)?;
    Ok(json!({ "unreadCount": 0 }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "notifications.list" => notifications_list(state, &req.params),
        "notifications.markAllRead" => notifications_mark_all_read(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
