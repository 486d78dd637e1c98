use serde_json::{json, Value as JsonValue};

use crate::ipc::error::{ok, toast};
use crate::ipc::handlers::classes::delete_class_cascade;
use crate::ipc::helpers::*;
use crate::ipc::types::{AppState, Request};
use crate::linkage;
use crate::model::ChatMessage;
use crate::scope;
use crate::seed;
use crate::store;

/// Channels are the classes the user belongs to, each with its latest
/// message as a preview.
fn chat_channels(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;

    let classes = load(st, store::CLASSES_KEY, seed::classes)?;
    let chats = load(st, store::CHATS_KEY, seed::chats)?;
    let scope = scope::for_user(&user);

    let channels: Vec<JsonValue> = scope::visible_classes(scope.as_ref(), classes.list())
        .into_iter()
        .map(|c| {
            let last = linkage::last_message(chats.list(), &c.id);
            json!({
                "classId": c.id,
                "name": c.name,
                "memberCount": c.student_ids.len(),
                "lastMessage": last.map(|m| json!({
                    "senderName": m.sender_name,
                    "content": m.content,
                    "timestamp": m.timestamp,
                })),
            })
        })
        .collect();

    Ok(json!({ "channels": channels }))
}

fn chat_history(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    let class_id = required_str(params, "classId")?;

    let classes = load(st, store::CLASSES_KEY, seed::classes)?;
    let class = linkage::find_class(classes.list(), &class_id)
        .ok_or_else(|| HandlerErr::not_found("class not found"))?;
    let scope = scope::for_user(&user);
    if !scope.sees_class(class) {
        return Err(HandlerErr::forbidden("not a member of this class"));
    }

    let chats = load(st, store::CHATS_KEY, seed::chats)?;
    let messages: Vec<&ChatMessage> = chats
        .list()
        .iter()
        .filter(|m| m.class_id == class_id)
        .collect();
    Ok(json!({ "messages": serde_json::to_value(&messages).unwrap_or_default() }))
}

fn chat_send(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    let class_id = required_str(params, "classId")?;
    let content = required_str(params, "content")?;

    let classes = load(st, store::CLASSES_KEY, seed::classes)?;
    let class = linkage::find_class(classes.list(), &class_id)
        .ok_or_else(|| HandlerErr::not_found("class not found"))?;
    let scope = scope::for_user(&user);
    if !scope.sees_class(class) {
        return Err(HandlerErr::forbidden("not a member of this class"));
    }

    let message = ChatMessage {
        id: new_id(),
        class_id,
        sender_id: user.id.clone(),
        sender_name: user.name.clone(),
        sender_role: user.role,
        content,
        timestamp: now_ts(),
        avatar: user.avatar.clone(),
    };

    let mut chats = load(st, store::CHATS_KEY, seed::chats)?;
    chats.push(message.clone());
    chats.save(st)?;

    Ok(json!({ "message": serde_json::to_value(&message).unwrap_or_default() }))
}

/// A student leaving drops off the roster; a staff member leaving
/// dissolves the class entirely, channel included.
fn chat_leave(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    let class_id = required_str(params, "classId")?;

    if user.role.is_staff() {
        delete_class_cascade(st, &class_id)?;
        return Ok(json!({
            "deletedClass": true,
            "toast": toast("success", "클래스 및 채팅방이 삭제되었습니다."),
        }));
    }

    let mut classes = load(st, store::CLASSES_KEY, seed::classes)?;
    let updated = classes.update(&class_id, |c| {
        c.student_ids.retain(|sid| sid != &user.id);
    });
    if !updated {
        return Err(HandlerErr::not_found("class not found"));
    }
    classes.save(st)?;

    Ok(json!({
        "deletedClass": false,
        "toast": toast("success", "채팅방에서 나갔습니다."),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "chat.channels" => chat_channels(state, &req.params),
        "chat.history" => chat_history(state, &req.params),
        "chat.send" => chat_send(state, &req.params),
        "chat.leave" => chat_leave(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
