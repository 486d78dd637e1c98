use serde_json::{json, Value as JsonValue};

use crate::ipc::error::{ok, toast};
use crate::ipc::helpers::*;
use crate::ipc::types::{AppState, Request};
use crate::linkage;
use crate::model::{Lesson, LessonStatus, PrivateLessonRequest, RequestStatus, Role, Subject};
use crate::scope;
use crate::seed;
use crate::store;

fn requests_list(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    let requests = load(st, store::PRIVATE_REQUESTS_KEY, seed::private_requests)?;
    let scope = scope::for_user(&user);
    let visible = scope::visible_requests(scope.as_ref(), requests.list());
    Ok(json!({ "requests": serde_json::to_value(&visible).unwrap_or_default() }))
}

fn requests_submit(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    require_student(&user)?;

    let teacher_id = required_str(params, "teacherId")?;
    let subject: Subject = required_enum(params, "subject")?;
    let preferred_date = required_str(params, "preferredDate")?;
    let reason = required_str(params, "reason")?;
    let start_time = opt_str(params, "preferredStartTime")?.unwrap_or_else(|| "10:00".into());
    let end_time = opt_str(params, "preferredEndTime")?.unwrap_or_else(|| "11:00".into());

    let users = seed::users();
    let teacher = linkage::find_user(&users, &teacher_id)
        .filter(|u| u.role == Role::Teacher)
        .ok_or_else(|| HandlerErr::bad_params(format!("{} is not a teacher", teacher_id)))?;

    let request = PrivateLessonRequest {
        id: new_id(),
        student_id: user.id.clone(),
        student_name: user.name.clone(),
        teacher_id,
        teacher_name: teacher.name.clone(),
        subject,
        preferred_date,
        preferred_start_time: start_time,
        preferred_end_time: end_time,
        reason,
        status: RequestStatus::Pending,
        response_note: None,
        created_at: now_ts(),
        responded_at: None,
    };

    let mut requests = load(st, store::PRIVATE_REQUESTS_KEY, seed::private_requests)?;
    requests.push(request.clone());
    requests.save(st)?;

    Ok(json!({
        "request": serde_json::to_value(&request).unwrap_or_default(),
        "toast": toast("success", "개인 레슨 신청이 완료되었습니다."),
    }))
}

/// Approval is one intent with two effects: the request turns terminal and
/// exactly one private lesson appears, times copied verbatim. Both slots
/// flush in a single transaction so a failure leaves neither changed. Only
/// a pending request is approvable; re-approval is a conflict, not a
/// second lesson.
fn requests_approve(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    require_staff(&user)?;
    let request_id = required_str(params, "requestId")?;

    let mut requests = load(st, store::PRIVATE_REQUESTS_KEY, seed::private_requests)?;
    let pending = requests
        .find(&request_id)
        .ok_or_else(|| HandlerErr::not_found("request not found"))?
        .clone();
    // Teachers decide only requests addressed to them; the pending guard
    // itself lives in the transition so a decided request conflicts.
    if user.role == Role::Teacher && pending.teacher_id != user.id {
        return Err(HandlerErr::forbidden("request not addressed to this user"));
    }

    requests
        .try_update(&request_id, |r| r.approve(now_ts()))
        .ok_or_else(|| HandlerErr::not_found("request not found"))??;

    let classes = load(st, store::CLASSES_KEY, seed::classes)?;
    let backing = linkage::class_for_request(classes.list(), &pending);

    let lesson = Lesson {
        id: new_id(),
        class_id: backing.map(|c| c.id.clone()),
        class_name: backing.map(|c| c.name.clone()),
        date: pending.preferred_date.clone(),
        start_time: pending.preferred_start_time.clone(),
        end_time: pending.preferred_end_time.clone(),
        location: "개인연습실".into(),
        status: LessonStatus::Scheduled,
        subject: pending.subject,
        memo: None,
        teacher_id: pending.teacher_id.clone(),
        teacher_name: pending.teacher_name.clone(),
        is_private: true,
        private_student_ids: Some(vec![pending.student_id.clone()]),
        request_id: Some(pending.id.clone()),
    };

    let mut lessons = load(st, store::LESSONS_KEY, seed::lessons)?;
    lessons.push(lesson.clone());

    st.put_many(&[requests.staged()?, lessons.staged()?])?;

    Ok(json!({
        "request": requests.find(&request_id).map(serde_json::to_value).and_then(Result::ok).unwrap_or_default(),
        "lesson": serde_json::to_value(&lesson).unwrap_or_default(),
        "toast": toast("success", format!("{} 학생의 개인 레슨을 승인했습니다.", pending.student_name)),
    }))
}

fn requests_reject(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    require_staff(&user)?;
    let request_id = required_str(params, "requestId")?;
    let note = opt_str(params, "responseNote")?;

    let mut requests = load(st, store::PRIVATE_REQUESTS_KEY, seed::private_requests)?;
    let pending = requests
        .find(&request_id)
        .ok_or_else(|| HandlerErr::not_found("request not found"))?
        .clone();
    if user.role == Role::Teacher && pending.teacher_id != user.id {
        return Err(HandlerErr::forbidden("request not addressed to this user"));
    }

    requests
        .try_update(&request_id, |r| r.reject(note, now_ts()))
        .ok_or_else(|| HandlerErr::not_found("request not found"))??;
    requests.save(st)?;

    Ok(json!({
        "request": requests.find(&request_id).map(serde_json::to_value).and_then(Result::ok).unwrap_or_default(),
        "toast": toast("success", "개인 레슨 신청을 거절했습니다."),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "requests.list" => requests_list(state, &req.params),
        "requests.submit" => requests_submit(state, &req.params),
        "requests.approve" => requests_approve(state, &req.params),
        "requests.reject" => requests_reject(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
