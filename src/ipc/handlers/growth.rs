use chrono::Utc;
use serde_json::{json, Value as JsonValue};

use crate::calendar;
use crate::ipc::error::{ok, toast};
use crate::ipc::helpers::*;
use crate::ipc::types::{AppState, Request};
use crate::linkage;
use crate::model::{
    ChecklistItem, CompetitionEvent, Evaluation, EventStatus, PortfolioComment, PortfolioItem,
    Role, Scores, Subject,
};
use crate::scope;
use crate::seed;
use crate::store;

fn evaluations_list(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    let subject_filter: Option<Subject> = match opt_str(params, "subject")? {
        Some(raw) => Some(
            serde_json::from_value(JsonValue::String(raw.clone()))
                .map_err(|_| HandlerErr::bad_params(format!("invalid subject: {}", raw)))?,
        ),
        None => None,
    };

    let evaluations = load(st, store::EVALUATIONS_KEY, seed::evaluations)?;
    let scope = scope::for_user(&user);
    let visible: Vec<&Evaluation> = evaluations
        .list()
        .iter()
        .filter(|e| scope.sees_student_record(&e.student_id))
        .filter(|e| subject_filter.map(|s| e.subject == s).unwrap_or(true))
        .collect();

    Ok(json!({ "evaluations": serde_json::to_value(&visible).unwrap_or_default() }))
}

fn parse_scores(params: &JsonValue) -> Result<Scores, HandlerErr> {
    let raw = params
        .get("scores")
        .cloned()
        .ok_or_else(|| HandlerErr::bad_params("missing scores"))?;
    let scores: Scores = serde_json::from_value(raw)
        .map_err(|_| HandlerErr::bad_params("scores must carry the five 1-5 dimensions"))?;
    for value in [
        scores.acting,
        scores.expression,
        scores.creativity,
        scores.teamwork,
        scores.effort,
    ] {
        if !(1..=5).contains(&value) {
            return Err(HandlerErr::bad_params("scores must be between 1 and 5"));
        }
    }
    Ok(scores)
}

fn evaluations_create(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    require_staff(&user)?;

    let student_id = required_str(params, "studentId")?;
    let subject: Subject = required_enum(params, "subject")?;
    let period = required_str(params, "period")?;
    let scores = parse_scores(params)?;
    let comment = opt_str(params, "comment")?.unwrap_or_default();
    let class_id = opt_str(params, "classId")?;

    let users = seed::users();
    let student = linkage::find_user(&users, &student_id)
        .filter(|u| u.role == Role::Student)
        .ok_or_else(|| HandlerErr::bad_params(format!("{} is not a student", student_id)))?;

    let classes = load(st, store::CLASSES_KEY, seed::classes)?;
    let class_name = class_id
        .as_deref()
        .and_then(|cid| linkage::find_class(classes.list(), cid))
        .map(|c| c.name.clone());

    let evaluation = Evaluation {
        id: new_id(),
        student_id,
        student_name: student.name.clone(),
        evaluator_id: user.id.clone(),
        evaluator_name: user.name.clone(),
        class_id,
        class_name,
        subject,
        period,
        scores,
        comment,
        date: today(),
    };

    let mut evaluations = load(st, store::EVALUATIONS_KEY, seed::evaluations)?;
    evaluations.push(evaluation.clone());
    evaluations.save(st)?;

    Ok(json!({
        "evaluation": serde_json::to_value(&evaluation).unwrap_or_default(),
        "toast": toast("success", "평가가 등록되었습니다."),
    }))
}

fn portfolios_list(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    let portfolios = load(st, store::PORTFOLIOS_KEY, seed::portfolios)?;
    let scope = scope::for_user(&user);
    let visible: Vec<&PortfolioItem> = portfolios
        .list()
        .iter()
        .filter(|p| scope.sees_student_record(&p.student_id))
        .collect();
    Ok(json!({ "portfolios": serde_json::to_value(&visible).unwrap_or_default() }))
}

fn portfolios_create(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    let title = required_str(params, "title")?;

    let tags = match params.get("tags") {
        None => Vec::new(),
        Some(v) if v.is_null() => Vec::new(),
        Some(v) => v
            .as_array()
            .ok_or_else(|| HandlerErr::bad_params("tags must be an array of strings"))?
            .iter()
            .filter_map(|t| t.as_str())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
    };

    let item = PortfolioItem {
        id: new_id(),
        student_id: user.id.clone(),
        student_name: user.name.clone(),
        title,
        description: opt_str(params, "description")?.unwrap_or_default(),
        video_url: opt_str(params, "videoUrl")?.unwrap_or_default(),
        category: opt_str(params, "category")?.unwrap_or_else(|| "기타".into()),
        tags,
        comments: vec![],
        date: today(),
    };

    let mut portfolios = load(st, store::PORTFOLIOS_KEY, seed::portfolios)?;
    portfolios.push(item.clone());
    portfolios.save(st)?;

    Ok(json!({
        "portfolio": serde_json::to_value(&item).unwrap_or_default(),
        "toast": toast("success", "포트폴리오가 등록되었습니다."),
    }))
}

fn portfolios_comment(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    let portfolio_id = required_str(params, "portfolioId")?;
    let content = required_str(params, "content")?;

    let comment = PortfolioComment {
        id: new_id(),
        author_id: user.id.clone(),
        author_name: user.name.clone(),
        content,
        date: today(),
    };

    let mut portfolios = load(st, store::PORTFOLIOS_KEY, seed::portfolios)?;
    if !portfolios.update(&portfolio_id, |p| p.comments.push(comment.clone())) {
        return Err(HandlerErr::not_found("portfolio not found"));
    }
    portfolios.save(st)?;

    Ok(json!({
        "comment": serde_json::to_value(&comment).unwrap_or_default(),
        "toast": toast("success", "댓글이 등록되었습니다."),
    }))
}

fn events_list(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let _ = acting_user(params)?;
    let events = load(st, store::EVENTS_KEY, seed::events)?;

    let now = Utc::now();
    let with_d_day = |e: &CompetitionEvent| -> JsonValue {
        let mut v = serde_json::to_value(e).unwrap_or_default();
        if let Some(date) = calendar::parse_date(&e.date) {
            v["dDay"] = json!(calendar::d_day(date, now));
        }
        v
    };

    let upcoming: Vec<JsonValue> = events
        .list()
        .iter()
        .filter(|e| matches!(e.status, EventStatus::Upcoming | EventStatus::Ongoing))
        .map(with_d_day)
        .collect();
    let past: Vec<JsonValue> = events
        .list()
        .iter()
        .filter(|e| e.status == EventStatus::Completed)
        .map(with_d_day)
        .collect();

    Ok(json!({ "upcoming": upcoming, "past": past }))
}

fn events_create(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    let title = required_str(params, "title")?;
    let date = required_str(params, "date")?;
    if calendar::parse_date(&date).is_none() {
        return Err(HandlerErr::bad_params("date must be YYYY-MM-DD"));
    }

    let event = CompetitionEvent {
        id: new_id(),
        title,
        date,
        location: opt_str(params, "location")?.unwrap_or_else(|| "미정".into()),
        status: EventStatus::Upcoming,
        description: opt_str(params, "description")?,
        creator_id: user.id.clone(),
        checklist: vec![],
        ai_prep_tips: None,
    };

    let mut events = load(st, store::EVENTS_KEY, seed::events)?;
    events.push(event.clone());
    events.save(st)?;

    Ok(json!({
        "event": serde_json::to_value(&event).unwrap_or_default(),
        "toast": toast("success", "대회/행사가 등록되었습니다."),
    }))
}

fn events_checklist_add(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let _ = acting_user(params)?;
    let event_id = required_str(params, "eventId")?;
    let text = required_str(params, "text")?;

    let item = ChecklistItem {
        id: new_id(),
        text,
        completed: false,
    };

    let mut events = load(st, store::EVENTS_KEY, seed::events)?;
    if !events.update(&event_id, |e| e.checklist.push(item.clone())) {
        return Err(HandlerErr::not_found("event not found"));
    }
    events.save(st)?;

    Ok(json!({ "item": serde_json::to_value(&item).unwrap_or_default() }))
}

fn events_checklist_toggle(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let _ = acting_user(params)?;
    let event_id = required_str(params, "eventId")?;
    let check_id = required_str(params, "checkId")?;

    let mut events = load(st, store::EVENTS_KEY, seed::events)?;
    let mut found = false;
    let event_known = events.update(&event_id, |e| {
        if let Some(item) = e.checklist.iter_mut().find(|c| c.id == check_id) {
            item.completed = !item.completed;
            found = true;
        }
    });
    if !event_known {
        return Err(HandlerErr::not_found("event not found"));
    }
    if !found {
        return Err(HandlerErr::not_found("checklist item not found"));
    }
    events.save(st)?;

    let item = events
        .find(&event_id)
        .and_then(|e| e.checklist.iter().find(|c| c.id == check_id))
        .map(serde_json::to_value);
    Ok(json!({ "item": item.and_then(Result::ok).unwrap_or_default() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "evaluations.list" => evaluations_list(state, &req.params),
        "evaluations.create" => evaluations_create(state, &req.params),
        "portfolios.list" => portfolios_list(state, &req.params),
        "portfolios.create" => portfolios_create(state, &req.params),
        "portfolios.comment" => portfolios_comment(state, &req.params),
        "events.list" => events_list(state, &req.params),
        "events.create" => events_create(state, &req.params),
        "events.checklistAdd" => events_checklist_add(state, &req.params),
        "events.checklistToggle" => events_checklist_toggle(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
