use serde_json::{json, Value as JsonValue};

use crate::ipc::error::{ok, toast};
use crate::ipc::helpers::*;
use crate::ipc::types::{AppState, Request};
use crate::model::{Answer, AnswerAuthor, Question};
use crate::seed;
use crate::store;

fn qna_list(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let _ = acting_user(params)?;
    let questions = load(st, store::QNA_KEY, seed::questions)?;
    // The board is shared: every role reads every question.
    Ok(json!({ "questions": serde_json::to_value(questions.list()).unwrap_or_default() }))
}

fn qna_view(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let _ = acting_user(params)?;
    let question_id = required_str(params, "questionId")?;

    let mut questions = load(st, store::QNA_KEY, seed::questions)?;
    if !questions.update(&question_id, |q| q.views += 1) {
        return Err(HandlerErr::not_found("question not found"));
    }
    questions.save(st)?;

    Ok(json!({
        "question": questions.find(&question_id).map(serde_json::to_value).and_then(Result::ok).unwrap_or_default(),
    }))
}

fn qna_ask(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    let title = required_str(params, "title")?;
    let content = required_str(params, "content")?;

    let question = Question {
        id: new_id(),
        title,
        content,
        author_id: user.id.clone(),
        author_name: user.name.clone(),
        date: now_ts(),
        answers: vec![],
        views: 0,
    };

    let mut questions = load(st, store::QNA_KEY, seed::questions)?;
    questions.push_front(question.clone());
    questions.save(st)?;

    Ok(json!({
        "question": serde_json::to_value(&question).unwrap_or_default(),
        "toast": toast("success", "질문이 등록되었습니다."),
    }))
}

fn qna_answer(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    let question_id = required_str(params, "questionId")?;
    let content = required_str(params, "content")?;

    let answer = Answer {
        id: new_id(),
        content,
        author_name: user.name.clone(),
        author_role: user.role.into(),
        date: now_ts(),
        is_ai: Some(false),
    };

    let mut questions = load(st, store::QNA_KEY, seed::questions)?;
    if !questions.update(&question_id, |q| q.answers.push(answer.clone())) {
        return Err(HandlerErr::not_found("question not found"));
    }
    questions.save(st)?;

    Ok(json!({
        "answer": serde_json::to_value(&answer).unwrap_or_default(),
        "toast": toast("success", "답변이 등록되었습니다."),
    }))
}

/// Appends an AI-tagged answer through the same shape a human answer takes.
fn qna_ai_answer(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let _ = acting_user(params)?;
    let question_id = required_str(params, "questionId")?;

    let mut questions = load(st, store::QNA_KEY, seed::questions)?;
    let content = questions
        .find(&question_id)
        .ok_or_else(|| HandlerErr::not_found("question not found"))?
        .content
        .clone();

    let reply = state.advisor.tutor_answer(&content).map_err(|e| {
        HandlerErr::new("advisor_failed", e.to_string())
            .with_toast("AI 답변 생성 중 오류가 발생했습니다.")
    })?;

    let answer = Answer {
        id: new_id(),
        content: reply,
        author_name: "Muse AI".into(),
        author_role: AnswerAuthor::Ai,
        date: now_ts(),
        is_ai: Some(true),
    };
    questions.update(&question_id, |q| q.answers.push(answer.clone()));
    questions.save(st)?;

    Ok(json!({
        "answer": serde_json::to_value(&answer).unwrap_or_default(),
        "toast": toast("success", "AI 답변이 생성되었습니다."),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "qna.list" => qna_list(state, &req.params),
        "qna.view" => qna_view(state, &req.params),
        "qna.ask" => qna_ask(state, &req.params),
        "qna.answer" => qna_answer(state, &req.params),
        "qna.aiAnswer" => qna_ai_answer(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
