use serde_json::{json, Value as JsonValue};

use crate::calendar;
use crate::ipc::error::{ok, toast};
use crate::ipc::helpers::*;
use crate::ipc::types::{AppState, Request};
use crate::linkage;
use crate::model::{Assignment, AssignmentStatus, Role};
use crate::scope;
use crate::seed;
use crate::store;

fn assignments_list(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    let date_filter = opt_str(params, "date")?;

    let assignments = load(st, store::ASSIGNMENTS_KEY, seed::assignments)?;
    let scope = scope::for_user(&user);
    let mut visible: Vec<&Assignment> = assignments
        .list()
        .iter()
        .filter(|a| scope.sees_student_record(&a.student_id))
        .collect();
    if let Some(date) = &date_filter {
        visible.retain(|a| &a.due_date == date);
    }
    visible.sort_by(|a, b| a.due_date.cmp(&b.due_date));

    Ok(json!({ "assignments": serde_json::to_value(&visible).unwrap_or_default() }))
}

fn assignments_calendar(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    let (year, month) = required_month(params)?;

    let assignments = load(st, store::ASSIGNMENTS_KEY, seed::assignments)?;
    let scope = scope::for_user(&user);
    let visible: Vec<Assignment> = assignments
        .list()
        .iter()
        .filter(|a| scope.sees_student_record(&a.student_id))
        .cloned()
        .collect();

    let grid = calendar::month_grid(year, month, &visible, |a| a.due_date.as_str())
        .ok_or_else(|| HandlerErr::bad_params("invalid year/month"))?;

    let days: Vec<JsonValue> = grid
        .days
        .iter()
        .map(|cell| {
            let dots: Vec<JsonValue> = cell
                .items
                .iter()
                .map(|a| json!({ "id": a.id, "status": a.status, "title": a.title }))
                .collect();
            // The celebration stamp: a day with work where everything due
            // is already submitted or graded.
            let all_complete =
                !cell.items.is_empty() && cell.items.iter().all(|a| a.status.is_settled());
            json!({
                "day": cell.day,
                "date": cell.date,
                "assignments": dots,
                "allComplete": all_complete,
            })
        })
        .collect();

    Ok(json!({
        "year": grid.year,
        "month": grid.month,
        "leadingBlanks": grid.leading_blanks,
        "days": days,
    }))
}

fn assignments_create(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    let title = required_str(params, "title")?;

    // Staff assign to a named student; a student logs their own entry.
    let (student_id, student_name) = if user.role == Role::Student {
        (user.id.clone(), user.name.clone())
    } else {
        let student_id = required_str(params, "studentId")?;
        let users = seed::users();
        let student = linkage::find_user(&users, &student_id)
            .filter(|u| u.role == Role::Student)
            .ok_or_else(|| HandlerErr::bad_params(format!("{} is not a student", student_id)))?;
        (student.id.clone(), student.name.clone())
    };

    let default_desc = if user.role == Role::Student {
        "구두로 전달받은 과제"
    } else {
        "추가 설명 없음"
    };
    let assignment = Assignment {
        id: new_id(),
        title,
        description: opt_str(params, "description")?.unwrap_or_else(|| default_desc.into()),
        due_date: opt_str(params, "dueDate")?.unwrap_or_else(today),
        student_id,
        student_name,
        status: AssignmentStatus::Pending,
        submission_text: None,
        submission_file_url: None,
        feedback: None,
        ai_analysis: None,
        grade: None,
    };

    let mut assignments = load(st, store::ASSIGNMENTS_KEY, seed::assignments)?;
    assignments.push_front(assignment.clone());
    assignments.save(st)?;

    Ok(json!({
        "assignment": serde_json::to_value(&assignment).unwrap_or_default(),
        "toast": toast("success", "새 과제가 등록되었습니다."),
    }))
}

fn assignments_submit(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    let assignment_id = required_str(params, "assignmentId")?;
    let submission_text = required_str(params, "submissionText")?;

    let mut assignments = load(st, store::ASSIGNMENTS_KEY, seed::assignments)?;
    let owner = assignments
        .find(&assignment_id)
        .ok_or_else(|| HandlerErr::not_found("assignment not found"))?
        .student_id
        .clone();
    if owner != user.id {
        return Err(HandlerErr::forbidden("only the assigned student may submit"));
    }

    assignments
        .try_update(&assignment_id, |a| a.submit(submission_text))
        .ok_or_else(|| HandlerErr::not_found("assignment not found"))??;
    assignments.save(st)?;

    Ok(json!({
        "assignment": assignments.find(&assignment_id).map(serde_json::to_value).and_then(Result::ok).unwrap_or_default(),
        "toast": toast("success", "과제가 성공적으로 제출되었습니다! 🎉"),
    }))
}

fn assignments_grade(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    require_staff(&user)?;
    let assignment_id = required_str(params, "assignmentId")?;
    let grade = required_str(params, "grade")?;
    let feedback = opt_str(params, "feedback")?.unwrap_or_default();

    let mut assignments = load(st, store::ASSIGNMENTS_KEY, seed::assignments)?;
    assignments
        .try_update(&assignment_id, |a| a.grade(grade, feedback))
        .ok_or_else(|| HandlerErr::not_found("assignment not found"))??;
    assignments.save(st)?;

    Ok(json!({
        "assignment": assignments.find(&assignment_id).map(serde_json::to_value).and_then(Result::ok).unwrap_or_default(),
        "toast": toast("success", "채점이 완료되었습니다."),
    }))
}

fn assignments_ai_feedback(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    let assignment_id = required_str(params, "assignmentId")?;

    let mut assignments = load(st, store::ASSIGNMENTS_KEY, seed::assignments)?;
    let assignment = assignments
        .find(&assignment_id)
        .ok_or_else(|| HandlerErr::not_found("assignment not found"))?;
    let scope = scope::for_user(&user);
    if !scope.sees_student_record(&assignment.student_id) {
        return Err(HandlerErr::forbidden("assignment not visible to this user"));
    }
    let submission = assignment
        .submission_text
        .clone()
        .ok_or_else(|| HandlerErr::bad_params("assignment has no submission to analyze"))?;

    let analysis = state.advisor.review_monologue(&submission).map_err(|e| {
        HandlerErr::new("advisor_failed", e.to_string())
            .with_toast("AI 분석 중 오류가 발생했습니다.")
    })?;

    assignments.update(&assignment_id, |a| a.ai_analysis = Some(analysis.clone()));
    assignments.save(st)?;

    Ok(json!({
        "assignment": assignments.find(&assignment_id).map(serde_json::to_value).and_then(Result::ok).unwrap_or_default(),
        "toast": toast("success", "AI 분석이 완료되었습니다."),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "assignments.list" => assignments_list(state, &req.params),
        "assignments.calendar" => assignments_calendar(state, &req.params),
        "assignments.create" => assignments_create(state, &req.params),
        "assignments.submit" => assignments_submit(state, &req.params),
        "assignments.grade" => assignments_grade(state, &req.params),
        "assignments.aiFeedback" => assignments_ai_feedback(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
