use serde_json::{json, Value as JsonValue};

use crate::calendar;
use crate::ipc::error::{ok, toast};
use crate::ipc::helpers::*;
use crate::ipc::types::{AppState, Request};
use crate::linkage;
use crate::model::{
    AttendanceRecord, AttendanceStatus, JournalType, Lesson, LessonJournal, LessonStatus, Role,
    Subject,
};
use crate::scope;
use crate::seed;
use crate::store;

fn lessons_list(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    let date_filter = opt_str(params, "date")?;

    let classes = load(st, store::CLASSES_KEY, seed::classes)?;
    let lessons = load(st, store::LESSONS_KEY, seed::lessons)?;
    let scope = scope::for_user(&user);

    let mut visible: Vec<&Lesson> =
        scope::visible_lessons(scope.as_ref(), lessons.list(), classes.list());
    if let Some(date) = &date_filter {
        visible.retain(|l| &l.date == date);
    } else {
        visible.sort_by(|a, b| a.date.cmp(&b.date));
    }

    Ok(json!({ "lessons": serde_json::to_value(&visible).unwrap_or_default() }))
}

fn lessons_calendar(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    let (year, month) = required_month(params)?;

    let classes = load(st, store::CLASSES_KEY, seed::classes)?;
    let lessons = load(st, store::LESSONS_KEY, seed::lessons)?;
    let scope = scope::for_user(&user);
    let visible: Vec<Lesson> =
        scope::visible_lessons(scope.as_ref(), lessons.list(), classes.list())
            .into_iter()
            .cloned()
            .collect();

    let grid = calendar::month_grid(year, month, &visible, |l| l.date.as_str())
        .ok_or_else(|| HandlerErr::bad_params("invalid year/month"))?;

    let days: Vec<JsonValue> = grid
        .days
        .iter()
        .map(|cell| {
            let dots: Vec<JsonValue> = cell
                .items
                .iter()
                .map(|l| {
                    json!({
                        "id": l.id,
                        "status": l.status,
                        "isPrivate": l.is_private,
                        "className": l.class_name,
                        "startTime": l.start_time,
                    })
                })
                .collect();
            json!({ "day": cell.day, "date": cell.date, "lessons": dots })
        })
        .collect();

    Ok(json!({
        "year": grid.year,
        "month": grid.month,
        "leadingBlanks": grid.leading_blanks,
        "days": days,
    }))
}

fn lessons_create(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    require_staff(&user)?;

    let class_id = required_str(params, "classId")?;
    let subject: Subject = required_enum(params, "subject")?;
    let date = required_str(params, "date")?;
    if calendar::parse_date(&date).is_none() {
        return Err(HandlerErr::bad_params("date must be YYYY-MM-DD"));
    }
    let start_time = opt_str(params, "startTime")?.unwrap_or_else(|| "18:00".into());
    let end_time = opt_str(params, "endTime")?.unwrap_or_else(|| "20:00".into());
    let location = opt_str(params, "location")?.unwrap_or_else(|| "미정".into());

    let classes = load(st, store::CLASSES_KEY, seed::classes)?;
    let class = linkage::find_class(classes.list(), &class_id)
        .ok_or_else(|| HandlerErr::not_found("class not found"))?;
    if user.role == Role::Teacher && !class.has_teacher(&user.id) {
        return Err(HandlerErr::forbidden("not a teacher of this class"));
    }

    // Teacher comes from the class's subject mapping; the acting staff
    // member backs the lesson when the subject is unassigned.
    let users = seed::users();
    let teacher_id = linkage::subject_teacher(classes.list(), &class_id, subject)
        .unwrap_or(user.id.as_str())
        .to_string();
    let teacher_name = linkage::user_name(&users, &teacher_id)
        .unwrap_or(user.name.as_str())
        .to_string();

    let lesson = Lesson {
        id: new_id(),
        class_id: Some(class.id.clone()),
        class_name: Some(class.name.clone()),
        date,
        start_time,
        end_time,
        location,
        status: LessonStatus::Scheduled,
        subject,
        memo: opt_str(params, "memo")?,
        teacher_id,
        teacher_name,
        is_private: false,
        private_student_ids: None,
        request_id: None,
    };

    let mut lessons = load(st, store::LESSONS_KEY, seed::lessons)?;
    lessons.push(lesson.clone());
    lessons.save(st)?;

    Ok(json!({
        "lesson": serde_json::to_value(&lesson).unwrap_or_default(),
        "toast": toast("success", "수업이 등록되었습니다."),
    }))
}

fn lessons_transition(
    state: &AppState,
    params: &JsonValue,
    to_completed: bool,
) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    require_staff(&user)?;
    let lesson_id = required_str(params, "lessonId")?;

    let mut lessons = load(st, store::LESSONS_KEY, seed::lessons)?;
    let result = lessons
        .try_update(&lesson_id, |l| {
            if to_completed {
                l.complete()
            } else {
                l.cancel()
            }
        })
        .ok_or_else(|| HandlerErr::not_found("lesson not found"))?;
    result?;
    lessons.save(st)?;

    let message = if to_completed {
        "수업이 완료 처리되었습니다."
    } else {
        "수업이 취소되었습니다."
    };
    Ok(json!({
        "lesson": lessons.find(&lesson_id).map(serde_json::to_value).and_then(Result::ok).unwrap_or_default(),
        "toast": toast("success", message),
    }))
}

fn journals_list(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    let lesson_id = required_str(params, "lessonId")?;

    let classes = load(st, store::CLASSES_KEY, seed::classes)?;
    let lessons = load(st, store::LESSONS_KEY, seed::lessons)?;
    let lesson = lessons
        .find(&lesson_id)
        .ok_or_else(|| HandlerErr::not_found("lesson not found"))?;
    let scope = scope::for_user(&user);
    if !scope.sees_lesson(lesson, classes.list()) {
        return Err(HandlerErr::forbidden("lesson not visible to this user"));
    }

    let journals = load(st, store::JOURNALS_KEY, seed::journals)?;
    let for_lesson = linkage::journals_for_lesson(journals.list(), &lesson_id);
    Ok(json!({ "journals": serde_json::to_value(&for_lesson).unwrap_or_default() }))
}

fn journals_add(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    let lesson_id = required_str(params, "lessonId")?;
    let content = required_str(params, "content")?;

    let lessons = load(st, store::LESSONS_KEY, seed::lessons)?;
    if lessons.find(&lesson_id).is_none() {
        return Err(HandlerErr::not_found("lesson not found"));
    }

    let is_staff = user.role.is_staff();
    let journal = LessonJournal {
        id: new_id(),
        lesson_id,
        author_id: user.id.clone(),
        author_name: user.name.clone(),
        journal_type: if is_staff {
            JournalType::Teacher
        } else {
            JournalType::Student
        },
        content,
        // Objectives and next plan are teacher-journal fields only.
        objectives: if is_staff {
            opt_str(params, "objectives")?
        } else {
            None
        },
        next_plan: if is_staff {
            opt_str(params, "nextPlan")?
        } else {
            None
        },
        date: now_ts(),
    };

    let mut journals = load(st, store::JOURNALS_KEY, seed::journals)?;
    journals.push(journal.clone());
    journals.save(st)?;

    Ok(json!({
        "journal": serde_json::to_value(&journal).unwrap_or_default(),
        "toast": toast("success", "수업일지가 등록되었습니다."),
    }))
}

fn attendance_list(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    let lesson_id = required_str(params, "lessonId")?;

    let classes = load(st, store::CLASSES_KEY, seed::classes)?;
    let lessons = load(st, store::LESSONS_KEY, seed::lessons)?;
    let lesson = lessons
        .find(&lesson_id)
        .ok_or_else(|| HandlerErr::not_found("lesson not found"))?;
    let scope = scope::for_user(&user);
    if !scope.sees_lesson(lesson, classes.list()) {
        return Err(HandlerErr::forbidden("lesson not visible to this user"));
    }

    let attendance = load(st, store::ATTENDANCE_KEY, seed::attendance)?;
    let mut records = linkage::attendance_for_lesson(attendance.list(), &lesson_id);
    // Students see only their own row.
    if user.role == Role::Student {
        records.retain(|a| a.student_id == user.id);
    }

    let roster = linkage::lesson_roster(lesson, classes.list());
    Ok(json!({
        "records": serde_json::to_value(&records).unwrap_or_default(),
        "roster": roster,
    }))
}

/// One record per (lesson, student): recording again replaces the status
/// in place instead of appending a duplicate.
fn attendance_record(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    require_staff(&user)?;
    let lesson_id = required_str(params, "lessonId")?;
    let student_id = required_str(params, "studentId")?;
    let status: AttendanceStatus = required_enum(params, "status")?;
    let note = opt_str(params, "note")?;

    let lessons = load(st, store::LESSONS_KEY, seed::lessons)?;
    if lessons.find(&lesson_id).is_none() {
        return Err(HandlerErr::not_found("lesson not found"));
    }
    let users = seed::users();
    let student = linkage::find_user(&users, &student_id)
        .filter(|u| u.role == Role::Student)
        .ok_or_else(|| HandlerErr::bad_params(format!("{} is not a student", student_id)))?;

    let mut attendance = load(st, store::ATTENDANCE_KEY, seed::attendance)?;
    let existing_id = attendance
        .list()
        .iter()
        .find(|a| a.lesson_id == lesson_id && a.student_id == student_id)
        .map(|a| a.id.clone());

    let record_id = match existing_id {
        Some(id) => {
            attendance.update(&id, |a| {
                a.status = status;
                if note.is_some() {
                    a.note = note.clone();
                }
            });
            id
        }
        None => {
            let record = AttendanceRecord {
                id: new_id(),
                lesson_id,
                student_id,
                student_name: student.name.clone(),
                status,
                note,
            };
            let id = record.id.clone();
            attendance.push(record);
            id
        }
    };
    attendance.save(st)?;

    Ok(json!({
        "record": attendance.find(&record_id).map(serde_json::to_value).and_then(Result::ok).unwrap_or_default(),
        "toast": toast("success", "출석이 기록되었습니다."),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "lessons.list" => lessons_list(state, &req.params),
        "lessons.calendar" => lessons_calendar(state, &req.params),
        "lessons.create" => lessons_create(state, &req.params),
        "lessons.complete" => lessons_transition(state, &req.params, true),
        "lessons.cancel" => lessons_transition(state, &req.params, false),
        "journals.list" => journals_list(state, &req.params),
        "journals.add" => journals_add(state, &req.params),
        "attendance.list" => attendance_list(state, &req.params),
        "attendance.record" => attendance_record(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
