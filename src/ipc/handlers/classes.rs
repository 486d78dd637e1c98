use std::collections::BTreeMap;

use serde_json::{json, Value as JsonValue};

use crate::ipc::error::{ok, toast};
use crate::ipc::helpers::*;
use crate::ipc::types::{AppState, Request};
use crate::linkage;
use crate::model::{ClassInfo, Role, Subject};
use crate::scope;
use crate::seed;
use crate::store;

fn classes_list(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    let classes = load(st, store::CLASSES_KEY, seed::classes)?;
    let scope = scope::for_user(&user);

    let users = seed::users();
    let visible: Vec<JsonValue> = scope::visible_classes(scope.as_ref(), classes.list())
        .into_iter()
        .map(|c| {
            let mut v = serde_json::to_value(c).unwrap_or_default();
            // Teacher names resolved per subject so the roster view renders
            // without a second lookup.
            let names: BTreeMap<&str, &str> = c
                .subject_teachers
                .iter()
                .filter_map(|(subject, tid)| {
                    linkage::user_name(&users, tid).map(|n| (subject.as_str(), n))
                })
                .collect();
            v["teacherNames"] = json!(names);
            v["studentCount"] = json!(c.student_ids.len());
            v
        })
        .collect();

    Ok(json!({ "classes": visible }))
}

fn parse_subject_teachers(
    params: &JsonValue,
) -> Result<Option<BTreeMap<Subject, String>>, HandlerErr> {
    let Some(raw) = params.get("subjectTeachers") else {
        return Ok(None);
    };
    if raw.is_null() {
        return Ok(None);
    }
    let obj = raw
        .as_object()
        .ok_or_else(|| HandlerErr::bad_params("subjectTeachers must be an object"))?;
    let users = seed::users();
    let mut out = BTreeMap::new();
    for (key, value) in obj {
        let subject: Subject = serde_json::from_value(JsonValue::String(key.clone()))
            .map_err(|_| HandlerErr::bad_params(format!("invalid subject: {}", key)))?;
        let teacher_id = value
            .as_str()
            .ok_or_else(|| HandlerErr::bad_params("subjectTeachers values must be teacher ids"))?;
        match linkage::find_user(&users, teacher_id) {
            Some(u) if u.role == Role::Teacher => {}
            _ => {
                return Err(HandlerErr::bad_params(format!(
                    "{} is not a teacher",
                    teacher_id
                )))
            }
        }
        out.insert(subject, teacher_id.to_string());
    }
    Ok(Some(out))
}

fn parse_student_ids(params: &JsonValue) -> Result<Option<Vec<String>>, HandlerErr> {
    let Some(raw) = params.get("studentIds") else {
        return Ok(None);
    };
    if raw.is_null() {
        return Ok(None);
    }
    let arr = raw
        .as_array()
        .ok_or_else(|| HandlerErr::bad_params("studentIds must be an array"))?;
    let users = seed::users();
    let mut out = Vec::with_capacity(arr.len());
    for value in arr {
        let id = value
            .as_str()
            .ok_or_else(|| HandlerErr::bad_params("studentIds must be strings"))?;
        match linkage::find_user(&users, id) {
            Some(u) if u.role == Role::Student => {}
            _ => {
                return Err(HandlerErr::bad_params(format!(
                    "{} is not a student",
                    id
                )))
            }
        }
        if !out.iter().any(|existing| existing == id) {
            out.push(id.to_string());
        }
    }
    Ok(Some(out))
}

fn classes_create(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    require_staff(&user)?;

    let name = required_str(params, "name")?;
    let description = opt_str(params, "description")?.unwrap_or_default();
    let schedule = opt_str(params, "schedule")?.unwrap_or_default();
    let subject_teachers = parse_subject_teachers(params)?.unwrap_or_default();
    let student_ids = parse_student_ids(params)?.unwrap_or_default();

    let class = ClassInfo {
        id: new_id(),
        name,
        description,
        subject_teachers,
        student_ids,
        schedule,
    };

    let mut classes = load(st, store::CLASSES_KEY, seed::classes)?;
    classes.push(class.clone());
    classes.save(st)?;

    Ok(json!({
        "class": serde_json::to_value(&class).unwrap_or_default(),
        "toast": toast("success", "클래스가 등록되었습니다."),
    }))
}

fn classes_update(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    require_staff(&user)?;
    let class_id = required_str(params, "classId")?;

    let name = opt_str(params, "name")?;
    let description = opt_str(params, "description")?;
    let schedule = opt_str(params, "schedule")?;
    let subject_teachers = parse_subject_teachers(params)?;
    let student_ids = parse_student_ids(params)?;

    let mut classes = load(st, store::CLASSES_KEY, seed::classes)?;
    let updated = classes.update(&class_id, |c| {
        if let Some(name) = name {
            c.name = name;
        }
        if let Some(description) = description {
            c.description = description;
        }
        if let Some(schedule) = schedule {
            c.schedule = schedule;
        }
        if let Some(subject_teachers) = subject_teachers {
            c.subject_teachers = subject_teachers;
        }
        if let Some(student_ids) = student_ids {
            c.student_ids = student_ids;
        }
    });
    if !updated {
        return Err(HandlerErr::not_found("class not found"));
    }
    classes.save(st)?;

    let class = classes.find(&class_id).map(serde_json::to_value);
    Ok(json!({
        "class": class.and_then(Result::ok).unwrap_or_default(),
        "toast": toast("success", "클래스 정보가 수정되었습니다."),
    }))
}

/// Removing a class also removes what hangs off it: its lessons, their
/// journals and attendance, and the class chat channel. Unattached private
/// lessons are left alone. All slots flush in one transaction.
pub(crate) fn delete_class_cascade(
    st: &crate::store::Store,
    class_id: &str,
) -> Result<usize, HandlerErr> {
    let mut classes = load(st, store::CLASSES_KEY, seed::classes)?;
    if classes.remove(class_id).is_none() {
        return Err(HandlerErr::not_found("class not found"));
    }

    let mut lessons = load(st, store::LESSONS_KEY, seed::lessons)?;
    let doomed: Vec<String> = lessons
        .list()
        .iter()
        .filter(|l| l.class_id.as_deref() == Some(class_id))
        .map(|l| l.id.clone())
        .collect();
    lessons.retain(|l| l.class_id.as_deref() != Some(class_id));

    let mut journals = load(st, store::JOURNALS_KEY, seed::journals)?;
    journals.retain(|j| !doomed.contains(&j.lesson_id));

    let mut attendance = load(st, store::ATTENDANCE_KEY, seed::attendance)?;
    attendance.retain(|a| !doomed.contains(&a.lesson_id));

    let mut chats = load(st, store::CHATS_KEY, seed::chats)?;
    chats.retain(|m| m.class_id != class_id);

    st.put_many(&[
        classes.staged()?,
        lessons.staged()?,
        journals.staged()?,
        attendance.staged()?,
        chats.staged()?,
    ])?;

    Ok(doomed.len())
}

fn classes_delete(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    require_staff(&user)?;
    let class_id = required_str(params, "classId")?;

    let removed_lessons = delete_class_cascade(st, &class_id)?;

    Ok(json!({
        "removedLessons": removed_lessons,
        "toast": toast("success", "클래스 및 채팅방이 삭제되었습니다."),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "classes.list" => classes_list(state, &req.params),
        "classes.create" => classes_create(state, &req.params),
        "classes.update" => classes_update(state, &req.params),
        "classes.delete" => classes_delete(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
