//! Foreign-key joins across collections. Lookups are linear scans over the
//! in-memory lists and return `None` for dangling references; callers
//! render a neutral fallback instead of failing.

use crate::model::{
    AttendanceRecord, ChatMessage, ClassInfo, Lesson, LessonJournal, PrivateLessonRequest,
    Subject, User,
};

pub fn find_user<'a>(users: &'a [User], id: &str) -> Option<&'a User> {
    users.iter().find(|u| u.id == id)
}

pub fn user_name<'a>(users: &'a [User], id: &str) -> Option<&'a str> {
    find_user(users, id).map(|u| u.name.as_str())
}

pub fn find_class<'a>(classes: &'a [ClassInfo], id: &str) -> Option<&'a ClassInfo> {
    classes.iter().find(|c| c.id == id)
}

/// Teacher assigned to a subject within a class, if the class covers it.
pub fn subject_teacher<'a>(
    classes: &'a [ClassInfo],
    class_id: &str,
    subject: Subject,
) -> Option<&'a str> {
    find_class(classes, class_id)?
        .subject_teachers
        .get(&subject)
        .map(String::as_str)
}

/// Students expected at a lesson: the named invitees for a private lesson,
/// the class roster otherwise. A dangling class reference yields an empty
/// roster.
pub fn lesson_roster(lesson: &Lesson, classes: &[ClassInfo]) -> Vec<String> {
    if lesson.is_private {
        return lesson.private_student_ids.clone().unwrap_or_default();
    }
    lesson
        .class_id
        .as_deref()
        .and_then(|cid| find_class(classes, cid))
        .map(|c| c.student_ids.clone())
        .unwrap_or_default()
}

pub fn journals_for_lesson<'a>(
    journals: &'a [LessonJournal],
    lesson_id: &str,
) -> Vec<&'a LessonJournal> {
    journals
        .iter()
        .filter(|j| j.lesson_id == lesson_id)
        .collect()
}

pub fn attendance_for_lesson<'a>(
    records: &'a [AttendanceRecord],
    lesson_id: &str,
) -> Vec<&'a AttendanceRecord> {
    records
        .iter()
        .filter(|a| a.lesson_id == lesson_id)
        .collect()
}

/// Most recent message in a class channel, by timestamp.
pub fn last_message<'a>(messages: &'a [ChatMessage], class_id: &str) -> Option<&'a ChatMessage> {
    messages
        .iter()
        .filter(|m| m.class_id == class_id)
        .max_by(|a, b| a.timestamp.cmp(&b.timestamp))
}

/// Class backing an approved private-lesson request: the student must be
/// enrolled and the requested teacher must hold the requested subject
/// there. No match means the synthesized lesson stays unattached.
pub fn class_for_request<'a>(
    classes: &'a [ClassInfo],
    request: &PrivateLessonRequest,
) -> Option<&'a ClassInfo> {
    classes.iter().find(|c| {
        c.has_student(&request.student_id)
            && c.subject_teachers.get(&request.subject) == Some(&request.teacher_id)
    })
}
