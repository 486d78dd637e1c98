//! Role-based visibility. One `Scope` implementation per role replaces
//! inline role switches; handlers pick a scope once per request and filter
//! through it. Filters are pure and keep input order.

use crate::model::{ClassInfo, Lesson, PrivateLessonRequest, RequestStatus, Role, User};

pub trait Scope {
    fn sees_class(&self, class: &ClassInfo) -> bool;

    fn sees_lesson(&self, lesson: &Lesson, classes: &[ClassInfo]) -> bool;

    /// Staff review pending requests; students follow their own requests
    /// through every status.
    fn sees_request(&self, request: &PrivateLessonRequest) -> bool;

    /// Per-student records (assignments, diet logs, evaluations,
    /// portfolios): staff see all, students only their own.
    fn sees_student_record(&self, student_id: &str) -> bool;
}

struct DirectorScope;

struct TeacherScope {
    user_id: String,
}

struct StudentScope {
    user_id: String,
}

impl Scope for DirectorScope {
    fn sees_class(&self, _class: &ClassInfo) -> bool {
        true
    }

    fn sees_lesson(&self, _lesson: &Lesson, _classes: &[ClassInfo]) -> bool {
        true
    }

    fn sees_request(&self, request: &PrivateLessonRequest) -> bool {
        request.status == RequestStatus::Pending
    }

    fn sees_student_record(&self, _student_id: &str) -> bool {
        true
    }
}

impl Scope for TeacherScope {
    fn sees_class(&self, class: &ClassInfo) -> bool {
        class.has_teacher(&self.user_id)
    }

    fn sees_lesson(&self, lesson: &Lesson, _classes: &[ClassInfo]) -> bool {
        lesson.teacher_id == self.user_id
    }

    fn sees_request(&self, request: &PrivateLessonRequest) -> bool {
        request.status == RequestStatus::Pending && request.teacher_id == self.user_id
    }

    fn sees_student_record(&self, _student_id: &str) -> bool {
        true
    }
}

impl Scope for StudentScope {
    fn sees_class(&self, class: &ClassInfo) -> bool {
        class.has_student(&self.user_id)
    }

    fn sees_lesson(&self, lesson: &Lesson, classes: &[ClassInfo]) -> bool {
        if lesson.is_private {
            return lesson
                .private_student_ids
                .as_deref()
                .unwrap_or_default()
                .iter()
                .any(|s| s == &self.user_id);
        }
        lesson
            .class_id
            .as_deref()
            .and_then(|cid| classes.iter().find(|c| c.id == cid))
            .map(|c| c.has_student(&self.user_id))
            .unwrap_or(false)
    }

    fn sees_request(&self, request: &PrivateLessonRequest) -> bool {
        request.student_id == self.user_id
    }

    fn sees_student_record(&self, student_id: &str) -> bool {
        student_id == self.user_id
    }
}

pub fn for_user(user: &User) -> Box<dyn Scope> {
    match user.role {
        Role::Director => Box::new(DirectorScope),
        Role::Teacher => Box::new(TeacherScope {
            user_id: user.id.clone(),
        }),
        Role::Student => Box::new(StudentScope {
            user_id: user.id.clone(),
        }),
    }
}

pub fn visible_classes<'a>(scope: &dyn Scope, classes: &'a [ClassInfo]) -> Vec<&'a ClassInfo> {
    classes.iter().filter(|c| scope.sees_class(c)).collect()
}

pub fn visible_lessons<'a>(
    scope: &dyn Scope,
    lessons: &'a [Lesson],
    classes: &[ClassInfo],
) -> Vec<&'a Lesson> {
    lessons
        .iter()
        .filter(|l| scope.sees_lesson(l, classes))
        .collect()
}

pub fn visible_requests<'a>(
    scope: &dyn Scope,
    requests: &'a [PrivateLessonRequest],
) -> Vec<&'a PrivateLessonRequest> {
    requests
        .iter()
        .filter(|r| scope.sees_request(r))
        .collect()
}
