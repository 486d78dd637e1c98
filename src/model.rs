use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Director,
}

impl Role {
    pub fn is_staff(self) -> bool {
        !matches!(self, Role::Student)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Acting,
    Musical,
    Dance,
}

impl Subject {
    pub fn as_str(self) -> &'static str {
        match self {
            Subject::Acting => "acting",
            Subject::Musical => "musical",
            Subject::Dance => "dance",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub avatar: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Subject -> teacher id. Partial: a class need not cover every subject.
    #[serde(default)]
    pub subject_teachers: BTreeMap<Subject, String>,
    #[serde(default)]
    pub student_ids: Vec<String>,
    pub schedule: String,
}

impl ClassInfo {
    pub fn has_teacher(&self, teacher_id: &str) -> bool {
        self.subject_teachers.values().any(|t| t == teacher_id)
    }

    pub fn has_student(&self, student_id: &str) -> bool {
        self.student_ids.iter().any(|s| s == student_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl fmt::Display for LessonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LessonStatus::Scheduled => "scheduled",
            LessonStatus::Completed => "completed",
            LessonStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    /// Absent on private lessons that were approved without a matching class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// YYYY-MM-DD
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub status: LessonStatus,
    pub subject: Subject,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub teacher_id: String,
    pub teacher_name: String,
    pub is_private: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_student_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl Lesson {
    pub fn complete(&mut self) -> Result<(), TransitionError> {
        self.transition(LessonStatus::Completed)
    }

    pub fn cancel(&mut self) -> Result<(), TransitionError> {
        self.transition(LessonStatus::Cancelled)
    }

    fn transition(&mut self, to: LessonStatus) -> Result<(), TransitionError> {
        if self.status != LessonStatus::Scheduled {
            return Err(TransitionError {
                entity: "lesson",
                from: self.status.to_string(),
                to: match to {
                    LessonStatus::Completed => "completed",
                    LessonStatus::Cancelled => "cancelled",
                    LessonStatus::Scheduled => "scheduled",
                },
            });
        }
        self.status = to;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalType {
    Teacher,
    Student,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonJournal {
    pub id: String,
    pub lesson_id: String,
    pub author_id: String,
    pub author_name: String,
    pub journal_type: JournalType,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objectives: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_plan: Option<String>,
    pub date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
    Excused,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub lesson_id: String,
    pub student_id: String,
    pub student_name: String,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Pending,
    Submitted,
    Graded,
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::Submitted => "submitted",
            AssignmentStatus::Graded => "graded",
        };
        f.write_str(s)
    }
}

impl AssignmentStatus {
    /// Counts toward the calendar's "all done" stamp.
    pub fn is_settled(self) -> bool {
        matches!(self, AssignmentStatus::Submitted | AssignmentStatus::Graded)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub title: String,
    pub description: String,
    /// YYYY-MM-DD
    pub due_date: String,
    pub student_id: String,
    pub student_name: String,
    pub status: AssignmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
}

impl Assignment {
    pub fn submit(&mut self, text: String) -> Result<(), TransitionError> {
        if self.status != AssignmentStatus::Pending {
            return Err(TransitionError {
                entity: "assignment",
                from: self.status.to_string(),
                to: "submitted",
            });
        }
        self.status = AssignmentStatus::Submitted;
        self.submission_text = Some(text);
        Ok(())
    }

    pub fn grade(&mut self, grade: String, feedback: String) -> Result<(), TransitionError> {
        if self.status != AssignmentStatus::Submitted {
            return Err(TransitionError {
                entity: "assignment",
                from: self.status.to_string(),
                to: "graded",
            });
        }
        self.status = AssignmentStatus::Graded;
        self.grade = Some(grade);
        self.feedback = Some(feedback);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietLog {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    /// Full ISO timestamp; calendar cells match on the date prefix.
    pub date: String,
    pub meal_type: MealType,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_advice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerAuthor {
    Student,
    Teacher,
    Director,
    #[serde(rename = "AI")]
    Ai,
}

impl From<Role> for AnswerAuthor {
    fn from(role: Role) -> Self {
        match role {
            Role::Student => AnswerAuthor::Student,
            Role::Teacher => AnswerAuthor::Teacher,
            Role::Director => AnswerAuthor::Director,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: String,
    pub content: String,
    pub author_name: String,
    pub author_role: AnswerAuthor,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_ai: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub author_name: String,
    pub date: String,
    #[serde(default)]
    pub answers: Vec<Answer>,
    #[serde(default)]
    pub views: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scores {
    pub acting: u8,
    pub expression: u8,
    pub creativity: u8,
    pub teamwork: u8,
    pub effort: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub evaluator_id: String,
    pub evaluator_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    pub subject: Subject,
    /// Free text, e.g. "2024년 1월".
    pub period: String,
    pub scores: Scores,
    pub comment: String,
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioComment {
    pub id: String,
    pub author_id: String,
    pub author_name: String,
    pub content: String,
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub comments: Vec<PortfolioComment>,
    pub date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionEvent {
    pub id: String,
    pub title: String,
    /// YYYY-MM-DD
    pub date: String,
    pub location: String,
    pub status: EventStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub creator_id: String,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_prep_tips: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateLessonRequest {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub teacher_id: String,
    pub teacher_name: String,
    pub subject: Subject,
    pub preferred_date: String,
    pub preferred_start_time: String,
    pub preferred_end_time: String,
    pub reason: String,
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_note: Option<String>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<String>,
}

impl PrivateLessonRequest {
    pub fn approve(&mut self, responded_at: String) -> Result<(), TransitionError> {
        self.guard_pending("approved")?;
        self.status = RequestStatus::Approved;
        self.responded_at = Some(responded_at);
        Ok(())
    }

    pub fn reject(
        &mut self,
        note: Option<String>,
        responded_at: String,
    ) -> Result<(), TransitionError> {
        self.guard_pending("rejected")?;
        self.status = RequestStatus::Rejected;
        self.response_note = note;
        self.responded_at = Some(responded_at);
        Ok(())
    }

    fn guard_pending(&self, to: &'static str) -> Result<(), TransitionError> {
        if self.status != RequestStatus::Pending {
            return Err(TransitionError {
                entity: "request",
                from: self.status.to_string(),
                to,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub class_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub sender_role: Role,
    pub content: String,
    pub timestamp: String,
    pub avatar: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    pub date: String,
    pub read: bool,
}

/// Rejected lifecycle move. Terminal states have no outgoing edge.
#[derive(Debug, Error)]
#[error("{entity} cannot move from {from} to {to}")]
pub struct TransitionError {
    pub entity: &'static str,
    pub from: String,
    pub to: &'static str,
}

/// Uniform id access so `PersistedCollection` can update/remove by id.
pub trait Identified {
    fn id(&self) -> &str;
}

macro_rules! identified {
    ($($ty:ty),* $(,)?) => {
        $(impl Identified for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })*
    };
}

identified!(
    User,
    ClassInfo,
    Lesson,
    LessonJournal,
    AttendanceRecord,
    Assignment,
    DietLog,
    Question,
    Evaluation,
    PortfolioItem,
    CompetitionEvent,
    PrivateLessonRequest,
    ChatMessage,
    Notification,
);

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PrivateLessonRequest {
        PrivateLessonRequest {
            id: "pr1".into(),
            student_id: "s1".into(),
            student_name: "김배우".into(),
            teacher_id: "t1".into(),
            teacher_name: "박선생".into(),
            subject: Subject::Acting,
            preferred_date: "2024-05-01".into(),
            preferred_start_time: "10:00".into(),
            preferred_end_time: "11:00".into(),
            reason: "독백 준비".into(),
            status: RequestStatus::Pending,
            response_note: None,
            created_at: "2024-04-28T09:00:00Z".into(),
            responded_at: None,
        }
    }

    fn assignment(status: AssignmentStatus) -> Assignment {
        Assignment {
            id: "a1".into(),
            title: "독백 분석".into(),
            description: String::new(),
            due_date: "2024-05-10".into(),
            student_id: "s1".into(),
            student_name: "김배우".into(),
            status,
            submission_text: None,
            submission_file_url: None,
            feedback: None,
            ai_analysis: None,
            grade: None,
        }
    }

    #[test]
    fn assignment_moves_forward_only() {
        let mut a = assignment(AssignmentStatus::Pending);
        a.submit("제출합니다".into()).unwrap();
        assert_eq!(a.status, AssignmentStatus::Submitted);
        assert_eq!(a.submission_text.as_deref(), Some("제출합니다"));

        // Cannot submit twice.
        assert!(a.submit("again".into()).is_err());

        a.grade("A".into(), "좋아요".into()).unwrap();
        assert_eq!(a.status, AssignmentStatus::Graded);
        assert!(a.grade("B".into(), String::new()).is_err());
    }

    #[test]
    fn assignment_cannot_skip_to_graded() {
        let mut a = assignment(AssignmentStatus::Pending);
        assert!(a.grade("A".into(), String::new()).is_err());
        assert_eq!(a.status, AssignmentStatus::Pending);
        assert!(a.grade.is_none());
    }

    #[test]
    fn lesson_terminal_states_are_frozen() {
        let mut l = Lesson {
            id: "l1".into(),
            class_id: Some("c1".into()),
            class_name: Some("입시 A반".into()),
            date: "2024-05-01".into(),
            start_time: "18:00".into(),
            end_time: "20:00".into(),
            location: "301호".into(),
            status: LessonStatus::Scheduled,
            subject: Subject::Acting,
            memo: None,
            teacher_id: "t1".into(),
            teacher_name: "박선생".into(),
            is_private: false,
            private_student_ids: None,
            request_id: None,
        };
        l.complete().unwrap();
        assert!(l.cancel().is_err());
        assert_eq!(l.status, LessonStatus::Completed);
    }

    #[test]
    fn request_terminal_after_decision() {
        let mut r = request();
        r.reject(Some("일정이 안 맞아요".into()), "2024-04-29T10:00:00Z".into())
            .unwrap();
        assert_eq!(r.status, RequestStatus::Rejected);
        assert!(r.responded_at.is_some());
        assert!(r.approve("2024-04-30T10:00:00Z".into()).is_err());

        let mut r2 = request();
        r2.approve("2024-04-29T10:00:00Z".into()).unwrap();
        assert!(r2.approve("2024-04-30T10:00:00Z".into()).is_err());
        assert!(r2.reject(None, "2024-04-30T10:00:00Z".into()).is_err());
    }

    #[test]
    fn wire_format_is_camel_case() {
        let r = request();
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["studentId"], "s1");
        assert_eq!(v["preferredStartTime"], "10:00");
        assert_eq!(v["status"], "pending");
        assert!(v.get("respondedAt").is_none());

        let back: PrivateLessonRequest = serde_json::from_value(v).unwrap();
        assert_eq!(back.subject, Subject::Acting);
    }
}
