//! Seed collections used when a workspace slot is empty or unreadable.
//! Dated records are rebased off "today" so a fresh workspace lands with a
//! believable calendar.

use std::collections::BTreeMap;

use chrono::{Duration, SecondsFormat, Utc};

use crate::model::*;

fn date_offset(days: i64) -> String {
    (Utc::now() + Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

fn ts_offset(days: i64) -> String {
    (Utc::now() + Duration::days(days)).to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn users() -> Vec<User> {
    let user = |id: &str, name: &str, role: Role, avatar: &str, email: &str| User {
        id: id.into(),
        name: name.into(),
        role,
        avatar: avatar.into(),
        email: email.into(),
    };
    vec![
        user(
            "s1",
            "김배우",
            Role::Student,
            "https://picsum.photos/200",
            "actor@muse.com",
        ),
        user(
            "t1",
            "박선생",
            Role::Teacher,
            "https://picsum.photos/201",
            "teacher@muse.com",
        ),
        user(
            "d1",
            "최원장",
            Role::Director,
            "https://picsum.photos/206",
            "director@muse.com",
        ),
        user(
            "s2",
            "이연기",
            Role::Student,
            "https://picsum.photos/202",
            "lee@muse.com",
        ),
        user(
            "s3",
            "최무대",
            Role::Student,
            "https://picsum.photos/203",
            "choi@muse.com",
        ),
        user(
            "s4",
            "박감정",
            Role::Student,
            "https://picsum.photos/204",
            "park@muse.com",
        ),
        user(
            "t2",
            "김무용",
            Role::Teacher,
            "https://picsum.photos/205",
            "dance@muse.com",
        ),
    ]
}

pub fn classes() -> Vec<ClassInfo> {
    vec![
        ClassInfo {
            id: "c1".into(),
            name: "입시 A반".into(),
            description: "한예종/중앙대 목표 입시반입니다.".into(),
            subject_teachers: BTreeMap::from([
                (Subject::Acting, "t1".to_string()),
                (Subject::Musical, "t1".to_string()),
                (Subject::Dance, "t2".to_string()),
            ]),
            student_ids: vec!["s1".into(), "s2".into()],
            schedule: "월/수/금 18:00".into(),
        },
        ClassInfo {
            id: "c2".into(),
            name: "입시 B반".into(),
            description: "경희대/동국대 목표 입시반입니다.".into(),
            subject_teachers: BTreeMap::from([
                (Subject::Acting, "t1".to_string()),
                (Subject::Dance, "t2".to_string()),
            ]),
            student_ids: vec!["s3".into(), "s4".into()],
            schedule: "화/목 17:00".into(),
        },
        ClassInfo {
            id: "c3".into(),
            name: "기초반".into(),
            description: "연기 기초 과정 (취미/입문)".into(),
            subject_teachers: BTreeMap::from([
                (Subject::Acting, "t1".to_string()),
                (Subject::Musical, "t2".to_string()),
            ]),
            student_ids: vec!["s1".into(), "s3".into(), "s4".into()],
            schedule: "토 14:00".into(),
        },
    ]
}

pub fn lessons() -> Vec<Lesson> {
    let group = |id: &str,
                 class_id: &str,
                 class_name: &str,
                 date: String,
                 start: &str,
                 end: &str,
                 location: &str,
                 status: LessonStatus,
                 subject: Subject,
                 teacher_id: &str,
                 teacher_name: &str| Lesson {
        id: id.into(),
        class_id: Some(class_id.into()),
        class_name: Some(class_name.into()),
        date,
        start_time: start.into(),
        end_time: end.into(),
        location: location.into(),
        status,
        subject,
        memo: None,
        teacher_id: teacher_id.into(),
        teacher_name: teacher_name.into(),
        is_private: false,
        private_student_ids: None,
        request_id: None,
    };

    let mut lessons = vec![
        group(
            "l1",
            "c1",
            "입시 A반",
            date_offset(0),
            "18:00",
            "20:00",
            "301호",
            LessonStatus::Scheduled,
            Subject::Acting,
            "t1",
            "박선생",
        ),
        group(
            "l2",
            "c2",
            "입시 B반",
            date_offset(0),
            "14:00",
            "16:00",
            "302호",
            LessonStatus::Scheduled,
            Subject::Acting,
            "t1",
            "박선생",
        ),
        group(
            "l3",
            "c1",
            "입시 A반",
            date_offset(-2),
            "18:00",
            "20:00",
            "301호",
            LessonStatus::Completed,
            Subject::Acting,
            "t1",
            "박선생",
        ),
        group(
            "l4",
            "c1",
            "입시 A반",
            date_offset(-4),
            "18:00",
            "20:00",
            "301호",
            LessonStatus::Completed,
            Subject::Musical,
            "t1",
            "박선생",
        ),
        group(
            "l5",
            "c2",
            "입시 B반",
            date_offset(-7),
            "14:00",
            "16:00",
            "302호",
            LessonStatus::Completed,
            Subject::Dance,
            "t2",
            "김무용",
        ),
        group(
            "l6",
            "c1",
            "입시 A반",
            date_offset(2),
            "18:00",
            "20:00",
            "301호",
            LessonStatus::Scheduled,
            Subject::Dance,
            "t2",
            "김무용",
        ),
        group(
            "l7",
            "c3",
            "기초반",
            date_offset(4),
            "14:00",
            "16:00",
            "201호",
            LessonStatus::Scheduled,
            Subject::Acting,
            "t1",
            "박선생",
        ),
        group(
            "l8",
            "c3",
            "기초반",
            date_offset(7),
            "14:00",
            "16:00",
            "201호",
            LessonStatus::Scheduled,
            Subject::Musical,
            "t2",
            "김무용",
        ),
    ];

    lessons.push(Lesson {
        id: "l9".into(),
        class_id: Some("c1".into()),
        class_name: Some("입시 A반".into()),
        date: date_offset(1),
        start_time: "10:00".into(),
        end_time: "11:00".into(),
        location: "개인연습실".into(),
        status: LessonStatus::Scheduled,
        subject: Subject::Acting,
        memo: None,
        teacher_id: "t1".into(),
        teacher_name: "박선생".into(),
        is_private: true,
        private_student_ids: Some(vec!["s1".into()]),
        request_id: Some("pr1".into()),
    });
    lessons.push(Lesson {
        id: "l10".into(),
        class_id: Some("c2".into()),
        class_name: Some("입시 B반".into()),
        date: date_offset(3),
        start_time: "11:00".into(),
        end_time: "12:00".into(),
        location: "개인연습실".into(),
        status: LessonStatus::Scheduled,
        subject: Subject::Dance,
        memo: None,
        teacher_id: "t2".into(),
        teacher_name: "김무용".into(),
        is_private: true,
        private_student_ids: Some(vec!["s3".into()]),
        request_id: Some("pr3".into()),
    });
    lessons
}

pub fn journals() -> Vec<LessonJournal> {
    vec![
        LessonJournal {
            id: "j1".into(),
            lesson_id: "l3".into(),
            author_id: "t1".into(),
            author_name: "박선생".into(),
            journal_type: JournalType::Teacher,
            content: "즉흥 연기 훈련 진행. 학생들의 순발력이 향상되고 있음. 감정 전환 연습에서 김배우 학생이 큰 발전을 보임.".into(),
            objectives: Some("감정 전환 및 즉흥 반응 훈련".into()),
            next_plan: Some("다음 수업에서 2인 장면 연기 시작 예정".into()),
            date: ts_offset(-2),
        },
        LessonJournal {
            id: "j2".into(),
            lesson_id: "l3".into(),
            author_id: "s1".into(),
            author_name: "김배우".into(),
            journal_type: JournalType::Student,
            content: "오늘 즉흥 연기가 처음에는 어려웠지만 점점 자연스러워진 것 같아요. 감정 전환이 아직 어색하지만 계속 연습해보겠습니다!".into(),
            objectives: None,
            next_plan: None,
            date: ts_offset(-2),
        },
        LessonJournal {
            id: "j3".into(),
            lesson_id: "l4".into(),
            author_id: "t1".into(),
            author_name: "박선생".into(),
            journal_type: JournalType::Teacher,
            content: "호흡 훈련과 발성 기초. 복식호흡 이해도 확인. 전반적으로 양호하나 이연기 학생은 추가 지도 필요.".into(),
            objectives: Some("발성 기초 및 호흡법".into()),
            next_plan: Some("발성 심화 + 대사 전달력 훈련".into()),
            date: ts_offset(-4),
        },
    ]
}

pub fn attendance() -> Vec<AttendanceRecord> {
    let rec = |id: &str, lesson: &str, student: &str, name: &str, status: AttendanceStatus| {
        AttendanceRecord {
            id: id.into(),
            lesson_id: lesson.into(),
            student_id: student.into(),
            student_name: name.into(),
            status,
            note: None,
        }
    };
    let mut records = vec![
        rec("at1", "l3", "s1", "김배우", AttendanceStatus::Present),
        rec("at2", "l3", "s2", "이연기", AttendanceStatus::Present),
        rec("at3", "l4", "s1", "김배우", AttendanceStatus::Present),
        rec("at4", "l4", "s2", "이연기", AttendanceStatus::Late),
        rec("at5", "l5", "s3", "최무대", AttendanceStatus::Present),
        rec("at6", "l5", "s4", "박감정", AttendanceStatus::Absent),
    ];
    records[3].note = Some("교통 사정으로 10분 지각".into());
    records
}

pub fn private_requests() -> Vec<PrivateLessonRequest> {
    vec![
        PrivateLessonRequest {
            id: "pr1".into(),
            student_id: "s1".into(),
            student_name: "김배우".into(),
            teacher_id: "t1".into(),
            teacher_name: "박선생".into(),
            subject: Subject::Acting,
            preferred_date: date_offset(1),
            preferred_start_time: "10:00".into(),
            preferred_end_time: "11:00".into(),
            reason: "독백 준비를 위해 개인 지도를 받고 싶습니다.".into(),
            status: RequestStatus::Approved,
            response_note: Some("좋습니다. 개인연습실에서 만나요.".into()),
            created_at: ts_offset(-3),
            responded_at: Some(ts_offset(-2)),
        },
        PrivateLessonRequest {
            id: "pr2".into(),
            student_id: "s2".into(),
            student_name: "이연기".into(),
            teacher_id: "t1".into(),
            teacher_name: "박선생".into(),
            subject: Subject::Musical,
            preferred_date: date_offset(5),
            preferred_start_time: "15:00".into(),
            preferred_end_time: "16:00".into(),
            reason: "뮤지컬 넘버 개인 연습이 필요합니다.".into(),
            status: RequestStatus::Pending,
            response_note: None,
            created_at: ts_offset(-1),
            responded_at: None,
        },
        PrivateLessonRequest {
            id: "pr3".into(),
            student_id: "s3".into(),
            student_name: "최무대".into(),
            teacher_id: "t2".into(),
            teacher_name: "김무용".into(),
            subject: Subject::Dance,
            preferred_date: date_offset(3),
            preferred_start_time: "11:00".into(),
            preferred_end_time: "12:00".into(),
            reason: "안무 동작이 어려워서 추가 지도 부탁드립니다.".into(),
            status: RequestStatus::Approved,
            response_note: Some("그날 시간 괜찮습니다.".into()),
            created_at: ts_offset(-5),
            responded_at: Some(ts_offset(-4)),
        },
    ]
}

pub fn assignments() -> Vec<Assignment> {
    vec![
        Assignment {
            id: "a1".into(),
            title: "햄릿 독백 분석".into(),
            description: "3막 1장 \"죽느냐 사느냐\" 독백을 분석하고 감정선을 서술하세요.".into(),
            due_date: date_offset(2),
            student_id: "s1".into(),
            student_name: "김배우".into(),
            status: AssignmentStatus::Pending,
            submission_text: None,
            submission_file_url: None,
            feedback: None,
            ai_analysis: None,
            grade: None,
        },
        Assignment {
            id: "a2".into(),
            title: "자유 연기 영상 제출".into(),
            description: "준비한 자유 연기 영상을 촬영하여 제출하세요. (2분 이내)".into(),
            due_date: date_offset(5),
            student_id: "s1".into(),
            student_name: "김배우".into(),
            status: AssignmentStatus::Submitted,
            submission_text: Some("영상 링크 첨부합니다: youtube.com/short_link".into()),
            submission_file_url: Some("video.mp4".into()),
            feedback: None,
            ai_analysis: None,
            grade: None,
        },
        Assignment {
            id: "a3".into(),
            title: "발성 연습 일지".into(),
            description: "일주일간의 호흡 훈련 기록을 제출하세요.".into(),
            due_date: date_offset(-1),
            student_id: "s1".into(),
            student_name: "김배우".into(),
            status: AssignmentStatus::Graded,
            submission_text: Some("매일 아침 30분씩 훈련했습니다.".into()),
            submission_file_url: None,
            feedback: Some("성실함이 보입니다. 아주 좋아요!".into()),
            ai_analysis: None,
            grade: Some("A".into()),
        },
    ]
}

pub fn diet_logs() -> Vec<DietLog> {
    vec![
        DietLog {
            id: "d1".into(),
            student_id: "s1".into(),
            student_name: "김배우".into(),
            date: ts_offset(0),
            meal_type: MealType::Lunch,
            description: "닭가슴살 샐러드, 고구마 1개".into(),
            calories: Some(450),
            ai_advice: Some("단백질 섭취가 좋습니다. 드레싱 양만 조절하면 완벽해요!".into()),
            image_url: None,
        },
        DietLog {
            id: "d2".into(),
            student_id: "s1".into(),
            student_name: "김배우".into(),
            date: ts_offset(-1),
            meal_type: MealType::Dinner,
            description: "현미밥, 된장찌개, 생선구이".into(),
            calories: Some(600),
            ai_advice: Some("나트륨 섭취에 조금 더 신경 써주세요.".into()),
            image_url: None,
        },
    ]
}

pub fn questions() -> Vec<Question> {
    vec![
        Question {
            id: "q1".into(),
            title: "오디션 자유연기 질문입니다.".into(),
            content: "희극적인 독백과 비극적인 독백 중 어떤 것을 준비하는 게 입시에 더 유리할까요? 제 이미지는 좀 밝은 편입니다.".into(),
            author_id: "s1".into(),
            author_name: "김배우".into(),
            date: ts_offset(-2),
            views: 12,
            answers: vec![Answer {
                id: "an1".into(),
                content: "본인의 이미지와 가장 잘 맞는 것을 선택하는 것이 베스트입니다! 밝은 이미지를 반전시키는 비극도 좋지만, 입시에서는 본인의 매력을 가장 잘 보여줄 수 있는 옷을 입는 것이 중요해요.".into(),
                author_name: "박선생".into(),
                author_role: AnswerAuthor::Teacher,
                date: ts_offset(-2),
                is_ai: Some(false),
            }],
        },
        Question {
            id: "q2".into(),
            title: "발성 연습할 때 목이 아파요".into(),
            content: "고음을 낼 때 자꾸 목이 조이는 느낌이 듭니다. 어떻게 해결해야 할까요?".into(),
            author_id: "s2".into(),
            author_name: "이연기".into(),
            date: ts_offset(-3),
            views: 8,
            answers: vec![],
        },
    ]
}

pub fn evaluations() -> Vec<Evaluation> {
    let eval = |id: &str,
                student_id: &str,
                student_name: &str,
                subject: Subject,
                period: &str,
                scores: Scores,
                comment: &str,
                date: &str| Evaluation {
        id: id.into(),
        student_id: student_id.into(),
        student_name: student_name.into(),
        evaluator_id: "t1".into(),
        evaluator_name: "박선생".into(),
        class_id: Some("c1".into()),
        class_name: Some("입시 A반 (심화)".into()),
        subject,
        period: period.into(),
        scores,
        comment: comment.into(),
        date: date.into(),
    };
    vec![
        eval(
            "ev1",
            "s1",
            "김배우",
            Subject::Acting,
            "2024년 1월",
            Scores { acting: 4, expression: 5, creativity: 3, teamwork: 4, effort: 5 },
            "감정 표현력이 뛰어나고 수업에 대한 열정이 돋보입니다. 즉흥 연기에서 좀 더 창의적인 선택을 할 수 있도록 연습해보세요.",
            "2024-01-15",
        ),
        eval(
            "ev2",
            "s1",
            "김배우",
            Subject::Acting,
            "2024년 2월",
            Scores { acting: 5, expression: 5, creativity: 4, teamwork: 5, effort: 5 },
            "전월 대비 창의성 부분에서 눈에 띄는 향상이 있었습니다. 이 기세를 유지해주세요!",
            "2024-02-15",
        ),
        eval(
            "ev3",
            "s2",
            "이연기",
            Subject::Dance,
            "2024년 1월",
            Scores { acting: 3, expression: 3, creativity: 4, teamwork: 3, effort: 4 },
            "창의적인 해석이 돋보이지만 기본기를 더 다져야 합니다. 발성 연습에 좀 더 시간을 투자하세요.",
            "2024-01-15",
        ),
        eval(
            "ev4",
            "s1",
            "김배우",
            Subject::Dance,
            "2024년 2월",
            Scores { acting: 3, expression: 4, creativity: 3, teamwork: 4, effort: 4 },
            "무용 기초 동작이 안정적이며 리듬감이 좋습니다. 유연성 훈련을 병행하면 더 좋은 결과가 있을 것입니다.",
            "2024-02-15",
        ),
    ]
}

pub fn portfolios() -> Vec<PortfolioItem> {
    vec![
        PortfolioItem {
            id: "pf1".into(),
            student_id: "s1".into(),
            student_name: "김배우".into(),
            title: "햄릿 독백 - \"죽느냐 사느냐\"".into(),
            description: "3막 1장 햄릿의 독백 연기입니다. 고뇌와 번민의 감정선을 중심으로 연기했습니다.".into(),
            video_url: "https://example.com/video1".into(),
            category: "독백".into(),
            tags: vec!["셰익스피어".into(), "비극".into(), "입시준비".into()],
            comments: vec![PortfolioComment {
                id: "pc1".into(),
                author_id: "t1".into(),
                author_name: "박선생".into(),
                content: "감정의 깊이가 인상적이에요. 중간 부분에서 호흡을 좀 더 길게 가져가면 좋겠어요.".into(),
                date: "2024-01-20".into(),
            }],
            date: "2024-01-18".into(),
        },
        PortfolioItem {
            id: "pf2".into(),
            student_id: "s1".into(),
            student_name: "김배우".into(),
            title: "창작 즉흥극 - 카페 장면".into(),
            description: "수업 시간에 진행한 즉흥 장면 연기입니다. 파트너와의 호흡이 좋았습니다.".into(),
            video_url: "https://example.com/video2".into(),
            category: "장면연기".into(),
            tags: vec!["즉흥".into(), "2인연기".into()],
            comments: vec![],
            date: "2024-02-10".into(),
        },
    ]
}

pub fn events() -> Vec<CompetitionEvent> {
    let item = |id: &str, text: &str, completed: bool| ChecklistItem {
        id: id.into(),
        text: text.into(),
        completed,
    };
    vec![
        CompetitionEvent {
            id: "ce1".into(),
            title: "한예종 실기 시험".into(),
            date: date_offset(40),
            location: "한국예술종합학교".into(),
            status: EventStatus::Upcoming,
            description: Some("2024학년도 정시 실기고사".into()),
            creator_id: "t1".into(),
            checklist: vec![
                item("ck1", "자유 독백 2편 준비", true),
                item("ck2", "지정 독백 연습", true),
                item("ck3", "즉흥 연기 대비 연습", false),
                item("ck4", "의상 준비", false),
                item("ck5", "이동 경로 확인", false),
            ],
            ai_prep_tips: None,
        },
        CompetitionEvent {
            id: "ce2".into(),
            title: "청소년 연극 경연대회".into(),
            date: date_offset(14),
            location: "국립극장 달오름극장".into(),
            status: EventStatus::Upcoming,
            description: Some("제15회 전국 청소년 연극 경연대회".into()),
            creator_id: "t1".into(),
            checklist: vec![
                item("ck6", "단체 장면 연습", true),
                item("ck7", "소품 준비", false),
            ],
            ai_prep_tips: None,
        },
        CompetitionEvent {
            id: "ce3".into(),
            title: "뮤지컬 워크숍".into(),
            date: date_offset(-30),
            location: "뮤즈 아카데미".into(),
            status: EventStatus::Completed,
            description: Some("뮤지컬 보컬 마스터클래스".into()),
            creator_id: "t1".into(),
            checklist: vec![
                item("ck8", "노래 2곡 준비", true),
                item("ck9", "악보 출력", true),
            ],
            ai_prep_tips: None,
        },
    ]
}

pub fn chats() -> Vec<ChatMessage> {
    vec![
        ChatMessage {
            id: "m1".into(),
            class_id: "c1".into(),
            sender_id: "t1".into(),
            sender_name: "박선생".into(),
            sender_role: Role::Teacher,
            content: "A반 여러분, 오늘 수업 10분 늦게 시작합니다. 강의실 302호로 오세요!".into(),
            timestamp: ts_offset(0),
            avatar: "https://picsum.photos/201".into(),
        },
        ChatMessage {
            id: "m2".into(),
            class_id: "c1".into(),
            sender_id: "s1".into(),
            sender_name: "김배우".into(),
            sender_role: Role::Student,
            content: "네 알겠습니다 선생님!".into(),
            timestamp: ts_offset(0),
            avatar: "https://picsum.photos/200".into(),
        },
    ]
}

pub fn notifications() -> Vec<Notification> {
    vec![
        Notification {
            id: "n1".into(),
            kind: NotificationKind::Info,
            message: "새로운 공지사항이 등록되었습니다: 10월 모의평가 안내".into(),
            date: ts_offset(0),
            read: false,
        },
        Notification {
            id: "n2".into(),
            kind: NotificationKind::Success,
            message: "과제 \"독백 분석\" 채점이 완료되었습니다.".into(),
            date: ts_offset(-1),
            read: true,
        },
    ]
}
