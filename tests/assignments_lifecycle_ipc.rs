use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_musead");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn musead");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({ "id": id, "method": method, "params": params });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

#[test]
fn assignment_lifecycle_moves_forward_only() {
    let workspace = temp_dir("musead-assignment-lifecycle");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let created = request(
        &mut stdin,
        &mut reader,
        "2",
        "assignments.create",
        json!({
            "userId": "t1",
            "studentId": "s2",
            "title": "독백 연습 기록",
            "dueDate": "2099-05-10"
        }),
    );
    let id = created["result"]["assignment"]["id"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(created["result"]["assignment"]["status"], "pending");
    assert_eq!(created["result"]["assignment"]["studentName"], "이연기");

    // Grading a pending assignment skips a state and must fail.
    let skip = request(
        &mut stdin,
        &mut reader,
        "3",
        "assignments.grade",
        json!({ "userId": "t1", "assignmentId": id, "grade": "A" }),
    );
    assert_eq!(skip["error"]["code"], "conflict");

    // Only the assigned student may submit.
    let wrong_student = request(
        &mut stdin,
        &mut reader,
        "4",
        "assignments.submit",
        json!({ "userId": "s1", "assignmentId": id, "submissionText": "남의 과제" }),
    );
    assert_eq!(wrong_student["error"]["code"], "forbidden");

    let submitted = request(
        &mut stdin,
        &mut reader,
        "5",
        "assignments.submit",
        json!({ "userId": "s2", "assignmentId": id, "submissionText": "연습 일지입니다" }),
    );
    assert_eq!(submitted["result"]["assignment"]["status"], "submitted");
    assert_eq!(
        submitted["result"]["assignment"]["submissionText"],
        "연습 일지입니다"
    );

    let resubmit = request(
        &mut stdin,
        &mut reader,
        "6",
        "assignments.submit",
        json!({ "userId": "s2", "assignmentId": id, "submissionText": "다시" }),
    );
    assert_eq!(resubmit["error"]["code"], "conflict");

    // AI feedback merges into the submitted assignment.
    let analyzed = request(
        &mut stdin,
        &mut reader,
        "7",
        "assignments.aiFeedback",
        json!({ "userId": "s2", "assignmentId": id }),
    );
    assert!(analyzed["result"]["assignment"]["aiAnalysis"].is_string());

    // Students cannot grade.
    let student_grade = request(
        &mut stdin,
        &mut reader,
        "8",
        "assignments.grade",
        json!({ "userId": "s2", "assignmentId": id, "grade": "A" }),
    );
    assert_eq!(student_grade["error"]["code"], "forbidden");

    let graded = request(
        &mut stdin,
        &mut reader,
        "9",
        "assignments.grade",
        json!({ "userId": "t1", "assignmentId": id, "grade": "A", "feedback": "좋아요" }),
    );
    assert_eq!(graded["result"]["assignment"]["status"], "graded");
    assert_eq!(graded["result"]["assignment"]["grade"], "A");
    assert_eq!(graded["result"]["assignment"]["feedback"], "좋아요");

    // Graded is terminal for both edges.
    let regrade = request(
        &mut stdin,
        &mut reader,
        "10",
        "assignments.grade",
        json!({ "userId": "t1", "assignmentId": id, "grade": "B" }),
    );
    assert_eq!(regrade["error"]["code"], "conflict");

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn calendar_stamps_a_day_once_everything_is_settled() {
    let workspace = temp_dir("musead-assignment-stamp");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    // Two assignments due the same day, one still pending.
    for (i, title) in ["연기 일지", "호흡 훈련"].iter().enumerate() {
        let _ = request(
            &mut stdin,
            &mut reader,
            &format!("c{}", i),
            "assignments.create",
            json!({
                "userId": "s2",
                "title": title,
                "dueDate": "2099-07-03"
            }),
        );
    }

    let before = request(
        &mut stdin,
        &mut reader,
        "cal1",
        "assignments.calendar",
        json!({ "userId": "s2", "year": 2099, "month": 7 }),
    );
    let day = &before["result"]["days"][2];
    assert_eq!(day["date"], "2099-07-03");
    assert_eq!(day["assignments"].as_array().unwrap().len(), 2);
    assert_eq!(day["allComplete"], false);

    // Settle both; the stamp appears.
    let listed = request(
        &mut stdin,
        &mut reader,
        "list",
        "assignments.list",
        json!({ "userId": "s2", "date": "2099-07-03" }),
    );
    let ids: Vec<String> = listed["result"]["assignments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids.len(), 2);
    for (i, id) in ids.iter().enumerate() {
        let _ = request(
            &mut stdin,
            &mut reader,
            &format!("sub{}", i),
            "assignments.submit",
            json!({ "userId": "s2", "assignmentId": id, "submissionText": "제출" }),
        );
    }

    let after = request(
        &mut stdin,
        &mut reader,
        "cal2",
        "assignments.calendar",
        json!({ "userId": "s2", "year": 2099, "month": 7 }),
    );
    assert_eq!(after["result"]["days"][2]["allComplete"], true);
    // A day with no work never earns the stamp.
    assert_eq!(after["result"]["days"][3]["allComplete"], false);

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
