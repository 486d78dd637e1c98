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
fn approval_creates_exactly_one_lesson_and_is_terminal() {
    let workspace = temp_dir("musead-approval");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    // Seeded pr2: s2 asking t1 for a musical lesson, still pending.
    let pending = request(
        &mut stdin,
        &mut reader,
        "2",
        "requests.list",
        json!({ "userId": "t1" }),
    );
    let reqs = pending["result"]["requests"].as_array().expect("requests");
    assert_eq!(reqs.len(), 1);
    let req = &reqs[0];
    assert_eq!(req["id"], "pr2");
    let date = req["preferredDate"].as_str().unwrap().to_string();

    let approved = request(
        &mut stdin,
        &mut reader,
        "3",
        "requests.approve",
        json!({ "userId": "t1", "requestId": "pr2" }),
    );
    assert_eq!(approved["ok"], true);
    let lesson = &approved["result"]["lesson"];
    assert_eq!(lesson["isPrivate"], true);
    assert_eq!(lesson["date"], date.as_str());
    assert_eq!(lesson["startTime"], "15:00");
    assert_eq!(lesson["endTime"], "16:00");
    assert_eq!(lesson["privateStudentIds"], json!(["s2"]));
    assert_eq!(lesson["requestId"], "pr2");
    assert_eq!(lesson["teacherId"], "t1");
    // s2 is enrolled in c1 and c1 maps musical -> t1, so the lesson
    // attaches to that class.
    assert_eq!(lesson["classId"], "c1");
    assert_eq!(approved["result"]["request"]["status"], "approved");
    assert!(approved["result"]["request"]["respondedAt"].is_string());

    // Approving a decided request must conflict, not mint a second lesson.
    let again = request(
        &mut stdin,
        &mut reader,
        "4",
        "requests.approve",
        json!({ "userId": "t1", "requestId": "pr2" }),
    );
    assert_eq!(again["ok"], false);
    assert_eq!(again["error"]["code"], "conflict");

    let all = request(
        &mut stdin,
        &mut reader,
        "5",
        "lessons.list",
        json!({ "userId": "d1" }),
    );
    let from_pr2 = all["result"]["lessons"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|l| l["requestId"] == "pr2")
        .count();
    assert_eq!(from_pr2, 1);

    // The lesson is visible to the requesting student, not to classmates.
    let s2_lessons = request(
        &mut stdin,
        &mut reader,
        "6",
        "lessons.list",
        json!({ "userId": "s2", "date": date }),
    );
    assert!(s2_lessons["result"]["lessons"]
        .as_array()
        .unwrap()
        .iter()
        .any(|l| l["requestId"] == "pr2"));
    let s1_lessons = request(
        &mut stdin,
        &mut reader,
        "7",
        "lessons.list",
        json!({ "userId": "s1", "date": date }),
    );
    assert!(!s1_lessons["result"]["lessons"]
        .as_array()
        .unwrap()
        .iter()
        .any(|l| l["requestId"] == "pr2"));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn rejection_records_note_and_freezes_the_request() {
    let workspace = temp_dir("musead-rejection");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let submitted = request(
        &mut stdin,
        &mut reader,
        "2",
        "requests.submit",
        json!({
            "userId": "s1",
            "teacherId": "t1",
            "subject": "acting",
            "preferredDate": "2099-04-01",
            "reason": "테스트 신청"
        }),
    );
    assert_eq!(submitted["ok"], true);
    let request_id = submitted["result"]["request"]["id"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(submitted["result"]["request"]["preferredStartTime"], "10:00");

    // Another teacher may not decide it.
    let wrong_teacher = request(
        &mut stdin,
        &mut reader,
        "3",
        "requests.reject",
        json!({ "userId": "t2", "requestId": request_id }),
    );
    assert_eq!(wrong_teacher["error"]["code"], "forbidden");

    let rejected = request(
        &mut stdin,
        &mut reader,
        "4",
        "requests.reject",
        json!({ "userId": "t1", "requestId": request_id, "responseNote": "일정이 맞지 않습니다" }),
    );
    assert_eq!(rejected["ok"], true);
    assert_eq!(rejected["result"]["request"]["status"], "rejected");
    assert_eq!(
        rejected["result"]["request"]["responseNote"],
        "일정이 맞지 않습니다"
    );

    // Terminal: neither approval nor a second rejection may follow.
    let approve_after = request(
        &mut stdin,
        &mut reader,
        "5",
        "requests.approve",
        json!({ "userId": "t1", "requestId": request_id }),
    );
    assert_eq!(approve_after["error"]["code"], "conflict");

    // The student still follows their own request through its lifecycle.
    let own = request(
        &mut stdin,
        &mut reader,
        "6",
        "requests.list",
        json!({ "userId": "s1" }),
    );
    assert!(own["result"]["requests"]
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r["id"] == request_id.as_str() && r["status"] == "rejected"));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
