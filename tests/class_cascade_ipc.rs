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
fn deleting_a_class_removes_its_lessons_journals_attendance_and_chats() {
    let workspace = temp_dir("musead-class-cascade");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    // Materialize every affected slot before deleting.
    let _ = request(
        &mut stdin,
        &mut reader,
        "2",
        "lessons.list",
        json!({ "userId": "d1" }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "3",
        "attendance.record",
        json!({ "userId": "t2", "lessonId": "l5", "studentId": "s3", "status": "present" }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "4",
        "journals.add",
        json!({ "userId": "t2", "lessonId": "l5", "content": "무용 기본기 점검" }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "5",
        "chat.send",
        json!({ "userId": "s3", "classId": "c2", "content": "마지막 메시지" }),
    );

    let deleted = request(
        &mut stdin,
        &mut reader,
        "6",
        "classes.delete",
        json!({ "userId": "d1", "classId": "c2" }),
    );
    assert_eq!(deleted["ok"], true);
    // Seeded c2 lessons: l2, l5, and the attached private lesson l10.
    assert_eq!(deleted["result"]["removedLessons"], 3);

    let lessons = request(
        &mut stdin,
        &mut reader,
        "7",
        "lessons.list",
        json!({ "userId": "d1" }),
    );
    assert!(lessons["result"]["lessons"]
        .as_array()
        .unwrap()
        .iter()
        .all(|l| l["classId"] != "c2"));

    // The lesson is gone, so its journals and attendance are unreachable
    // and the chat channel no longer lists the class.
    let journals = request(
        &mut stdin,
        &mut reader,
        "8",
        "journals.list",
        json!({ "userId": "d1", "lessonId": "l5" }),
    );
    assert_eq!(journals["error"]["code"], "not_found");
    let channels = request(
        &mut stdin,
        &mut reader,
        "9",
        "chat.channels",
        json!({ "userId": "d1" }),
    );
    assert!(channels["result"]["channels"]
        .as_array()
        .unwrap()
        .iter()
        .all(|c| c["classId"] != "c2"));

    drop(stdin);
    let _ = child.wait();

    // The cascade scrubbed the slots themselves, not just the views.
    let conn = rusqlite::Connection::open(workspace.join("muse.sqlite3")).expect("open db");
    for key in ["muse_journals", "muse_attendance", "muse_chats"] {
        let value: String = conn
            .query_row("SELECT value FROM slots WHERE key = ?", [key], |r| r.get(0))
            .expect("slot value");
        assert!(
            !value.contains("\"l5\"") && !value.contains("\"c2\""),
            "{} still references deleted class data: {}",
            key,
            value
        );
    }

    let _ = std::fs::remove_dir_all(workspace);
}
