mod ai;
mod backup;
mod calendar;
mod collection;
mod ipc;
mod linkage;
mod model;
mod scope;
mod seed;
mod store;

use std::io::{self, BufRead, Write};

use log::{debug, warn};

fn main() {
    // stdout carries IPC frames; diagnostics stay on stderr.
    env_logger::builder()
        .target(env_logger::Target::Stderr)
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let mut state = ipc::AppState {
        workspace: None,
        store: None,
        advisor: Box::new(ai::OfflineAdvisor),
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id; report and move on.
                warn!("dropping undecodable request: {}", e);
                let _ = writeln!(
                    stdout,
                    "{{\"ok\":false,\"error\":{{\"code\":\"bad_json\",\"message\":\"{}\"}}}}",
                    e
                );
                let _ = stdout.flush();
                continue;
            }
        };

        debug!("dispatch {} ({})", req.method, req.id);
        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
}
