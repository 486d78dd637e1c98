use std::path::PathBuf;

use serde_json::{json, Value as JsonValue};

use crate::backup;
use crate::ipc::error::{ok, toast};
use crate::ipc::helpers::*;
use crate::ipc::types::{AppState, Request};
use crate::store::Store;

fn export_bundle(params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let workspace = PathBuf::from(required_str(params, "workspacePath")?);
    let out = PathBuf::from(required_str(params, "outPath")?);

    let summary = backup::export_workspace_bundle(&workspace, &out)
        .map_err(|e| HandlerErr::new("export_failed", format!("{e:#}")))?;

    Ok(json!({
        "bundleFormat": summary.bundle_format,
        "entryCount": summary.entry_count,
        "dbSha256": summary.db_sha256,
        "toast": toast("success", "백업 파일이 저장되었습니다."),
    }))
}

fn import_bundle(state: &mut AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let workspace = PathBuf::from(required_str(params, "workspacePath")?);
    let in_path = PathBuf::from(required_str(params, "inPath")?);

    // Release the open database before the file underneath it is replaced.
    let reopen = state.workspace.as_deref() == Some(workspace.as_path());
    if reopen {
        state.store = None;
    }

    let summary = backup::import_workspace_bundle(&in_path, &workspace)
        .map_err(|e| HandlerErr::new("import_failed", format!("{e:#}")))?;

    if reopen {
        state.store = Some(Store::open(&workspace)?);
    }

    Ok(json!({
        "bundleFormatDetected": summary.bundle_format_detected,
        "toast": toast("success", "백업을 불러왔습니다."),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "backup.exportWorkspaceBundle" => export_bundle(&req.params),
        "backup.importWorkspaceBundle" => import_bundle(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
