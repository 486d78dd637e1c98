use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::collection::PersistedCollection;
use crate::ipc::error::{err, toast};
use crate::ipc::types::AppState;
use crate::model::{Identified, Role, TransitionError, User};
use crate::seed;
use crate::store::Store;

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<JsonValue>,
}

impl HandlerErr {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        HandlerErr {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_params(message: impl Into<String>) -> Self {
        Self::new("bad_params", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("not_found", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("conflict", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("forbidden", message)
    }

    /// Attach an error toast so the caller surfaces the failure without
    /// treating it as fatal.
    pub fn with_toast(mut self, message: impl Into<String>) -> Self {
        let mut details = self.details.take().unwrap_or_else(|| JsonValue::Object(Default::default()));
        details["toast"] = toast("error", message);
        self.details = Some(details);
        self
    }

    pub fn response(self, id: &str) -> JsonValue {
        err(id, self.code, self.message, self.details)
    }
}

impl From<anyhow::Error> for HandlerErr {
    fn from(e: anyhow::Error) -> Self {
        Self::new("internal", format!("{e:#}"))
    }
}

impl From<crate::store::StoreError> for HandlerErr {
    fn from(e: crate::store::StoreError) -> Self {
        Self::new("store_failed", e.to_string())
    }
}

impl From<TransitionError> for HandlerErr {
    fn from(e: TransitionError) -> Self {
        Self::conflict(e.to_string())
    }
}

pub fn open_store<'a>(state: &'a AppState) -> Result<&'a Store, HandlerErr> {
    state
        .store
        .as_ref()
        .ok_or_else(|| HandlerErr::new("no_workspace", "select a workspace first"))
}

pub fn load<T>(
    store: &Store,
    key: &'static str,
    seed: fn() -> Vec<T>,
) -> Result<PersistedCollection<T>, HandlerErr>
where
    T: serde::Serialize + DeserializeOwned + Identified,
{
    Ok(PersistedCollection::load(store, key, seed)?)
}

pub fn required_str(params: &JsonValue, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn opt_str(params: &JsonValue, key: &str) -> Result<Option<String>, HandlerErr> {
    match params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => {
            let s = v
                .as_str()
                .ok_or_else(|| HandlerErr::bad_params(format!("{} must be string or null", key)))?
                .trim()
                .to_string();
            Ok(if s.is_empty() { None } else { Some(s) })
        }
    }
}

pub fn required_i64(params: &JsonValue, key: &str) -> Result<i64, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn required_month(params: &JsonValue) -> Result<(i32, u32), HandlerErr> {
    let year = required_i64(params, "year")? as i32;
    let month = required_i64(params, "month")?;
    if !(1..=12).contains(&month) {
        return Err(HandlerErr::bad_params("month must be between 1 and 12"));
    }
    Ok((year, month as u32))
}

/// Parses a string field into one of the wire enums (subject, statuses,
/// meal types) through its serde form.
pub fn required_enum<T: DeserializeOwned>(params: &JsonValue, key: &str) -> Result<T, HandlerErr> {
    let raw = required_str(params, key)?;
    serde_json::from_value(JsonValue::String(raw.clone()))
        .map_err(|_| HandlerErr::bad_params(format!("invalid {}: {}", key, raw)))
}

/// Resolves `params.userId` against the fixed user directory. Every scoped
/// method names its acting user explicitly; there is no session.
pub fn acting_user(params: &JsonValue) -> Result<User, HandlerErr> {
    let user_id = required_str(params, "userId")?;
    seed::users()
        .into_iter()
        .find(|u| u.id == user_id)
        .ok_or_else(|| HandlerErr::not_found(format!("unknown user: {}", user_id)))
}

pub fn require_staff(user: &User) -> Result<(), HandlerErr> {
    if user.role.is_staff() {
        Ok(())
    } else {
        Err(HandlerErr::forbidden("staff only"))
    }
}

pub fn require_student(user: &User) -> Result<(), HandlerErr> {
    if user.role == Role::Student {
        Ok(())
    } else {
        Err(HandlerErr::forbidden("students only"))
    }
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn now_ts() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}
