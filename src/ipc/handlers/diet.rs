use chrono::Utc;
use serde_json::{json, Value as JsonValue};

use crate::calendar;
use crate::ipc::error::{ok, toast};
use crate::ipc::helpers::*;
use crate::ipc::types::{AppState, Request};
use crate::model::{DietLog, MealType};
use crate::scope;
use crate::seed;
use crate::store;

fn diet_list(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    let date_filter = opt_str(params, "date")?;

    let logs = load(st, store::DIET_KEY, seed::diet_logs)?;
    let scope = scope::for_user(&user);
    let mut visible: Vec<&DietLog> = logs
        .list()
        .iter()
        .filter(|l| scope.sees_student_record(&l.student_id))
        .collect();
    if let Some(date) = &date_filter {
        visible.retain(|l| l.date.starts_with(date.as_str()));
    }
    // Newest first.
    visible.sort_by(|a, b| b.date.cmp(&a.date));

    Ok(json!({ "logs": serde_json::to_value(&visible).unwrap_or_default() }))
}

fn diet_calendar(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    let (year, month) = required_month(params)?;

    let logs = load(st, store::DIET_KEY, seed::diet_logs)?;
    let scope = scope::for_user(&user);
    let visible: Vec<DietLog> = logs
        .list()
        .iter()
        .filter(|l| scope.sees_student_record(&l.student_id))
        .cloned()
        .collect();

    let grid = calendar::month_grid(year, month, &visible, |l| l.date.as_str())
        .ok_or_else(|| HandlerErr::bad_params("invalid year/month"))?;

    let days: Vec<JsonValue> = grid
        .days
        .iter()
        .map(|cell| {
            let total_calories: i64 = cell.items.iter().filter_map(|l| l.calories).sum();
            let dots: Vec<JsonValue> = cell
                .items
                .iter()
                .map(|l| json!({ "id": l.id, "mealType": l.meal_type }))
                .collect();
            json!({
                "day": cell.day,
                "date": cell.date,
                "logs": dots,
                "totalCalories": total_calories,
            })
        })
        .collect();

    Ok(json!({
        "year": grid.year,
        "month": grid.month,
        "leadingBlanks": grid.leading_blanks,
        "days": days,
    }))
}

fn diet_add(state: &AppState, params: &JsonValue) -> Result<JsonValue, HandlerErr> {
    let st = open_store(state)?;
    let user = acting_user(params)?;
    require_student(&user)?;
    let meal_type: MealType = required_enum(params, "mealType")?;
    let description = opt_str(params, "description")?;
    let image_url = opt_str(params, "imageDataUri")?;
    if description.is_none() && image_url.is_none() {
        return Err(HandlerErr::bad_params(
            "a description or a photo is required",
        ));
    }

    // Advisor first: a failed analysis records nothing.
    let analysis = state
        .advisor
        .analyze_diet(description.as_deref().unwrap_or_default(), image_url.as_deref())
        .map_err(|e| {
            HandlerErr::new("advisor_failed", e.to_string())
                .with_toast("식단 분석 중 오류가 발생했습니다.")
        })?;

    // An explicit date pins the log to that day at the current time.
    let date = match opt_str(params, "date")? {
        Some(day) => {
            if calendar::parse_date(&day).is_none() {
                return Err(HandlerErr::bad_params("date must be YYYY-MM-DD"));
            }
            format!("{}T{}Z", day, Utc::now().format("%H:%M:%S%.3f"))
        }
        None => now_ts(),
    };

    let log = DietLog {
        id: new_id(),
        student_id: user.id.clone(),
        student_name: user.name.clone(),
        date,
        meal_type,
        description: description.unwrap_or_else(|| "사진으로 기록된 식단".into()),
        calories: Some(analysis.calories),
        ai_advice: Some(analysis.advice),
        image_url,
    };

    let mut logs = load(st, store::DIET_KEY, seed::diet_logs)?;
    logs.push_front(log.clone());
    logs.save(st)?;

    Ok(json!({
        "log": serde_json::to_value(&log).unwrap_or_default(),
        "toast": toast("success", "식단이 기록되었습니다. 🥗"),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "diet.list" => diet_list(state, &req.params),
        "diet.calendar" => diet_calendar(state, &req.params),
        "diet.add" => diet_add(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::FailingAdvisor;
    use crate::ipc::types::Request;
    use crate::store::Store;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_workspace(prefix: &str) -> PathBuf {
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

    #[test]
    fn advisor_failure_surfaces_toast_and_records_nothing() {
        let ws = temp_workspace("musead-diet-advisor-fail");
        let mut state = AppState {
            workspace: Some(ws.clone()),
            store: Some(Store::open(&ws).expect("open")),
            advisor: Box::new(FailingAdvisor),
        };

        let req = Request {
            id: "1".into(),
            method: "diet.add".into(),
            params: json!({
                "userId": "s1",
                "mealType": "lunch",
                "description": "닭가슴살 샐러드",
            }),
        };
        let resp = try_handle(&mut state, &req).expect("handled");
        assert_eq!(resp["ok"], false);
        assert_eq!(resp["error"]["code"], "advisor_failed");
        assert_eq!(resp["error"]["details"]["toast"]["kind"], "error");

        // Nothing was written: the diet slot is still unmaterialized.
        let st = state.store.as_ref().unwrap();
        assert!(st.get(store::DIET_KEY).expect("get").is_none());
        let _ = std::fs::remove_dir_all(ws);
    }

    #[test]
    fn add_requires_description_or_photo() {
        let ws = temp_workspace("musead-diet-empty");
        let mut state = AppState {
            workspace: Some(ws.clone()),
            store: Some(Store::open(&ws).expect("open")),
            advisor: Box::new(crate::ai::OfflineAdvisor),
        };

        let req = Request {
            id: "1".into(),
            method: "diet.add".into(),
            params: json!({ "userId": "s1", "mealType": "snack" }),
        };
        let resp = try_handle(&mut state, &req).expect("handled");
        assert_eq!(resp["ok"], false);
        assert_eq!(resp["error"]["code"], "bad_params");
        assert!(state
            .store
            .as_ref()
            .unwrap()
            .get(store::DIET_KEY)
            .expect("get")
            .is_none());
        let _ = std::fs::remove_dir_all(ws);
    }
}
