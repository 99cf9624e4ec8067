use axum::Json;
use chrono::Utc;
use serde_json::{Value, json};

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "time": Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    }))
}
