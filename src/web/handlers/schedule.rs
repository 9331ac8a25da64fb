//! Maintenance-schedule endpoints, nested under a vehicle.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use super::AppState;
use crate::db::{
    NewScheduleItem, Patch, ScheduleItem, ScheduleItemUpdate, ScheduleRepository,
    VehicleRepository,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthSession;

const CREATE_SCHEDULE_ITEM_SCHEMA: &str = r#"{
  "type": "object",
  "additionalProperties": false,
  "properties": {
    "description": {"type": "string"},
    "due_date": {"type": "string"}
  },
  "required": ["description"]
}"#;

const UPDATE_SCHEDULE_ITEM_SCHEMA: &str = r#"{
  "type": "object",
  "additionalProperties": false,
  "properties": {
    "description": {"type": "string"},
    "due_date": {"type": ["string", "null"]}
  }
}"#;

#[derive(Debug, Deserialize)]
struct CreateScheduleItemRequest {
    description: String,
    #[serde(default)]
    due_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateScheduleItemRequest {
    #[serde(default)]
    description: Patch<String>,
    #[serde(default)]
    due_date: Patch<String>,
}

/// Resolve the vehicle through its owner before touching the sub-resource.
async fn authorize_vehicle(
    state: &AppState,
    user_id: i64,
    vehicle_id: i64,
) -> Result<(), ApiError> {
    VehicleRepository::new(state.db.pool())
        .get(user_id, vehicle_id)
        .await?;
    Ok(())
}

/// GET /v1/vehicles/{vehicleId}/schedule
pub async fn list_schedule_items(
    State(state): State<Arc<AppState>>,
    AuthSession(claims): AuthSession,
    Path(vehicle_id): Path<i64>,
) -> Result<Json<Vec<ScheduleItem>>, ApiError> {
    authorize_vehicle(&state, claims.sub, vehicle_id).await?;

    let items = ScheduleRepository::new(state.db.pool())
        .list(vehicle_id)
        .await?;
    Ok(Json(items))
}

/// POST /v1/vehicles/{vehicleId}/schedule
pub async fn create_schedule_item(
    State(state): State<Arc<AppState>>,
    AuthSession(claims): AuthSession,
    Path(vehicle_id): Path<i64>,
    body: Bytes,
) -> Result<Json<ScheduleItem>, ApiError> {
    authorize_vehicle(&state, claims.sub, vehicle_id).await?;

    let req: CreateScheduleItemRequest = state
        .schemas
        .validate_and_decode(CREATE_SCHEDULE_ITEM_SCHEMA, &body)?;

    let item = ScheduleRepository::new(state.db.pool())
        .create(
            vehicle_id,
            NewScheduleItem {
                description: req.description,
                due_date: req.due_date,
            },
        )
        .await?;
    Ok(Json(item))
}

/// GET /v1/vehicles/{vehicleId}/schedule/{scheduleItemId}
pub async fn get_schedule_item(
    State(state): State<Arc<AppState>>,
    AuthSession(claims): AuthSession,
    Path((vehicle_id, item_id)): Path<(i64, i64)>,
) -> Result<Json<ScheduleItem>, ApiError> {
    authorize_vehicle(&state, claims.sub, vehicle_id).await?;

    let item = ScheduleRepository::new(state.db.pool())
        .get(vehicle_id, item_id)
        .await?;
    Ok(Json(item))
}

/// PATCH /v1/vehicles/{vehicleId}/schedule/{scheduleItemId}
pub async fn update_schedule_item(
    State(state): State<Arc<AppState>>,
    AuthSession(claims): AuthSession,
    Path((vehicle_id, item_id)): Path<(i64, i64)>,
    body: Bytes,
) -> Result<Json<ScheduleItem>, ApiError> {
    authorize_vehicle(&state, claims.sub, vehicle_id).await?;

    let req: UpdateScheduleItemRequest = state
        .schemas
        .validate_and_decode(UPDATE_SCHEDULE_ITEM_SCHEMA, &body)?;

    let item = ScheduleRepository::new(state.db.pool())
        .update(
            vehicle_id,
            item_id,
            ScheduleItemUpdate {
                description: req.description,
                due_date: req.due_date,
            },
        )
        .await?;
    Ok(Json(item))
}

/// DELETE /v1/vehicles/{vehicleId}/schedule/{scheduleItemId}
pub async fn delete_schedule_item(
    State(state): State<Arc<AppState>>,
    AuthSession(claims): AuthSession,
    Path((vehicle_id, item_id)): Path<(i64, i64)>,
) -> Result<Json<ScheduleItem>, ApiError> {
    authorize_vehicle(&state, claims.sub, vehicle_id).await?;

    let repo = ScheduleRepository::new(state.db.pool());
    let item = repo.get(vehicle_id, item_id).await?;
    repo.delete(vehicle_id, item_id).await?;
    Ok(Json(item))
}
