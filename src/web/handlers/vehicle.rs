//! Vehicle endpoints.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use super::AppState;
use crate::db::{NewVehicle, Patch, Vehicle, VehicleRepository, VehicleUpdate};
use crate::web::error::ApiError;
use crate::web::middleware::AuthSession;

const CREATE_VEHICLE_SCHEMA: &str = r#"{
  "type": "object",
  "additionalProperties": false,
  "properties": {
    "year": {"type": "integer"},
    "make": {"type": "string"},
    "model": {"type": "string"}
  },
  "required": ["year", "make", "model"]
}"#;

const UPDATE_VEHICLE_SCHEMA: &str = r#"{
  "type": "object",
  "additionalProperties": false,
  "properties": {
    "year": {"type": ["integer", "null"]},
    "make": {"type": ["string", "null"]},
    "model": {"type": ["string", "null"]}
  }
}"#;

#[derive(Debug, Deserialize)]
struct CreateVehicleRequest {
    year: i64,
    make: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct UpdateVehicleRequest {
    #[serde(default)]
    year: Patch<i64>,
    #[serde(default)]
    make: Patch<String>,
    #[serde(default)]
    model: Patch<String>,
}

/// GET /v1/vehicles
pub async fn list_vehicles(
    State(state): State<Arc<AppState>>,
    AuthSession(claims): AuthSession,
) -> Result<Json<Vec<Vehicle>>, ApiError> {
    let vehicles = VehicleRepository::new(state.db.pool())
        .list(claims.sub)
        .await?;
    Ok(Json(vehicles))
}

/// POST /v1/vehicles
pub async fn create_vehicle(
    State(state): State<Arc<AppState>>,
    AuthSession(claims): AuthSession,
    body: Bytes,
) -> Result<Json<Vehicle>, ApiError> {
    let req: CreateVehicleRequest = state
        .schemas
        .validate_and_decode(CREATE_VEHICLE_SCHEMA, &body)?;

    let vehicle = VehicleRepository::new(state.db.pool())
        .create(
            claims.sub,
            NewVehicle {
                year: req.year,
                make: req.make,
                model: req.model,
            },
        )
        .await?;
    Ok(Json(vehicle))
}

/// GET /v1/vehicles/{vehicleId}
pub async fn get_vehicle(
    State(state): State<Arc<AppState>>,
    AuthSession(claims): AuthSession,
    Path(vehicle_id): Path<i64>,
) -> Result<Json<Vehicle>, ApiError> {
    let vehicle = VehicleRepository::new(state.db.pool())
        .get(claims.sub, vehicle_id)
        .await?;
    Ok(Json(vehicle))
}

/// PATCH /v1/vehicles/{vehicleId} — presence-aware partial update.
pub async fn update_vehicle(
    State(state): State<Arc<AppState>>,
    AuthSession(claims): AuthSession,
    Path(vehicle_id): Path<i64>,
    body: Bytes,
) -> Result<Json<Vehicle>, ApiError> {
    let req: UpdateVehicleRequest = state
        .schemas
        .validate_and_decode(UPDATE_VEHICLE_SCHEMA, &body)?;

    let vehicle = VehicleRepository::new(state.db.pool())
        .update(
            claims.sub,
            vehicle_id,
            VehicleUpdate {
                year: req.year,
                make: req.make,
                model: req.model,
            },
        )
        .await?;
    Ok(Json(vehicle))
}

/// DELETE /v1/vehicles/{vehicleId} — returns the deleted record.
pub async fn delete_vehicle(
    State(state): State<Arc<AppState>>,
    AuthSession(claims): AuthSession,
    Path(vehicle_id): Path<i64>,
) -> Result<Json<Vehicle>, ApiError> {
    let repo = VehicleRepository::new(state.db.pool());
    let vehicle = repo.get(claims.sub, vehicle_id).await?;
    repo.delete(claims.sub, vehicle_id).await?;
    Ok(Json(vehicle))
}
