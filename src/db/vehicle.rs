//! Vehicle persistence, including the presence-aware partial update.

use serde::Serialize;
use sqlx::{FromRow, QueryBuilder, SqlitePool};

use super::{DbError, Patch};

/// A vehicle row. Columns are nullable so a PATCH with an explicit `null`
/// can clear them.
#[derive(Debug, Clone, FromRow, Serialize, PartialEq)]
pub struct Vehicle {
    #[sqlx(rename = "id")]
    pub vehicle_id: i64,
    pub user_id: i64,
    pub year: Option<i64>,
    pub make: Option<String>,
    pub model: Option<String>,
}

/// Fields for a new vehicle; all are required at creation.
#[derive(Debug)]
pub struct NewVehicle {
    pub year: i64,
    pub make: String,
    pub model: String,
}

/// Presence-aware partial update. Only present fields become assignment
/// clauses, in this declared order.
#[derive(Debug, Default)]
pub struct VehicleUpdate {
    pub year: Patch<i64>,
    pub make: Patch<String>,
    pub model: Patch<String>,
}

impl VehicleUpdate {
    pub fn is_empty(&self) -> bool {
        self.year.is_absent() && self.make.is_absent() && self.model.is_absent()
    }
}

/// All lookups are scoped by the owning user: another tenant's vehicle is
/// indistinguishable from a missing one.
pub struct VehicleRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> VehicleRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: i64, new: NewVehicle) -> Result<Vehicle, DbError> {
        let vehicle_id: i64 = sqlx::query_scalar(
            "INSERT INTO vehicles (user_id, year, make, model) VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(user_id)
        .bind(new.year)
        .bind(&new.make)
        .bind(&new.model)
        .fetch_one(self.pool)
        .await?;

        Ok(Vehicle {
            vehicle_id,
            user_id,
            year: Some(new.year),
            make: Some(new.make),
            model: Some(new.model),
        })
    }

    pub async fn list(&self, user_id: i64) -> Result<Vec<Vehicle>, DbError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            "SELECT id, user_id, year, make, model FROM vehicles WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(vehicles)
    }

    pub async fn get(&self, user_id: i64, vehicle_id: i64) -> Result<Vehicle, DbError> {
        sqlx::query_as::<_, Vehicle>(
            "SELECT id, user_id, year, make, model FROM vehicles WHERE id = ? AND user_id = ?",
        )
        .bind(vehicle_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(DbError::VehicleNotFound(vehicle_id))
    }

    /// Apply a partial update: one assignment per present field, `NULL` for
    /// explicit nulls, and no statement at all when nothing is present.
    pub async fn update(
        &self,
        user_id: i64,
        vehicle_id: i64,
        update: VehicleUpdate,
    ) -> Result<Vehicle, DbError> {
        if update.is_empty() {
            return self.get(user_id, vehicle_id).await;
        }

        let mut query = QueryBuilder::new("UPDATE vehicles SET ");
        let mut assignments = query.separated(", ");

        if update.year.is_present() {
            assignments.push("year = ");
            assignments.push_bind_unseparated(update.year.into_column_value());
        }
        if update.make.is_present() {
            assignments.push("make = ");
            assignments.push_bind_unseparated(update.make.into_column_value());
        }
        if update.model.is_present() {
            assignments.push("model = ");
            assignments.push_bind_unseparated(update.model.into_column_value());
        }

        query.push(" WHERE id = ");
        query.push_bind(vehicle_id);
        query.push(" AND user_id = ");
        query.push_bind(user_id);

        let result = query.build().execute(self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(DbError::VehicleNotFound(vehicle_id));
        }

        self.get(user_id, vehicle_id).await
    }

    pub async fn delete(&self, user_id: i64, vehicle_id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = ? AND user_id = ?")
            .bind(vehicle_id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::VehicleNotFound(vehicle_id));
        }
        Ok(())
    }
}
