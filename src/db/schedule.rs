//! Maintenance-schedule items, a sub-resource of vehicles.

use serde::Serialize;
use sqlx::{FromRow, QueryBuilder, SqlitePool};

use super::{DbError, Patch};

#[derive(Debug, Clone, FromRow, Serialize, PartialEq)]
pub struct ScheduleItem {
    #[sqlx(rename = "id")]
    pub schedule_item_id: i64,
    pub vehicle_id: i64,
    pub description: String,
    pub due_date: Option<String>,
}

#[derive(Debug)]
pub struct NewScheduleItem {
    pub description: String,
    pub due_date: Option<String>,
}

/// Presence-aware partial update for a schedule item.
#[derive(Debug, Default)]
pub struct ScheduleItemUpdate {
    pub description: Patch<String>,
    pub due_date: Patch<String>,
}

impl ScheduleItemUpdate {
    pub fn is_empty(&self) -> bool {
        self.description.is_absent() && self.due_date.is_absent()
    }
}

/// Operations are scoped by vehicle; the caller is responsible for having
/// already resolved the vehicle through its owner.
pub struct ScheduleRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ScheduleRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        vehicle_id: i64,
        new: NewScheduleItem,
    ) -> Result<ScheduleItem, DbError> {
        let schedule_item_id: i64 = sqlx::query_scalar(
            "INSERT INTO schedule_items (vehicle_id, description, due_date) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(vehicle_id)
        .bind(&new.description)
        .bind(&new.due_date)
        .fetch_one(self.pool)
        .await?;

        Ok(ScheduleItem {
            schedule_item_id,
            vehicle_id,
            description: new.description,
            due_date: new.due_date,
        })
    }

    pub async fn list(&self, vehicle_id: i64) -> Result<Vec<ScheduleItem>, DbError> {
        let items = sqlx::query_as::<_, ScheduleItem>(
            "SELECT id, vehicle_id, description, due_date FROM schedule_items
             WHERE vehicle_id = ? ORDER BY id",
        )
        .bind(vehicle_id)
        .fetch_all(self.pool)
        .await?;
        Ok(items)
    }

    pub async fn get(&self, vehicle_id: i64, item_id: i64) -> Result<ScheduleItem, DbError> {
        sqlx::query_as::<_, ScheduleItem>(
            "SELECT id, vehicle_id, description, due_date FROM schedule_items
             WHERE id = ? AND vehicle_id = ?",
        )
        .bind(item_id)
        .bind(vehicle_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(DbError::ScheduleItemNotFound(item_id))
    }

    pub async fn update(
        &self,
        vehicle_id: i64,
        item_id: i64,
        update: ScheduleItemUpdate,
    ) -> Result<ScheduleItem, DbError> {
        if update.is_empty() {
            return self.get(vehicle_id, item_id).await;
        }

        let mut query = QueryBuilder::new("UPDATE schedule_items SET ");
        let mut assignments = query.separated(", ");

        if update.description.is_present() {
            assignments.push("description = ");
            assignments.push_bind_unseparated(update.description.into_column_value());
        }
        if update.due_date.is_present() {
            assignments.push("due_date = ");
            assignments.push_bind_unseparated(update.due_date.into_column_value());
        }

        query.push(" WHERE id = ");
        query.push_bind(item_id);
        query.push(" AND vehicle_id = ");
        query.push_bind(vehicle_id);

        let result = query.build().execute(self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(DbError::ScheduleItemNotFound(item_id));
        }

        self.get(vehicle_id, item_id).await
    }

    pub async fn delete(&self, vehicle_id: i64, item_id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM schedule_items WHERE id = ? AND vehicle_id = ?")
            .bind(item_id)
            .bind(vehicle_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::ScheduleItemNotFound(item_id));
        }
        Ok(())
    }
}
