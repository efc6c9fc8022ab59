use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// Hearing, deadline or meeting on a case calendar
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Schedule {
    pub id: Uuid,
    pub case_id: Uuid,
    pub lawsuit_id: Option<Uuid>,
    pub title: String,
    pub location: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateSchedule {
    pub lawsuit_id: Option<Uuid>,
    pub title: String,
    pub location: Option<String>,
    pub scheduled_at: DateTime<Utc>,
}

impl Schedule {
    pub async fn create(
        pool: &SqlitePool,
        case_id: Uuid,
        data: &CreateSchedule,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Schedule>(
            r#"INSERT INTO schedules (id, case_id, lawsuit_id, title, location, scheduled_at, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING id, case_id, lawsuit_id, title, location, scheduled_at, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(case_id)
        .bind(data.lawsuit_id)
        .bind(&data.title)
        .bind(&data.location)
        .bind(data.scheduled_at)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_case_id(pool: &SqlitePool, case_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Schedule>(
            r#"SELECT id, case_id, lawsuit_id, title, location, scheduled_at, created_at
               FROM schedules
               WHERE case_id = $1
               ORDER BY scheduled_at ASC"#,
        )
        .bind(case_id)
        .fetch_all(pool)
        .await
    }
}
