use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// A document filed with the court or opposing party
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Submission {
    pub id: Uuid,
    pub case_id: Uuid,
    pub lawsuit_id: Option<Uuid>,
    pub title: String,
    pub submitted_by: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateSubmission {
    pub lawsuit_id: Option<Uuid>,
    pub title: String,
    pub submitted_by: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl Submission {
    pub async fn create(
        pool: &SqlitePool,
        case_id: Uuid,
        data: &CreateSubmission,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Submission>(
            r#"INSERT INTO submissions (id, case_id, lawsuit_id, title, submitted_by, submitted_at, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING id, case_id, lawsuit_id, title, submitted_by, submitted_at, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(case_id)
        .bind(data.lawsuit_id)
        .bind(&data.title)
        .bind(&data.submitted_by)
        .bind(data.submitted_at)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_case_id(pool: &SqlitePool, case_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Submission>(
            r#"SELECT id, case_id, lawsuit_id, title, submitted_by, submitted_at, created_at
               FROM submissions
               WHERE case_id = $1
               ORDER BY submitted_at DESC"#,
        )
        .bind(case_id)
        .fetch_all(pool)
        .await
    }
}
