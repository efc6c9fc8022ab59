use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// Staff member responsible for a case. `user_id` is cleared when the
/// account is removed, so the link may outlive its user.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct CaseHandler {
    pub id: Uuid,
    pub case_id: Uuid,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl CaseHandler {
    pub async fn assign(pool: &SqlitePool, case_id: Uuid, user_id: Uuid) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, CaseHandler>(
            r#"INSERT INTO case_handlers (id, case_id, user_id, created_at)
               VALUES ($1, $2, $3, $4)
               RETURNING id, case_id, user_id, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(case_id)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_case_id(pool: &SqlitePool, case_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, CaseHandler>(
            r#"SELECT id, case_id, user_id, created_at
               FROM case_handlers
               WHERE case_id = $1
               ORDER BY created_at ASC"#,
        )
        .bind(case_id)
        .fetch_all(pool)
        .await
    }
}
