use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "case_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CaseStatus {
    Pending,
    #[default]
    Active,
    Suspended,
    Closed,
}

/// A debt-recovery or litigation matter tracked by the firm.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Case {
    pub id: Uuid,
    pub title: String,
    pub status: CaseStatus,
    /// Principal owed, in minor currency units.
    pub principal_amount: i64,
    pub filing_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateCase {
    pub title: String,
    #[serde(default)]
    pub status: CaseStatus,
    #[serde(default)]
    pub principal_amount: i64,
    pub filing_date: Option<NaiveDate>,
}

impl Case {
    pub async fn create(pool: &SqlitePool, data: &CreateCase) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, Case>(
            r#"INSERT INTO cases (id, title, status, principal_amount, filing_date, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING id, title, status, principal_amount, filing_date, created_at, updated_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(data.status)
        .bind(data.principal_amount)
        .bind(data.filing_date)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Case>(
            r#"SELECT id, title, status, principal_amount, filing_date, created_at, updated_at
               FROM cases
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn exists(pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cases WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(count > 0)
    }

    pub async fn update_status(
        pool: &SqlitePool,
        id: Uuid,
        status: CaseStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Case>(
            r#"UPDATE cases
               SET status = $2, updated_at = $3
               WHERE id = $1
               RETURNING id, title, status, principal_amount, filing_date, created_at, updated_at"#,
        )
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await
    }
}
