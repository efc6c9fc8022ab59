use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[sqlx(type_name = "recovery_activity_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecoveryActivityType {
    Payment,
    Seizure,
    Negotiation,
    AssetSearch,
    Other,
}

/// A debt-recovery step taken on a case
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct RecoveryActivity {
    pub id: Uuid,
    pub case_id: Uuid,
    pub activity_type: RecoveryActivityType,
    pub amount: Option<i64>, // Minor currency units
    pub notes: Option<String>,
    pub occurred_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateRecoveryActivity {
    pub activity_type: RecoveryActivityType,
    pub amount: Option<i64>,
    pub notes: Option<String>,
    pub occurred_on: NaiveDate,
}

impl RecoveryActivity {
    pub async fn create(
        pool: &SqlitePool,
        case_id: Uuid,
        data: &CreateRecoveryActivity,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, RecoveryActivity>(
            r#"INSERT INTO recovery_activities (id, case_id, activity_type, amount, notes, occurred_on, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING id, case_id, activity_type, amount, notes, occurred_on, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(case_id)
        .bind(data.activity_type)
        .bind(data.amount)
        .bind(&data.notes)
        .bind(data.occurred_on)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_case_id(pool: &SqlitePool, case_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, RecoveryActivity>(
            r#"SELECT id, case_id, activity_type, amount, notes, occurred_on, created_at
               FROM recovery_activities
               WHERE case_id = $1
               ORDER BY occurred_on DESC"#,
        )
        .bind(case_id)
        .fetch_all(pool)
        .await
    }
}
