use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "lawsuit_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LawsuitStatus {
    #[default]
    Filed,
    InProgress,
    Judgment,
    Appealed,
    Closed,
    Withdrawn,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Lawsuit {
    pub id: Uuid,
    pub case_id: Uuid,
    pub parent_lawsuit_id: Option<Uuid>, // Set when filed as a related lawsuit
    pub case_number: String,
    pub court_name: String,
    pub status: LawsuitStatus,
    pub filing_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateLawsuit {
    pub parent_lawsuit_id: Option<Uuid>,
    pub case_number: String,
    pub court_name: String,
    #[serde(default)]
    pub status: LawsuitStatus,
    pub filing_date: Option<NaiveDate>,
    pub description: Option<String>,
    #[serde(default)]
    pub party_ids: Vec<Uuid>,
}

/// Partial update; an absent field leaves the column untouched. The nullable
/// columns take an explicit `null` to clear them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateLawsuit {
    pub case_number: Option<String>,
    pub court_name: Option<String>,
    pub status: Option<LawsuitStatus>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[ts(optional, as = "Option<Option<NaiveDate>>")]
    pub filing_date: Option<Option<NaiveDate>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[ts(optional, as = "Option<Option<String>>")]
    pub description: Option<Option<String>>,
}

const LAWSUIT_COLUMNS: &str = "id, case_id, parent_lawsuit_id, case_number, court_name, status, \
     filing_date, description, created_at, updated_at";

impl Lawsuit {
    pub fn is_related(&self) -> bool {
        self.parent_lawsuit_id.is_some()
    }

    /// Inserts the lawsuit and its party links in one transaction.
    pub async fn create(
        pool: &SqlitePool,
        case_id: Uuid,
        data: &CreateLawsuit,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;

        let lawsuit = sqlx::query_as::<_, Lawsuit>(&format!(
            r#"INSERT INTO lawsuits (id, case_id, parent_lawsuit_id, case_number, court_name, status,
                                     filing_date, description, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               RETURNING {LAWSUIT_COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(case_id)
        .bind(data.parent_lawsuit_id)
        .bind(&data.case_number)
        .bind(&data.court_name)
        .bind(data.status)
        .bind(data.filing_date)
        .bind(&data.description)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        for party_id in &data.party_ids {
            sqlx::query(
                r#"INSERT INTO lawsuit_parties (lawsuit_id, party_id)
                   VALUES ($1, $2)
                   ON CONFLICT(lawsuit_id, party_id) DO NOTHING"#,
            )
            .bind(lawsuit.id)
            .bind(party_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(lawsuit)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Lawsuit>(&format!(
            "SELECT {LAWSUIT_COLUMNS} FROM lawsuits WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_case_id(pool: &SqlitePool, case_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Lawsuit>(&format!(
            "SELECT {LAWSUIT_COLUMNS} FROM lawsuits WHERE case_id = $1 ORDER BY created_at ASC"
        ))
        .bind(case_id)
        .fetch_all(pool)
        .await
    }

    pub async fn party_ids(pool: &SqlitePool, lawsuit_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let rows: Vec<(Uuid,)> =
            sqlx::query_as("SELECT party_id FROM lawsuit_parties WHERE lawsuit_id = $1")
                .bind(lawsuit_id)
                .fetch_all(pool)
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateLawsuit,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Lawsuit>(&format!(
            r#"UPDATE lawsuits
               SET case_number = COALESCE($2, case_number),
                   court_name  = COALESCE($3, court_name),
                   status      = COALESCE($4, status),
                   filing_date = CASE WHEN $5 THEN $6 ELSE filing_date END,
                   description = CASE WHEN $7 THEN $8 ELSE description END,
                   updated_at  = $9
               WHERE id = $1
               RETURNING {LAWSUIT_COLUMNS}"#
        ))
        .bind(id)
        .bind(&data.case_number)
        .bind(&data.court_name)
        .bind(data.status)
        .bind(data.filing_date.is_some())
        .bind(data.filing_date.flatten())
        .bind(data.description.is_some())
        .bind(data.description.clone().flatten())
        .bind(Utc::now())
        .fetch_optional(pool)
        .await
    }
}
