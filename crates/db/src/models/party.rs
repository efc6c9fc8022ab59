use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[sqlx(type_name = "party_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PartyKind {
    Individual,
    Organization,
}

/// Legal role a party plays in a case or lawsuit
#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[sqlx(type_name = "party_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PartyRole {
    Plaintiff,
    Defendant,
    Creditor,
    Debtor,
    ThirdParty,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Party {
    pub id: Uuid,
    pub case_id: Uuid,
    pub name: String,
    pub party_kind: PartyKind,
    pub role: PartyRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateParty {
    pub name: String,
    pub party_kind: PartyKind,
    pub role: PartyRole,
}

impl Party {
    pub async fn create(
        pool: &SqlitePool,
        case_id: Uuid,
        data: &CreateParty,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Party>(
            r#"INSERT INTO case_parties (id, case_id, name, party_kind, role, created_at)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id, case_id, name, party_kind, role, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(case_id)
        .bind(&data.name)
        .bind(data.party_kind)
        .bind(data.role)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_case_id(pool: &SqlitePool, case_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Party>(
            r#"SELECT id, case_id, name, party_kind, role, created_at
               FROM case_parties
               WHERE case_id = $1
               ORDER BY created_at ASC"#,
        )
        .bind(case_id)
        .fetch_all(pool)
        .await
    }
}
