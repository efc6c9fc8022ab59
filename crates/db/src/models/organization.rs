use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateOrganization {
    pub name: String,
}

impl Organization {
    pub async fn create(pool: &SqlitePool, data: &CreateOrganization) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Organization>(
            r#"INSERT INTO organizations (id, name, created_at)
               VALUES ($1, $2, $3)
               RETURNING id, name, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Organization>(
            "SELECT id, name, created_at FROM organizations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Adding an existing member again is a no-op.
    pub async fn add_member(
        pool: &SqlitePool,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"INSERT INTO organization_members (organization_id, user_id, created_at)
               VALUES ($1, $2, $3)
               ON CONFLICT(organization_id, user_id) DO NOTHING"#,
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn member_user_ids(
        pool: &SqlitePool,
        organization_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"SELECT user_id
               FROM organization_members
               WHERE organization_id = $1
               ORDER BY created_at ASC"#,
        )
        .bind(organization_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
