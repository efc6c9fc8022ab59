use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

use super::case_notification::NotificationType;

/// Per-recipient inbox entry with its own read state
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct PersonalNotification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub case_id: Uuid,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub related_id: Uuid,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

/// A personal notification ready to insert. The id is generated up front so a
/// failed bulk insert can be retried row by row with the same identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePersonalNotification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub case_id: Uuid,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub related_id: Uuid,
}

const PERSONAL_COLUMNS: &str = "id, user_id, case_id, title, message, notification_type, \
     related_id, is_read, created_at, read_at";

impl PersonalNotification {
    pub async fn create(
        pool: &SqlitePool,
        data: &CreatePersonalNotification,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, PersonalNotification>(&format!(
            r#"INSERT INTO personal_notifications
                   (id, user_id, case_id, title, message, notification_type, related_id, is_read, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8)
               RETURNING {PERSONAL_COLUMNS}"#
        ))
        .bind(data.id)
        .bind(data.user_id)
        .bind(data.case_id)
        .bind(&data.title)
        .bind(&data.message)
        .bind(data.notification_type)
        .bind(data.related_id)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    /// Inserts all rows in a single statement. Either every row lands or none do.
    pub async fn create_many(
        pool: &SqlitePool,
        rows: &[CreatePersonalNotification],
    ) -> Result<u64, sqlx::Error> {
        if rows.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "INSERT INTO personal_notifications \
             (id, user_id, case_id, title, message, notification_type, related_id, is_read, created_at) ",
        );
        query.push_values(rows, |mut b, row| {
            b.push_bind(row.id)
                .push_bind(row.user_id)
                .push_bind(row.case_id)
                .push_bind(row.title.clone())
                .push_bind(row.message.clone())
                .push_bind(row.notification_type)
                .push_bind(row.related_id)
                .push_bind(false)
                .push_bind(now);
        });

        let result = query.build().execute(pool).await?;
        Ok(result.rows_affected())
    }

    /// Newest first.
    pub async fn find_by_user_id(
        pool: &SqlitePool,
        user_id: Uuid,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, PersonalNotification>(&format!(
            r#"SELECT {PERSONAL_COLUMNS}
               FROM personal_notifications
               WHERE user_id = $1 AND ($2 = 0 OR is_read = 0)
               ORDER BY created_at DESC
               LIMIT $3"#
        ))
        .bind(user_id)
        .bind(unread_only)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_case_and_related(
        pool: &SqlitePool,
        case_id: Uuid,
        related_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, PersonalNotification>(&format!(
            r#"SELECT {PERSONAL_COLUMNS}
               FROM personal_notifications
               WHERE case_id = $1 AND related_id = $2
               ORDER BY created_at ASC"#
        ))
        .bind(case_id)
        .bind(related_id)
        .fetch_all(pool)
        .await
    }

    pub async fn count_unread(pool: &SqlitePool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM personal_notifications WHERE user_id = $1 AND is_read = 0",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Sets the read flag on a notification owned by `user_id`. Returns `None`
    /// when the notification does not exist or belongs to someone else.
    pub async fn set_read(
        pool: &SqlitePool,
        id: Uuid,
        user_id: Uuid,
        is_read: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        let read_at = is_read.then(Utc::now);
        sqlx::query_as::<_, PersonalNotification>(&format!(
            r#"UPDATE personal_notifications
               SET is_read = $3, read_at = $4
               WHERE id = $1 AND user_id = $2
               RETURNING {PERSONAL_COLUMNS}"#
        ))
        .bind(id)
        .bind(user_id)
        .bind(is_read)
        .bind(read_at)
        .fetch_optional(pool)
        .await
    }

    pub async fn mark_all_read(pool: &SqlitePool, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE personal_notifications
               SET is_read = 1, read_at = $2
               WHERE user_id = $1 AND is_read = 0"#,
        )
        .bind(user_id)
        .bind(Utc::now())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
