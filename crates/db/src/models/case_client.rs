use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::user::UserRef;

#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[sqlx(type_name = "client_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ClientKind {
    Individual,
    Organization,
}

/// Row linking a case to the party the firm represents
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct CaseClient {
    pub id: Uuid,
    pub case_id: Uuid,
    pub client_kind: ClientKind,
    pub user_id: Option<Uuid>,
    pub organization_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A client link with exactly one target, whichever kind it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientLink {
    Individual(Uuid),
    Organization(Uuid),
}

/// Request body for linking a client to a case
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "client_kind", rename_all = "lowercase")]
pub enum LinkClient {
    Individual { user: UserRef },
    Organization { organization_id: Uuid },
}

impl CaseClient {
    /// Normalizes the row into a typed link. Rows whose kind disagrees with the
    /// populated column (e.g. an individual with no user) yield `None`.
    pub fn link(&self) -> Option<ClientLink> {
        match self.client_kind {
            ClientKind::Individual => self.user_id.map(ClientLink::Individual),
            ClientKind::Organization => self.organization_id.map(ClientLink::Organization),
        }
    }

    pub async fn link_client(
        pool: &SqlitePool,
        case_id: Uuid,
        data: &LinkClient,
    ) -> Result<Self, sqlx::Error> {
        match data {
            LinkClient::Individual { user } => Self::link_individual(pool, case_id, user.0).await,
            LinkClient::Organization { organization_id } => {
                Self::link_organization(pool, case_id, *organization_id).await
            }
        }
    }

    pub async fn link_individual(
        pool: &SqlitePool,
        case_id: Uuid,
        user_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        Self::insert(pool, case_id, ClientKind::Individual, Some(user_id), None).await
    }

    pub async fn link_organization(
        pool: &SqlitePool,
        case_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        Self::insert(pool, case_id, ClientKind::Organization, None, Some(organization_id)).await
    }

    async fn insert(
        pool: &SqlitePool,
        case_id: Uuid,
        client_kind: ClientKind,
        user_id: Option<Uuid>,
        organization_id: Option<Uuid>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, CaseClient>(
            r#"INSERT INTO case_clients (id, case_id, client_kind, user_id, organization_id, created_at)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id, case_id, client_kind, user_id, organization_id, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(case_id)
        .bind(client_kind)
        .bind(user_id)
        .bind(organization_id)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_case_id(pool: &SqlitePool, case_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, CaseClient>(
            r#"SELECT id, case_id, client_kind, user_id, organization_id, created_at
               FROM case_clients
               WHERE case_id = $1
               ORDER BY created_at ASC"#,
        )
        .bind(case_id)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(kind: ClientKind, user_id: Option<Uuid>, organization_id: Option<Uuid>) -> CaseClient {
        CaseClient {
            id: Uuid::new_v4(),
            case_id: Uuid::new_v4(),
            client_kind: kind,
            user_id,
            organization_id,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_link_follows_client_kind() {
        let user = Uuid::new_v4();
        let org = Uuid::new_v4();

        assert_eq!(
            client(ClientKind::Individual, Some(user), None).link(),
            Some(ClientLink::Individual(user))
        );
        assert_eq!(
            client(ClientKind::Organization, None, Some(org)).link(),
            Some(ClientLink::Organization(org))
        );
    }

    #[test]
    fn test_link_rejects_mismatched_rows() {
        assert_eq!(client(ClientKind::Individual, None, Some(Uuid::new_v4())).link(), None);
        assert_eq!(client(ClientKind::Organization, Some(Uuid::new_v4()), None).link(), None);
    }

    #[test]
    fn test_link_client_body_accepts_both_user_shapes() {
        let id = Uuid::new_v4();
        let plain: LinkClient = serde_json::from_value(serde_json::json!({
            "client_kind": "individual",
            "user": id.to_string(),
        }))
        .unwrap();
        let object: LinkClient = serde_json::from_value(serde_json::json!({
            "client_kind": "individual",
            "user": { "id": id.to_string() },
        }))
        .unwrap();

        for body in [plain, object] {
            match body {
                LinkClient::Individual { user } => assert_eq!(user.0, id),
                other => panic!("unexpected body: {other:?}"),
            }
        }
    }
}
