//! Storage capabilities consumed by recipient resolution and notification fan-out.

use async_trait::async_trait;
use db::{
    DBService,
    models::{
        case::Case,
        case_client::CaseClient,
        case_handler::CaseHandler,
        case_notification::{CaseNotification, CreateCaseNotification},
        organization::Organization,
        personal_notification::{CreatePersonalNotification, PersonalNotification},
        user::User,
    },
};
use uuid::Uuid;

/// Read side: who is attached to a case.
#[async_trait]
pub trait CaseDirectory: Send + Sync {
    async fn case_exists(&self, case_id: Uuid) -> Result<bool, sqlx::Error>;

    async fn handlers_for_case(&self, case_id: Uuid) -> Result<Vec<CaseHandler>, sqlx::Error>;

    async fn clients_for_case(&self, case_id: Uuid) -> Result<Vec<CaseClient>, sqlx::Error>;

    async fn organization_member_ids(&self, organization_id: Uuid)
    -> Result<Vec<Uuid>, sqlx::Error>;

    /// Subset of `user_ids` that exist in the user table.
    async fn existing_user_ids(&self, user_ids: &[Uuid]) -> Result<Vec<Uuid>, sqlx::Error>;
}

/// Write side: case feed and personal inbox.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert_case_notification(
        &self,
        notification: &CreateCaseNotification,
    ) -> Result<CaseNotification, sqlx::Error>;

    /// Single statement for all rows.
    async fn insert_personal_notifications(
        &self,
        notifications: &[CreatePersonalNotification],
    ) -> Result<u64, sqlx::Error>;

    async fn insert_personal_notification(
        &self,
        notification: &CreatePersonalNotification,
    ) -> Result<PersonalNotification, sqlx::Error>;
}

#[async_trait]
impl CaseDirectory for DBService {
    async fn case_exists(&self, case_id: Uuid) -> Result<bool, sqlx::Error> {
        Case::exists(&self.pool, case_id).await
    }

    async fn handlers_for_case(&self, case_id: Uuid) -> Result<Vec<CaseHandler>, sqlx::Error> {
        CaseHandler::find_by_case_id(&self.pool, case_id).await
    }

    async fn clients_for_case(&self, case_id: Uuid) -> Result<Vec<CaseClient>, sqlx::Error> {
        CaseClient::find_by_case_id(&self.pool, case_id).await
    }

    async fn organization_member_ids(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        Organization::member_user_ids(&self.pool, organization_id).await
    }

    async fn existing_user_ids(&self, user_ids: &[Uuid]) -> Result<Vec<Uuid>, sqlx::Error> {
        User::find_existing_ids(&self.pool, user_ids).await
    }
}

#[async_trait]
impl NotificationStore for DBService {
    async fn insert_case_notification(
        &self,
        notification: &CreateCaseNotification,
    ) -> Result<CaseNotification, sqlx::Error> {
        CaseNotification::create(&self.pool, notification).await
    }

    async fn insert_personal_notifications(
        &self,
        notifications: &[CreatePersonalNotification],
    ) -> Result<u64, sqlx::Error> {
        PersonalNotification::create_many(&self.pool, notifications).await
    }

    async fn insert_personal_notification(
        &self,
        notification: &CreatePersonalNotification,
    ) -> Result<PersonalNotification, sqlx::Error> {
        PersonalNotification::create(&self.pool, notification).await
    }
}
