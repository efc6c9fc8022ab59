//! Routes for the case feed and personal inboxes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::{
    case::Case,
    case_notification::CaseNotification,
    personal_notification::PersonalNotification,
    user::User,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError};

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboxQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct SetReadRequest {
    pub is_read: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UnreadCount {
    pub unread: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

async fn ensure_user(deployment: &DeploymentImpl, user_id: Uuid) -> Result<(), ApiError> {
    User::find_by_id(&deployment.db().pool, user_id)
        .await?
        .map(|_| ())
        .ok_or(ApiError::NotFound("user"))
}

/// Case activity feed, newest first
pub async fn list_case_notifications(
    State(deployment): State<DeploymentImpl>,
    Path(case_id): Path<Uuid>,
    Query(query): Query<FeedQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<CaseNotification>>>, ApiError> {
    let pool = &deployment.db().pool;
    if !Case::exists(pool, case_id).await? {
        return Err(ApiError::NotFound("case"));
    }
    let feed = CaseNotification::find_by_case_id(pool, case_id, clamp_limit(query.limit)).await?;
    Ok(ResponseJson(ApiResponse::success(feed)))
}

/// Personal inbox for a user
pub async fn list_user_notifications(
    State(deployment): State<DeploymentImpl>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<InboxQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<PersonalNotification>>>, ApiError> {
    ensure_user(&deployment, user_id).await?;
    let inbox = PersonalNotification::find_by_user_id(
        &deployment.db().pool,
        user_id,
        query.unread_only,
        clamp_limit(query.limit),
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success(inbox)))
}

/// Number of unread notifications for a user
pub async fn get_unread_count(
    State(deployment): State<DeploymentImpl>,
    Path(user_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<UnreadCount>>, ApiError> {
    ensure_user(&deployment, user_id).await?;
    let unread = PersonalNotification::count_unread(&deployment.db().pool, user_id).await?;
    Ok(ResponseJson(ApiResponse::success(UnreadCount { unread })))
}

/// Mark one notification read or unread
pub async fn set_notification_read(
    State(deployment): State<DeploymentImpl>,
    Path((user_id, notification_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<SetReadRequest>,
) -> Result<ResponseJson<ApiResponse<PersonalNotification>>, ApiError> {
    let notification = PersonalNotification::set_read(
        &deployment.db().pool,
        notification_id,
        user_id,
        payload.is_read,
    )
    .await?
    .ok_or(ApiError::NotFound("notification"))?;
    Ok(ResponseJson(ApiResponse::success(notification)))
}

/// Mark every unread notification for a user as read
pub async fn mark_all_read(
    State(deployment): State<DeploymentImpl>,
    Path(user_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<MarkAllReadResponse>>, ApiError> {
    ensure_user(&deployment, user_id).await?;
    let updated = PersonalNotification::mark_all_read(&deployment.db().pool, user_id).await?;
    Ok(ResponseJson(ApiResponse::success(MarkAllReadResponse { updated })))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route(
            "/cases/{case_id}/notifications",
            get(list_case_notifications),
        )
        .route("/users/{user_id}/notifications", get(list_user_notifications))
        .route(
            "/users/{user_id}/notifications/unread-count",
            get(get_unread_count),
        )
        .route("/users/{user_id}/notifications/read-all", post(mark_all_read))
        .route(
            "/users/{user_id}/notifications/{notification_id}/read",
            post(set_notification_read),
        )
}
