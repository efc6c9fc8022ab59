//! Routes for user accounts and client organizations.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::post,
};
use db::models::{
    organization::{CreateOrganization, Organization},
    user::{CreateUser, User, UserRef},
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct AddMemberRequest {
    pub user: UserRef,
}

/// Register a staff member or client account
pub async fn create_user(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<CreateUser>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<User>>), ApiError> {
    if payload.email.trim().is_empty() || payload.full_name.trim().is_empty() {
        return Err(ApiError::BadRequest("email and full_name are required".to_string()));
    }
    let user = User::create(&deployment.db().pool, &payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(user))))
}

/// Create an organization that can be linked as a client
pub async fn create_organization(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<CreateOrganization>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Organization>>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name is required".to_string()));
    }
    let organization = Organization::create(&deployment.db().pool, &payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(organization))))
}

/// Add a user to an organization
pub async fn add_organization_member(
    State(deployment): State<DeploymentImpl>,
    Path(organization_id): Path<Uuid>,
    Json(payload): Json<AddMemberRequest>,
) -> Result<ResponseJson<ApiResponse<Vec<Uuid>>>, ApiError> {
    let pool = &deployment.db().pool;
    Organization::find_by_id(pool, organization_id)
        .await?
        .ok_or(ApiError::NotFound("organization"))?;
    User::find_by_id(pool, payload.user.into())
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    Organization::add_member(pool, organization_id, payload.user.into()).await?;
    let members = Organization::member_user_ids(pool, organization_id).await?;
    Ok(ResponseJson(ApiResponse::success(members)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route("/users", post(create_user))
        .route("/organizations", post(create_organization))
        .route(
            "/organizations/{organization_id}/members",
            post(add_organization_member),
        )
}
