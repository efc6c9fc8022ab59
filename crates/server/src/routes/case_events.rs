//! Routes that record case events. Each response carries the fan-out report
//! so the client can surface notification warnings next to the success.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{post, put},
};
use db::models::{
    lawsuit::{CreateLawsuit, Lawsuit, UpdateLawsuit},
    recovery_activity::{CreateRecoveryActivity, RecoveryActivity},
    schedule::{CreateSchedule, Schedule},
    submission::{CreateSubmission, Submission},
};
use services::services::case_events::{CaseEventService, WithFanout};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError};

type Created<T> = (StatusCode, ResponseJson<ApiResponse<WithFanout<T>>>);

fn created<T>(result: WithFanout<T>) -> Created<T> {
    (StatusCode::CREATED, ResponseJson(ApiResponse::success(result)))
}

/// File a lawsuit on the case and notify everyone attached to it
pub async fn create_lawsuit(
    State(deployment): State<DeploymentImpl>,
    Path(case_id): Path<Uuid>,
    Json(payload): Json<CreateLawsuit>,
) -> Result<Created<Lawsuit>, ApiError> {
    let result = CaseEventService::create_lawsuit(
        &deployment.db().pool,
        deployment.notification_service(),
        case_id,
        &payload,
    )
    .await?;
    Ok(created(result))
}

/// Update a lawsuit, notifying only when a tracked field changed
pub async fn update_lawsuit(
    State(deployment): State<DeploymentImpl>,
    Path(lawsuit_id): Path<Uuid>,
    Json(payload): Json<UpdateLawsuit>,
) -> Result<ResponseJson<ApiResponse<WithFanout<Lawsuit>>>, ApiError> {
    let result = CaseEventService::update_lawsuit(
        &deployment.db().pool,
        deployment.notification_service(),
        lawsuit_id,
        &payload,
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success(result)))
}

/// Record a court submission and notify the case
pub async fn create_submission(
    State(deployment): State<DeploymentImpl>,
    Path(case_id): Path<Uuid>,
    Json(payload): Json<CreateSubmission>,
) -> Result<Created<Submission>, ApiError> {
    let result = CaseEventService::create_submission(
        &deployment.db().pool,
        deployment.notification_service(),
        case_id,
        &payload,
    )
    .await?;
    Ok(created(result))
}

/// Add a schedule entry and notify the case
pub async fn create_schedule(
    State(deployment): State<DeploymentImpl>,
    Path(case_id): Path<Uuid>,
    Json(payload): Json<CreateSchedule>,
) -> Result<Created<Schedule>, ApiError> {
    let result = CaseEventService::create_schedule(
        &deployment.db().pool,
        deployment.notification_service(),
        case_id,
        &payload,
    )
    .await?;
    Ok(created(result))
}

/// Record a recovery activity and notify the case
pub async fn create_recovery_activity(
    State(deployment): State<DeploymentImpl>,
    Path(case_id): Path<Uuid>,
    Json(payload): Json<CreateRecoveryActivity>,
) -> Result<Created<RecoveryActivity>, ApiError> {
    let result = CaseEventService::create_recovery_activity(
        &deployment.db().pool,
        deployment.notification_service(),
        case_id,
        &payload,
    )
    .await?;
    Ok(created(result))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route("/cases/{case_id}/lawsuits", post(create_lawsuit))
        .route("/lawsuits/{lawsuit_id}", put(update_lawsuit))
        .route("/cases/{case_id}/submissions", post(create_submission))
        .route("/cases/{case_id}/schedules", post(create_schedule))
        .route(
            "/cases/{case_id}/recovery-activities",
            post(create_recovery_activity),
        )
}
