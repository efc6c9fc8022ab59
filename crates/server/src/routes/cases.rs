//! Routes for cases and the people attached to them.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, patch, post},
};
use db::models::{
    case::{Case, CaseStatus, CreateCase},
    case_client::{CaseClient, LinkClient},
    case_handler::CaseHandler,
    lawsuit::Lawsuit,
    party::{CreateParty, Party},
    user::UserRef,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct AssignHandlerRequest {
    pub user: UserRef,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateCaseStatusRequest {
    pub status: CaseStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct LawsuitDetail {
    pub lawsuit: Lawsuit,
    pub party_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CaseDetail {
    pub case: Case,
    pub handlers: Vec<CaseHandler>,
    pub clients: Vec<CaseClient>,
    pub parties: Vec<Party>,
    pub lawsuits: Vec<LawsuitDetail>,
}

async fn load_case(deployment: &DeploymentImpl, case_id: Uuid) -> Result<Case, ApiError> {
    Case::find_by_id(&deployment.db().pool, case_id)
        .await?
        .ok_or(ApiError::NotFound("case"))
}

/// Create a case with no people attached yet
pub async fn create_case(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<CreateCase>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Case>>), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".to_string()));
    }
    if payload.principal_amount < 0 {
        return Err(ApiError::BadRequest(
            "principal_amount must not be negative".to_string(),
        ));
    }
    let case = Case::create(&deployment.db().pool, &payload).await?;
    tracing::info!(case_id = %case.id, "Case created");
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(case))))
}

/// Get a case with its handlers, clients, parties and lawsuits
pub async fn get_case(
    State(deployment): State<DeploymentImpl>,
    Path(case_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<CaseDetail>>, ApiError> {
    let case = load_case(&deployment, case_id).await?;
    let pool = &deployment.db().pool;

    let mut lawsuits = Vec::new();
    for lawsuit in Lawsuit::find_by_case_id(pool, case_id).await? {
        let party_ids = Lawsuit::party_ids(pool, lawsuit.id).await?;
        lawsuits.push(LawsuitDetail { lawsuit, party_ids });
    }

    let detail = CaseDetail {
        handlers: CaseHandler::find_by_case_id(pool, case_id).await?,
        clients: CaseClient::find_by_case_id(pool, case_id).await?,
        parties: Party::find_by_case_id(pool, case_id).await?,
        lawsuits,
        case,
    };
    Ok(ResponseJson(ApiResponse::success(detail)))
}

/// Move a case to a new status
pub async fn update_case_status(
    State(deployment): State<DeploymentImpl>,
    Path(case_id): Path<Uuid>,
    Json(payload): Json<UpdateCaseStatusRequest>,
) -> Result<ResponseJson<ApiResponse<Case>>, ApiError> {
    let case = Case::update_status(&deployment.db().pool, case_id, payload.status)
        .await?
        .ok_or(ApiError::NotFound("case"))?;
    tracing::info!(case_id = %case.id, status = %case.status, "Case status updated");
    Ok(ResponseJson(ApiResponse::success(case)))
}

/// Assign a staff member to handle the case
pub async fn assign_handler(
    State(deployment): State<DeploymentImpl>,
    Path(case_id): Path<Uuid>,
    Json(payload): Json<AssignHandlerRequest>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<CaseHandler>>), ApiError> {
    load_case(&deployment, case_id).await?;
    let handler = CaseHandler::assign(&deployment.db().pool, case_id, payload.user.into()).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(handler))))
}

/// Link an individual or organization client
pub async fn link_client(
    State(deployment): State<DeploymentImpl>,
    Path(case_id): Path<Uuid>,
    Json(payload): Json<LinkClient>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<CaseClient>>), ApiError> {
    load_case(&deployment, case_id).await?;
    let client = CaseClient::link_client(&deployment.db().pool, case_id, &payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(client))))
}

/// Add a party to the case
pub async fn create_party(
    State(deployment): State<DeploymentImpl>,
    Path(case_id): Path<Uuid>,
    Json(payload): Json<CreateParty>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Party>>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name is required".to_string()));
    }
    load_case(&deployment, case_id).await?;
    let party = Party::create(&deployment.db().pool, case_id, &payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(party))))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route("/cases", post(create_case))
        .route("/cases/{case_id}", get(get_case))
        .route("/cases/{case_id}/status", patch(update_case_status))
        .route("/cases/{case_id}/handlers", post(assign_handler))
        .route("/cases/{case_id}/clients", post(link_client))
        .route("/cases/{case_id}/parties", post(create_party))
}
