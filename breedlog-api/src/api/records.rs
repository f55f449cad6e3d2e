//! Record query and update endpoints
//!
//! All routes are scoped to the authenticated caller. A record owned by
//! someone else is reported exactly like a missing one.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use breedlog_common::db::records::{self, RecordChanges, RecordFilter};
use breedlog_common::summary::{summarize, RecordSummary};
use breedlog_common::{AnimalRecord, Species, VerificationStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::pagination::{calculate_pagination, PageWindow, Pagination};
use crate::AppState;

/// Query parameters shared by listing and summary
///
/// Filters are strings so unrecognised values can be ignored instead of
/// rejected.
#[derive(Debug, Default, Deserialize)]
pub struct RecordsQuery {
    pub status: Option<String>,
    pub species: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl RecordsQuery {
    fn window(&self) -> PageWindow {
        PageWindow::from_request(self.limit, self.offset)
    }

    fn filter(&self) -> RecordFilter {
        let window = self.window();
        RecordFilter {
            status: VerificationStatus::parse_filter(self.status.as_deref()),
            species: Species::parse_filter(self.species.as_deref()),
            limit: window.limit,
            offset: window.offset,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecordsResponse {
    pub records: Vec<AnimalRecord>,
    pub pagination: Pagination,
}

/// GET /api/records
pub async fn list_records(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(query): Query<RecordsQuery>,
) -> ApiResult<Json<RecordsResponse>> {
    let page = records::list_for_owner(&state.db, caller.user_id, &query.filter()).await?;

    Ok(Json(RecordsResponse {
        pagination: calculate_pagination(page.total, query.window()),
        records: page.records,
    }))
}

#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub record: AnimalRecord,
}

/// GET /api/records/:id
pub async fn get_record(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<RecordResponse>> {
    let not_found = || ApiError::NotFound(format!("Record {} not found", id));

    let record_id = Uuid::parse_str(&id).map_err(|_| not_found())?;
    let record = records::get_for_owner(&state.db, record_id, caller.user_id)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(RecordResponse { record }))
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: RecordSummary,
    pub pagination: Pagination,
}

/// GET /api/records/summary
///
/// Dashboard aggregate over the same page `/api/records` would return.
pub async fn records_summary(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(query): Query<RecordsQuery>,
) -> ApiResult<Json<SummaryResponse>> {
    let page = records::list_for_owner(&state.db, caller.user_id, &query.filter()).await?;

    Ok(Json(SummaryResponse {
        summary: summarize(&page.records),
        pagination: calculate_pagination(page.total, query.window()),
    }))
}

/// PATCH /api/records body
#[derive(Debug, Default, Deserialize)]
pub struct UpdateRecordRequest {
    pub id: Option<String>,
    pub manual_breed: Option<String>,
    pub final_breed: Option<String>,
    pub verification_status: Option<String>,
    pub notes: Option<String>,
    pub location_data: Option<Value>,
    pub owner_details: Option<Value>,
}

impl UpdateRecordRequest {
    fn into_parts(self) -> ApiResult<(Uuid, RecordChanges)> {
        let id = self
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::BadRequest("Missing required field: id".to_string()))?;
        let id = Uuid::parse_str(id)
            .map_err(|_| ApiError::BadRequest(format!("id '{}' is not a UUID", id)))?;

        let verification_status = self
            .verification_status
            .as_deref()
            .map(|s| s.trim().parse::<VerificationStatus>())
            .transpose()?;

        Ok((
            id,
            RecordChanges {
                manual_breed: self.manual_breed,
                final_breed: self.final_breed,
                verification_status,
                notes: self.notes,
                location_data: self.location_data,
                owner_details: self.owner_details,
            },
        ))
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateRecordResponse {
    pub success: bool,
    pub record: AnimalRecord,
}

/// PATCH /api/records
pub async fn update_record(
    State(state): State<AppState>,
    caller: AuthUser,
    payload: Result<Json<UpdateRecordRequest>, JsonRejection>,
) -> ApiResult<Json<UpdateRecordResponse>> {
    let Json(request) = payload?;
    let (record_id, changes) = request.into_parts()?;

    let record = records::update_for_owner(&state.db, record_id, caller.user_id, &changes).await?;

    info!(
        record_id = %record_id,
        status = %record.verification_status,
        "Record updated by {}",
        caller.user_id
    );

    Ok(Json(UpdateRecordResponse {
        success: true,
        record,
    }))
}
