//! Duty API handlers
//!
//! Scheduling is admin only; members read their own group's duties.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDateTime;

use super::dto::{CreateDutyRequest, DutyDto, ListDutiesParams, ScheduledDutyDto, UpdateDutyRequest};
use crate::application::duties::DutyScheduler;
use crate::domain::calendar::{parse_day, Clock};
use crate::domain::{DutyPatch, NewDuty};
use crate::interfaces::http::common::{
    domain_error, forbidden, ApiError, ApiResponse, EmptyData, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct DutyHandlerState {
    pub duties: Arc<DutyScheduler>,
    pub clock: Arc<dyn Clock>,
}

fn parse_date<T>(raw: &str, clock: &dyn Clock) -> Result<NaiveDateTime, ApiError<T>> {
    parse_day(raw, clock).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(format!(
                "Invalid date '{}', expected YYYY-MM-DD",
                raw
            ))),
        )
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/duties",
    tag = "Duties",
    security(("bearer_auth" = [])),
    params(ListDutiesParams),
    responses(
        (status = 200, description = "Duties by date ascending", body = ApiResponse<Vec<DutyDto>>)
    )
)]
pub async fn list_duties(
    State(state): State<DutyHandlerState>,
    Query(params): Query<ListDutiesParams>,
) -> Result<Json<ApiResponse<Vec<DutyDto>>>, ApiError<Vec<DutyDto>>> {
    let group = params.group_id.as_deref().map(str::trim).filter(|g| !g.is_empty());
    let duties = state.duties.list_duties(group).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(
        duties.into_iter().map(DutyDto::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/duties",
    tag = "Duties",
    security(("bearer_auth" = [])),
    request_body = CreateDutyRequest,
    responses(
        (status = 201, description = "Duty created and members notified", body = ApiResponse<ScheduledDutyDto>),
        (status = 400, description = "Invalid date"),
        (status = 404, description = "Unknown group"),
        (status = 409, description = "Group already has a duty that day")
    )
)]
pub async fn create_duty(
    State(state): State<DutyHandlerState>,
    ValidatedJson(request): ValidatedJson<CreateDutyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ScheduledDutyDto>>), ApiError<ScheduledDutyDto>> {
    let date = parse_date(&request.date, state.clock.as_ref())?;
    let new = NewDuty {
        group_id: request.group_id,
        date,
        place: request.place,
        time_range: request.time_range,
        clinical_instructor: request.clinical_instructor,
        area: request.area,
    };

    let scheduled = state.duties.create_duty(new).await.map_err(domain_error)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(scheduled.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/duties/{id}",
    tag = "Duties",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Duty ID")),
    responses(
        (status = 200, description = "Duty", body = ApiResponse<DutyDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_duty(
    State(state): State<DutyHandlerState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DutyDto>>, ApiError<DutyDto>> {
    let duty = state.duties.get_duty(&id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(duty.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/duties/{id}",
    tag = "Duties",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Duty ID")),
    request_body = UpdateDutyRequest,
    responses(
        (status = 200, description = "Duty updated and members notified", body = ApiResponse<ScheduledDutyDto>),
        (status = 404, description = "Not found"),
        (status = 409, description = "Group already has a duty that day")
    )
)]
pub async fn update_duty(
    State(state): State<DutyHandlerState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateDutyRequest>,
) -> Result<Json<ApiResponse<ScheduledDutyDto>>, ApiError<ScheduledDutyDto>> {
    let date = match request.date.as_deref() {
        Some(raw) => Some(parse_date(raw, state.clock.as_ref())?),
        None => None,
    };
    let patch = DutyPatch {
        group_id: request.group_id,
        date,
        place: request.place,
        time_range: request.time_range,
        clinical_instructor: request.clinical_instructor,
        area: request.area,
    };

    let scheduled = state
        .duties
        .update_duty(&id, patch)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(scheduled.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/duties/{id}",
    tag = "Duties",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Duty ID")),
    responses(
        (status = 200, description = "Duty deleted", body = ApiResponse<EmptyData>),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_duty(
    State(state): State<DutyHandlerState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<EmptyData>>, ApiError<EmptyData>> {
    state.duties.delete_duty(&id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}

#[utoipa::path(
    get,
    path = "/api/v1/duties/user/{user_id}",
    tag = "Duties",
    security(("bearer_auth" = [])),
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Duties of the user's group", body = ApiResponse<Vec<DutyDto>>),
        (status = 403, description = "Not your schedule"),
        (status = 404, description = "Unknown user")
    )
)]
pub async fn duties_for_user(
    State(state): State<DutyHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<DutyDto>>>, ApiError<Vec<DutyDto>>> {
    if !caller.can_access(&user_id) {
        return Err(forbidden());
    }
    let duties = state
        .duties
        .duties_for_user(&user_id)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(
        duties.into_iter().map(DutyDto::from).collect(),
    )))
}
