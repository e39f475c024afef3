//! Attendance API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{AttendanceDto, AttendanceEntryDto, MarkAttendanceResponse};
use crate::application::attendance::AttendanceRecorder;
use crate::application::identity::UserService;
use crate::interfaces::http::common::{domain_error, forbidden, ApiError, ApiResponse};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct AttendanceHandlerState {
    pub attendance: Arc<AttendanceRecorder>,
    pub user_service: Arc<UserService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/attendance/mark/{school_id}",
    tag = "Attendance",
    security(("bearer_auth" = [])),
    params(("school_id" = String, Path, description = "School ID read from the QR code")),
    responses(
        (status = 201, description = "Attendance marked", body = ApiResponse<MarkAttendanceResponse>),
        (status = 404, description = "Unknown school ID"),
        (status = 409, description = "Already marked today")
    )
)]
pub async fn mark_attendance(
    State(state): State<AttendanceHandlerState>,
    Path(school_id): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<MarkAttendanceResponse>>), ApiError<MarkAttendanceResponse>>
{
    let marked = state
        .attendance
        .mark(&school_id)
        .await
        .map_err(domain_error)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(marked.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    tag = "Attendance",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All attendance, newest first", body = ApiResponse<Vec<AttendanceEntryDto>>)
    )
)]
pub async fn list_attendance(
    State(state): State<AttendanceHandlerState>,
) -> Result<Json<ApiResponse<Vec<AttendanceEntryDto>>>, ApiError<Vec<AttendanceEntryDto>>> {
    let entries = state.attendance.list_all().await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(
        entries.into_iter().map(AttendanceEntryDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/attendance/{school_id}",
    tag = "Attendance",
    security(("bearer_auth" = [])),
    params(("school_id" = String, Path, description = "School ID")),
    responses(
        (status = 200, description = "Attendance of one student, newest first", body = ApiResponse<Vec<AttendanceDto>>),
        (status = 403, description = "Not your record"),
        (status = 404, description = "Unknown school ID")
    )
)]
pub async fn student_attendance(
    State(state): State<AttendanceHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(school_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<AttendanceDto>>>, ApiError<Vec<AttendanceDto>>> {
    if !caller.role.is_privileged() {
        let me = state
            .user_service
            .get_user(&caller.user_id)
            .await
            .map_err(domain_error)?;
        if me.school_id != school_id {
            return Err(forbidden());
        }
    }

    let records = state
        .attendance
        .list_for_school_id(&school_id)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(
        records.into_iter().map(AttendanceDto::from).collect(),
    )))
}
