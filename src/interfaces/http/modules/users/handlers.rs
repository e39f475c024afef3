//! User management API handlers
//!
//! Admin-only endpoints for managing users.
//! Delegates to `UserService` from the application/identity layer.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{AdminUpdateUserRequest, ListUsersParams, UserDetailsDto, UserDto};
use crate::application::identity::{AdminUserUpdate, UserService};
use crate::domain::{UserFilter, UserRole};
use crate::interfaces::http::common::{domain_error, ApiError, ApiResponse, EmptyData, ValidatedJson};

#[derive(Clone)]
pub struct UserHandlerState {
    pub user_service: Arc<UserService>,
}

fn parse_role<T>(role: Option<&str>) -> Result<Option<UserRole>, ApiError<T>> {
    match role.map(str::trim).filter(|r| !r.is_empty()) {
        None => Ok(None),
        Some(raw) => UserRole::parse(raw).map(Some).ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(format!("Unknown role '{}'", raw))),
            )
        }),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(ListUsersParams),
    responses(
        (status = 200, description = "Users, newest first, with their group", body = ApiResponse<Vec<UserDetailsDto>>),
        (status = 400, description = "Unknown role"),
        (status = 403, description = "Admin only")
    )
)]
pub async fn list_users(
    State(state): State<UserHandlerState>,
    Query(params): Query<ListUsersParams>,
) -> Result<Json<ApiResponse<Vec<UserDetailsDto>>>, ApiError<Vec<UserDetailsDto>>> {
    let filter = UserFilter {
        search: params.search,
        role: parse_role(params.role.as_deref())?,
    };

    let users = state.user_service.list_users(filter).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserDetailsDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = ApiResponse<UserDetailsDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_user(
    State(state): State<UserHandlerState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserDetailsDto>>, ApiError<UserDetailsDto>> {
    let user = state
        .user_service
        .get_user_with_group(&id)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(user.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    request_body = AdminUpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserDto>),
        (status = 404, description = "Not found"),
        (status = 409, description = "School ID or username taken")
    )
)]
pub async fn update_user(
    State(state): State<UserHandlerState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<AdminUpdateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError<UserDto>> {
    let update = AdminUserUpdate {
        role: parse_role(request.role.as_deref())?,
        school_id: request.school_id,
        username: request.username,
        name: request.name,
        section: request.section,
        course: request.course,
        department: request.department,
    };

    let user = state
        .user_service
        .admin_update(&id, update)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(user.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = ApiResponse<EmptyData>),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_user(
    State(state): State<UserHandlerState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<EmptyData>>, ApiError<EmptyData>> {
    state.user_service.delete_user(&id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/regenerate-qr",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "QR payload rebuilt", body = ApiResponse<UserDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn regenerate_qr(
    State(state): State<UserHandlerState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError<UserDto>> {
    let user = state.user_service.regenerate_qr(&id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(user.into())))
}
