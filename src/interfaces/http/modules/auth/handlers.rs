//! Authentication API handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};

use super::dto::{
    AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest,
    UpdateUsernameRequest,
};
use crate::application::identity::{ProfileUpdate, Registration, UserService};
use crate::interfaces::http::common::{domain_error, ApiError, ApiResponse, EmptyData, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::modules::users::{UserDetailsDto, UserDto};

#[derive(Clone)]
pub struct AuthHandlerState {
    pub user_service: Arc<UserService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError<AuthResponse>> {
    let result = state
        .user_service
        .login(&request.username, &request.password)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(result.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created and signed in", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "School ID, username or e-mail already exists")
    )
)]
pub async fn register(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), ApiError<AuthResponse>> {
    let registration = Registration {
        school_id: request.school_id,
        username: request.username,
        email: request.email,
        password: request.password,
        name: request.name,
        section: request.section,
        course: request.course,
        year: request.year,
        department: request.department,
    };

    let result = state
        .user_service
        .register(registration)
        .await
        .map_err(domain_error)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(result.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user with their group", body = ApiResponse<UserDetailsDto>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_current_user(
    State(state): State<AuthHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<UserDetailsDto>>, ApiError<UserDetailsDto>> {
    let user = state
        .user_service
        .get_user_with_group(&caller.user_id)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(user.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/auth/change-password",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = ApiResponse<EmptyData>),
        (status = 400, description = "New password too weak"),
        (status = 401, description = "Invalid current password")
    )
)]
pub async fn change_password(
    State(state): State<AuthHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<EmptyData>>, ApiError<EmptyData>> {
    state
        .user_service
        .change_password(&caller.user_id, &request.current_password, &request.new_password)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}

#[utoipa::path(
    put,
    path = "/api/v1/auth/profile",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<UserDto>),
        (status = 422, description = "Validation error")
    )
)]
pub async fn update_profile(
    State(state): State<AuthHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError<UserDto>> {
    let update = ProfileUpdate {
        name: request.name,
        section: request.section,
        course: request.course,
        year: request.year,
        department: request.department,
        profile_image: request.profile_image,
    };

    let user = state
        .user_service
        .update_profile(&caller.user_id, update)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(user.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/auth/username",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    request_body = UpdateUsernameRequest,
    responses(
        (status = 200, description = "Username changed", body = ApiResponse<UserDto>),
        (status = 409, description = "Username taken")
    )
)]
pub async fn update_username(
    State(state): State<AuthHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<UpdateUsernameRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError<UserDto>> {
    let user = state
        .user_service
        .update_username(&caller.user_id, &request.username)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(user.into())))
}
