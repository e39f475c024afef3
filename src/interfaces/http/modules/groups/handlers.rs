//! Group management API handlers (admin only)

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    AddMembersRequest, AddMembersResponse, CreateGroupRequest, GroupDto, ListGroupsParams,
    RenameGroupRequest,
};
use crate::application::groups::GroupMembershipManager;
use crate::interfaces::http::common::{domain_error, ApiError, ApiResponse, EmptyData, ValidatedJson};

#[derive(Clone)]
pub struct GroupHandlerState {
    pub groups: Arc<GroupMembershipManager>,
}

#[utoipa::path(
    get,
    path = "/api/v1/groups",
    tag = "Groups",
    security(("bearer_auth" = [])),
    params(ListGroupsParams),
    responses(
        (status = 200, description = "Groups, newest first", body = ApiResponse<Vec<GroupDto>>)
    )
)]
pub async fn list_groups(
    State(state): State<GroupHandlerState>,
    Query(params): Query<ListGroupsParams>,
) -> Result<Json<ApiResponse<Vec<GroupDto>>>, ApiError<Vec<GroupDto>>> {
    let groups = state
        .groups
        .list_groups(params.search.as_deref())
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(
        groups.into_iter().map(GroupDto::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/groups",
    tag = "Groups",
    security(("bearer_auth" = [])),
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Group created", body = ApiResponse<GroupDto>),
        (status = 400, description = "Unknown school ID"),
        (status = 409, description = "Name taken or a member is already grouped")
    )
)]
pub async fn create_group(
    State(state): State<GroupHandlerState>,
    ValidatedJson(request): ValidatedJson<CreateGroupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<GroupDto>>), ApiError<GroupDto>> {
    let group = state
        .groups
        .create_group(&request.name, &request.members)
        .await
        .map_err(domain_error)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(group.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/groups/{id}",
    tag = "Groups",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Group with members", body = ApiResponse<GroupDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_group(
    State(state): State<GroupHandlerState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<GroupDto>>, ApiError<GroupDto>> {
    let group = state.groups.get_group(&id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(group.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/groups/{id}",
    tag = "Groups",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Group ID")),
    request_body = RenameGroupRequest,
    responses(
        (status = 200, description = "Group renamed", body = ApiResponse<GroupDto>),
        (status = 404, description = "Not found"),
        (status = 409, description = "Name taken")
    )
)]
pub async fn rename_group(
    State(state): State<GroupHandlerState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<RenameGroupRequest>,
) -> Result<Json<ApiResponse<GroupDto>>, ApiError<GroupDto>> {
    let group = state
        .groups
        .rename_group(&id, &request.name)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(group.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/groups/{id}",
    tag = "Groups",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Group deleted, its duties are kept", body = ApiResponse<EmptyData>),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_group(
    State(state): State<GroupHandlerState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<EmptyData>>, ApiError<EmptyData>> {
    state.groups.delete_group(&id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}

#[utoipa::path(
    post,
    path = "/api/v1/groups/{id}/members",
    tag = "Groups",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Group ID")),
    request_body = AddMembersRequest,
    responses(
        (status = 200, description = "Per-item outcome", body = ApiResponse<AddMembersResponse>),
        (status = 404, description = "Group not found")
    )
)]
pub async fn add_members(
    State(state): State<GroupHandlerState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<AddMembersRequest>,
) -> Result<Json<ApiResponse<AddMembersResponse>>, ApiError<AddMembersResponse>> {
    let report = state
        .groups
        .add_members(&id, &request.school_ids)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(report.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/groups/{id}/members/{user_id}",
    tag = "Groups",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Group ID"),
        ("user_id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Member removed", body = ApiResponse<EmptyData>),
        (status = 400, description = "User is not a member"),
        (status = 404, description = "Group not found")
    )
)]
pub async fn remove_member(
    State(state): State<GroupHandlerState>,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<EmptyData>>, ApiError<EmptyData>> {
    state
        .groups
        .remove_member(&id, &user_id)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}
