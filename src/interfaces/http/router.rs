//! API router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{AttendanceRecorder, DutyScheduler, GroupMembershipManager, UserService};
use crate::domain::Clock;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::common::{ApiResponse, EmptyData};
use crate::interfaces::http::middleware::{auth_middleware, require_admin, AuthState};

use super::modules::{
    attendance, auth, duties, groups, health, metrics, request_id, users,
};

/// Everything the HTTP layer needs from the running service.
#[derive(Clone)]
pub struct ApiServices {
    pub users: Arc<UserService>,
    pub groups: Arc<GroupMembershipManager>,
    pub duties: Arc<DutyScheduler>,
    pub attendance: Arc<AttendanceRecorder>,
    pub clock: Arc<dyn Clock>,
    pub jwt_config: JwtConfig,
    pub db: DatabaseConnection,
    pub metrics_handle: PrometheusHandle,
    pub reminders_enabled: bool,
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token from /api/v1/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Auth
        auth::login,
        auth::register,
        auth::get_current_user,
        auth::change_password,
        auth::update_profile,
        auth::update_username,
        // Users
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
        users::regenerate_qr,
        // Groups
        groups::list_groups,
        groups::create_group,
        groups::get_group,
        groups::rename_group,
        groups::delete_group,
        groups::add_members,
        groups::remove_member,
        // Duties
        duties::list_duties,
        duties::create_duty,
        duties::get_duty,
        duties::update_duty,
        duties::delete_duty,
        duties::duties_for_user,
        // Attendance
        attendance::mark_attendance,
        attendance::list_attendance,
        attendance::student_attendance,
    ),
    components(
        schemas(
            ApiResponse<String>,
            EmptyData,
            health::HealthResponse,
            health::ComponentHealth,
            auth::LoginRequest,
            auth::AuthResponse,
            auth::RegisterRequest,
            auth::ChangePasswordRequest,
            auth::UpdateProfileRequest,
            auth::UpdateUsernameRequest,
            users::UserDto,
            users::GroupRef,
            users::UserDetailsDto,
            users::AdminUpdateUserRequest,
            groups::MemberDto,
            groups::GroupDto,
            groups::CreateGroupRequest,
            groups::RenameGroupRequest,
            groups::AddMembersRequest,
            groups::AddedMember,
            groups::SkippedMember,
            groups::AddMembersResponse,
            duties::DutyDto,
            duties::DeliveryDto,
            duties::ScheduledDutyDto,
            duties::CreateDutyRequest,
            duties::UpdateDutyRequest,
            attendance::AttendanceDto,
            attendance::MarkAttendanceResponse,
            attendance::AttendanceEntryDto,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Authentication", description = "Login, registration and the caller's own account"),
        (name = "Users", description = "User administration"),
        (name = "Groups", description = "Student groups; a student belongs to at most one"),
        (name = "Duties", description = "Per-group duty schedule, one duty per group per day"),
        (name = "Attendance", description = "QR check-in, one record per student per day"),
    ),
    info(
        title = "MCare API",
        version = "1.0.0",
        description = "Student duty scheduling and QR attendance",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Build the full application router.
pub fn create_api_router(services: ApiServices) -> Router {
    let auth_state = AuthState {
        jwt_config: services.jwt_config.clone(),
    };
    let authenticated = || middleware::from_fn_with_state(auth_state.clone(), auth_middleware);
    let admin_only = || middleware::from_fn(require_admin);

    // ── Auth ────────────────────────────────────────────────────
    let auth_handler_state = auth::AuthHandlerState {
        user_service: services.users.clone(),
    };
    let auth_public = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .with_state(auth_handler_state.clone());
    let auth_protected = Router::new()
        .route("/me", get(auth::get_current_user))
        .route("/change-password", put(auth::change_password))
        .route("/profile", put(auth::update_profile))
        .route("/username", put(auth::update_username))
        .route_layer(authenticated())
        .with_state(auth_handler_state);

    // ── Users (admin) ───────────────────────────────────────────
    let user_routes = Router::new()
        .route("/", get(users::list_users))
        .route(
            "/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/{id}/regenerate-qr", post(users::regenerate_qr))
        .route_layer(admin_only())
        .route_layer(authenticated())
        .with_state(users::UserHandlerState {
            user_service: services.users.clone(),
        });

    // ── Groups (admin) ──────────────────────────────────────────
    let group_routes = Router::new()
        .route("/", get(groups::list_groups).post(groups::create_group))
        .route(
            "/{id}",
            get(groups::get_group)
                .put(groups::rename_group)
                .delete(groups::delete_group),
        )
        .route("/{id}/members", post(groups::add_members))
        .route(
            "/{id}/members/{user_id}",
            delete(groups::remove_member),
        )
        .route_layer(admin_only())
        .route_layer(authenticated())
        .with_state(groups::GroupHandlerState {
            groups: services.groups.clone(),
        });

    // ── Duties ──────────────────────────────────────────────────
    let duty_state = duties::DutyHandlerState {
        duties: services.duties.clone(),
        clock: services.clock.clone(),
    };
    let duty_admin = Router::new()
        .route("/", get(duties::list_duties).post(duties::create_duty))
        .route(
            "/{id}",
            get(duties::get_duty)
                .put(duties::update_duty)
                .delete(duties::delete_duty),
        )
        .route_layer(admin_only())
        .route_layer(authenticated())
        .with_state(duty_state.clone());
    let duty_self = Router::new()
        .route("/user/{user_id}", get(duties::duties_for_user))
        .route_layer(authenticated())
        .with_state(duty_state);

    // ── Attendance ──────────────────────────────────────────────
    let attendance_state = attendance::AttendanceHandlerState {
        attendance: services.attendance.clone(),
        user_service: services.users.clone(),
    };
    let attendance_admin = Router::new()
        .route("/", get(attendance::list_attendance))
        .route("/mark/{school_id}", post(attendance::mark_attendance))
        .route_layer(admin_only())
        .route_layer(authenticated())
        .with_state(attendance_state.clone());
    let attendance_self = Router::new()
        .route("/{school_id}", get(attendance::student_attendance))
        .route_layer(authenticated())
        .with_state(attendance_state);

    // ── Operational ─────────────────────────────────────────────
    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health::HealthState {
            db: services.db.clone(),
            started_at: Arc::new(Instant::now()),
            reminders_enabled: services.reminders_enabled,
        });
    let metrics_routes = Router::new()
        .route("/metrics", get(metrics::prometheus_metrics))
        .with_state(metrics::MetricsState {
            handle: services.metrics_handle.clone(),
        });

    let api = Router::new()
        .nest("/auth", auth_public.merge(auth_protected))
        .nest("/users", user_routes)
        .nest("/groups", group_routes)
        .nest("/duties", duty_admin.merge(duty_self))
        .nest("/attendance", attendance_admin.merge(attendance_self));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(health_routes)
        .merge(metrics_routes)
        .nest("/api/v1", api)
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
