//! MCare server runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: metrics recorder, database and
//! migrations, default admin, services, the REST API and the daily duty
//! reminder job, plus graceful shutdown of all of them.

use std::sync::Arc;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use crate::application::{
    AttendanceRecorder, DutyScheduler, GroupMembershipManager, NotificationSender, Notifier,
    ReminderJob, UserService,
};
use crate::config::AppConfig;
use crate::domain::{Clock, RepositoryProvider, SystemClock};
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::mail::{LogNotificationSender, SmtpNotificationSender};
use crate::infrastructure::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};
use crate::interfaces::http::{create_api_router, ApiServices};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

// ── Options ────────────────────────────────────────────────────────

pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
    /// Seed the configured admin when the user table is empty (default: true).
    pub create_default_admin: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            create_default_admin: true,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running MCare service.
///
/// ```rust,no_run
/// use mcare::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.shutdown_signal().wait().await;
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub repos: Arc<dyn RepositoryProvider>,
    pub reminders: Option<Arc<ReminderJob>>,
    pub config: AppConfig,
    pub api_port: u16,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        app_cfg.validate()?;

        info!("Starting MCare service...");

        let prometheus_handle = metrics_handle();

        // ── Clock & security ───────────────────────────────────
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(app_cfg.reminder.offset()?));
        match &app_cfg.reminder.utc_offset {
            Some(offset) => info!("Calendar days follow UTC{}", offset.trim()),
            None => info!("Calendar days follow the process-local time zone"),
        }

        if app_cfg.security.jwt_secret.is_empty() {
            warn!("⚠️  security.jwt_secret is empty; using a random secret, tokens will not survive a restart");
        }
        let jwt_config = JwtConfig::new(
            app_cfg.security.jwt_secret_or_random(),
            app_cfg.security.jwt_expiration_hours,
        );
        info!(
            "JWT configured with {}h token expiration",
            jwt_config.expiration_hours
        );

        // ── Database ───────────────────────────────────────────
        let db_config = DatabaseConfig {
            url: app_cfg.database.connection_url().to_string(),
            sqlx_logging: app_cfg.logging.level.eq_ignore_ascii_case("trace"),
        };
        let db = init_database(&db_config).await?;

        if opts.auto_migrate {
            info!("Running database migrations...");
            Migrator::up(&db, None).await?;
            info!("Migrations completed");
        }

        let repos: Arc<dyn RepositoryProvider> =
            Arc::new(SeaOrmRepositoryProvider::new(db.clone()));

        // ── Notifications ──────────────────────────────────────
        let sender: Arc<dyn NotificationSender> = if app_cfg.mail.enabled {
            let mail = &app_cfg.mail;
            let smtp = SmtpNotificationSender::new(
                &mail.smtp_host,
                mail.smtp_port,
                &mail.username,
                &mail.password,
                &mail.from_name,
                &mail.from_address,
            )?;
            info!(
                "📧 SMTP delivery via {}:{} ({:?})",
                mail.smtp_host, mail.smtp_port, mail.delivery
            );
            Arc::new(smtp)
        } else {
            info!("📧 Mail disabled, notifications are logged only");
            Arc::new(LogNotificationSender)
        };
        let notifier = Arc::new(Notifier::new(sender, app_cfg.mail.delivery));

        // ── Services ───────────────────────────────────────────
        let users = Arc::new(UserService::new(
            repos.clone(),
            jwt_config.clone(),
            app_cfg.security.bcrypt_cost,
            app_cfg.server.public_base_url.clone(),
            notifier.clone(),
        ));
        let groups = Arc::new(GroupMembershipManager::new(repos.clone()));
        let duties = Arc::new(DutyScheduler::new(repos.clone(), notifier.clone()));
        let attendance = Arc::new(AttendanceRecorder::new(repos.clone(), clock.clone()));

        if opts.create_default_admin {
            let admin = &app_cfg.admin;
            match users
                .ensure_default_admin(&admin.school_id, &admin.username, &admin.email, &admin.password)
                .await
            {
                Ok(true) => warn!("⚠️  Please change the admin password immediately!"),
                Ok(false) => {}
                Err(e) => error!("Failed to create admin user: {}", e),
            }
        }

        // ── Shutdown coordinator ───────────────────────────────
        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        // ── Duty reminders ─────────────────────────────────────
        let reminders = if app_cfg.reminder.enabled {
            let job = Arc::new(ReminderJob::new(repos.clone(), notifier, clock.clone()));
            job.clone()
                .start(app_cfg.reminder.trigger_time()?, shutdown_signal.clone());
            Some(job)
        } else {
            info!("Duty reminders disabled");
            None
        };

        // ── REST API server ────────────────────────────────────
        let api_router = create_api_router(ApiServices {
            users,
            groups,
            duties,
            attendance,
            clock,
            jwt_config,
            db: db.clone(),
            metrics_handle: prometheus_handle,
            reminders_enabled: reminders.is_some(),
        });

        let api_port = app_cfg.server.api_port;
        let api_addr = format!("{}:{}", app_cfg.server.api_host, api_port);
        let listener = tokio::net::TcpListener::bind(&api_addr).await?;
        info!("REST API server listening on http://{}", api_addr);
        info!("Swagger UI available at http://{}/docs/", api_addr);

        let api_shutdown = shutdown_signal.clone();
        let api_server = axum::serve(listener, api_router).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("🛑 REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        info!("🚀 MCare started.");

        Ok(Self {
            repos,
            reminders,
            config: app_cfg,
            api_port,
            db,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install SIGTERM/SIGINT listeners that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Send the shutdown signal without waiting.
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the API server to stop, bounded by the configured
    /// shutdown timeout, then close the database.
    pub async fn wait(self) {
        info!("⏳ Waiting for server tasks to complete...");

        let timeout = std::time::Duration::from_secs(self.shutdown.timeout_secs());
        match tokio::time::timeout(timeout, self.api_task).await {
            Ok(Ok(())) => info!("REST API server stopped"),
            Ok(Err(e)) => error!("REST API server task panicked: {}", e),
            Err(_) => warn!(
                "REST API server did not stop within {}s, giving up",
                timeout.as_secs()
            ),
        }

        if let Err(e) = self.db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("✅ Database connection closed");
        }

        info!("👋 MCare shutdown complete");
    }

    pub async fn shutdown(self) {
        info!("🛑 Shutting down MCare...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// The global metrics recorder can only be installed once per process;
/// a restart within the same process reuses it.
fn metrics_handle() -> PrometheusHandle {
    use std::sync::OnceLock;
    static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

    PROM_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("📊 Prometheus metrics recorder installed");
                handle
            }
            Err(e) => {
                warn!(error = %e, "Could not install the global metrics recorder, /metrics will stay empty");
                PrometheusBuilder::new().build_recorder().handle()
            }
        })
        .clone()
}

/// Initialize tracing from the application config. `RUST_LOG` wins over
/// `[logging] level`. Call once, before [`ServerHandle::start`].
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}
