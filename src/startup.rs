use std::net::TcpListener;
use std::sync::Arc;

use actix_files::Files;
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use actix_web_lab::middleware::from_fn;
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_actix_web::TracingLogger;

use crate::authentication::authenticate;
use crate::compose;
use crate::configuration::{DatabaseSettings, Settings, StorageKind};
use crate::middleware::{
    log_request, recover_panic, secure_headers, verify_csrf, DebugMode, MemorySessionStore,
    SessionLayer,
};
use crate::routes::{self, ping};
use crate::storage::{InMemoryStore, Storage};
use crate::utils::not_found;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    /// Wire storage according to `configuration.storage` and bind the listener.
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let storage = match configuration.storage {
            StorageKind::Memory => {
                tracing::info!("using in-memory storage");
                Storage::in_memory(Arc::new(InMemoryStore::new()))
            }
            StorageKind::Postgres => {
                let connection_pool = get_connection_pool(&configuration.database);
                migrate(&configuration.database, &connection_pool)
                    .await
                    .context("Failed to migrate the database.")?;
                Storage::postgres(connection_pool)
            }
        };
        Self::build_with_storage(configuration, storage).await
    }

    /// Like [`Application::build`], with the storage supplied by the caller.
    pub async fn build_with_storage(
        configuration: Settings,
        storage: Storage,
    ) -> Result<Self, anyhow::Error> {
        let session_layer = SessionLayer::new(
            MemorySessionStore::new(),
            &configuration.application.session_secret,
            &configuration.session,
        )?;

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)
            .with_context(|| format!("Failed to bind {}.", address))?;
        let port = listener.local_addr()?.port();
        tracing::info!("app started at: {}:{}", configuration.application.host, port);

        let server = run(
            listener,
            storage,
            session_layer,
            DebugMode(configuration.application.debug),
            configuration.application.static_dir,
        )?;
        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    // A more expressive name that makes it clear that
    // this function only returns when the application is stopped
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn get_connection_pool(configuration: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_lazy_with(configuration.with_db())
}

async fn migrate(
    configuration: &DatabaseSettings,
    connection_pool: &PgPool,
) -> Result<(), sqlx::migrate::MigrateError> {
    if configuration.migrate {
        tracing::info!("migrating postgres");
        sqlx::migrate!("./migrations").run(connection_pool).await
    } else {
        Ok(())
    }
}

pub fn run(
    listener: TcpListener,
    storage: Storage,
    session_layer: SessionLayer,
    debug_mode: DebugMode,
    static_dir: String,
) -> Result<Server, std::io::Error> {
    let snippets = web::Data::from(storage.snippets);
    let users = web::Data::from(storage.users);
    let debug_mode = web::Data::new(debug_mode);

    let server = HttpServer::new(move || {
        compose!(
            from_fn(recover_panic),
            TracingLogger::default(),
            from_fn(log_request),
            from_fn(secure_headers)
            => App::new()
                .app_data(snippets.clone())
                .app_data(users.clone())
                .app_data(debug_mode.clone())
                .route("/ping", web::get().to(ping))
                .service(Files::new("/static", &static_dir))
                .service(compose!(
                    session_layer.middleware(),
                    from_fn(verify_csrf),
                    from_fn(authenticate)
                    => web::scope("")
                        .guard(routes::page_guard())
                        .configure(routes::configure)
                ))
                .default_service(web::to(not_found))
        )
    })
    .listen(listener)?
    .run();
    // No .await here
    Ok(server)
}
