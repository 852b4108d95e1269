//! # inksyncd — inksync daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars) and initialise logging
//! - Open the `SQLite` pool and run migrations
//! - Pick the PC endpoint: companion agent or virtual PC
//! - Construct services and the automation engine via `AppState::wire`
//! - Run the engine's reconcile loop next to the HTTP server
//! - Shut both down gracefully on SIGINT/SIGTERM
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;
mod pc;

use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use inksync_adapter_http_axum::state::{AppState, Backend, Ports};
use inksync_adapter_modules_fs::FsModuleRegistry;
use inksync_adapter_pc_link::{AgentConfig, ReqwestWebClient};
use inksync_adapter_storage_sqlite_sqlx::{SqliteAutomationStore, SqliteCalendarStore};
use inksync_adapter_virtual::VirtualPc;
use inksync_app::event_bus::InProcessEventBus;

use crate::config::Config;
use crate::pc::PcBackend;

struct Daemon;

impl Backend for Daemon {
    type Store = SqliteAutomationStore;
    type Calendar = SqliteCalendarStore;
    type Modules = FsModuleRegistry;
    type Pc = PcBackend;
    type Web = ReqwestWebClient;
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("unable to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|err| {
            eprintln!("invalid log filter {:?}: {err}", config.logging.filter);
            EnvFilter::new("info")
        }))
        .init();

    // Database
    let db = inksync_adapter_storage_sqlite_sqlx::Config {
        database_url: config.database.url.clone(),
        max_connections: config.database.max_connections,
    }
    .build()
    .await
    .context("unable to open database")?;
    let pool = db.pool().clone();

    // Outbound
    let pc = match &config.pc.agent_url {
        Some(url) => PcBackend::Agent(
            AgentConfig {
                base_url: url.clone(),
                timeout: config.pc_timeout(),
            }
            .build()
            .context("unable to build PC agent client")?,
        ),
        None => PcBackend::Virtual(VirtualPc::new(config.pc.virtual_history)),
    };
    tracing::info!(endpoint = pc.label(), "PC endpoint selected");

    let mut web = inksync_adapter_pc_link::WebConfig {
        timeout: config.web_timeout(),
        ..Default::default()
    };
    if let Some(user_agent) = &config.web.user_agent {
        web.user_agent.clone_from(user_agent);
    }
    let web = web.build().context("unable to build web client")?;

    let modules = inksync_adapter_modules_fs::Config {
        modules_dir: config.modules.modules_dir.clone(),
        configs_dir: config.modules.configs_dir.clone(),
    }
    .build();

    // Services and engine
    let event_bus = Arc::new(InProcessEventBus::new(config.engine.event_capacity));
    let state = AppState::<Daemon>::wire(
        Ports {
            store: Arc::new(SqliteAutomationStore::new(pool.clone())),
            calendar: Arc::new(SqliteCalendarStore::new(pool)),
            modules: Arc::new(modules),
            pc: Arc::new(pc),
            web: Arc::new(web),
        },
        Arc::clone(&event_bus),
    );

    let shutdown = CancellationToken::new();
    let engine = Arc::clone(&state.engine);
    let engine_task = tokio::spawn({
        let events = event_bus.subscribe();
        let shutdown = shutdown.clone();
        async move { engine.run_forever(events, shutdown).await }
    });

    // HTTP
    let app = inksync_adapter_http_axum::router::build(state);
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("unable to bind {bind_addr}"))?;
    tracing::info!(address = %bind_addr, "inksyncd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await
        .context("server error")?;

    shutdown.cancel();
    engine_task.await.context("automation engine task panicked")?;
    tracing::info!("inksyncd stopped");
    Ok(())
}

/// Resolve on SIGINT or SIGTERM, cancelling `shutdown` for the engine.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "unable to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "unable to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
        () = shutdown.cancelled() => {},
    }
    tracing::info!("shutdown requested");
    shutdown.cancel();
}
