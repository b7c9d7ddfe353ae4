use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tiendacl::{
    build_router,
    config::{self, ConfigError},
    db,
    middleware::uploads,
    state::AppState,
    store::PgStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logging (stdout + tägliche Datei-Rotation unter ./logs)
    std::fs::create_dir_all("logs").ok();
    let (stdout_nb, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    let file_appender = tracing_appender::rolling::daily("logs", "tiendacl.log");
    let (file_nb, file_guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(stdout_nb))
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file_nb))
        .init();
    // Guards am Leben halten, damit die Non-Blocking Writer flushen
    let log_guards = (stdout_guard, file_guard);

    // Nothing network- or database-related happens before this succeeds.
    let app_cfg = match config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            match &e {
                ConfigError::MissingVars(keys) => {
                    for key in keys {
                        error!("La variable {} no está configurada", key);
                    }
                }
                other => error!("{}", other),
            }
            // exit() skips destructors; flush the log writers first
            drop(log_guards);
            std::process::exit(1);
        }
    };

    let pool = db::connect(&app_cfg.database);
    // Non-fatal: the pool may still work on first real use.
    if db::log_connection_check(&pool).await {
        if let Err(e) = db::init_db(&pool).await {
            error!("Error al inicializar el esquema: {:?}", e);
        }
    }

    uploads::ensure_uploads_dir(&app_cfg.uploads_dir)?;

    let addr: SocketAddr = format!("{}:{}", app_cfg.server.host, app_cfg.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid listen addr {}:{} - {}", app_cfg.server.host, app_cfg.server.port, e))?;
    let environment = app_cfg.environment.clone();

    let state = AppState::new(Arc::new(PgStore::new(pool)), app_cfg);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    info!(port = local.port(), environment = %environment, "Servidor iniciado en http://{}", local);
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    drop(log_guards);
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("No se pudo instalar el manejador de SIGTERM: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("Señal de apagado recibida. Deteniendo el servidor...");
}
