use anyhow::Context;
use clap::Parser;
use ports_api::utils::{logger, validation::Validate};
use ports_api::{router, AppState, InMemoryPortRepository, PortService, ServerConfig};
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// 強制取消後，等待進行中的同步回應的時間
const CANCEL_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse()
        .load()
        .context("failed to load configuration file")?;

    // 初始化日誌
    logger::init_logger(config.verbose, config.json_logs);

    tracing::info!("Starting ports-api");
    if config.verbose {
        tracing::debug!("Server config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let service = PortService::new(InMemoryPortRepository::new())
        .with_max_record_bytes(config.max_record_bytes);
    let shutdown = CancellationToken::new();
    let app = router(AppState::new(Arc::new(service), shutdown.clone()));

    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!("🚀 Listening on {}", listener.local_addr()?);

    let signalled = CancellationToken::new();
    let serve = axum::serve(listener, app)
        .with_graceful_shutdown({
            let signalled = signalled.clone();
            async move {
                shutdown_signal().await;
                tracing::info!("Shutdown signal received, draining connections");
                signalled.cancel();
            }
        })
        .into_future();
    let mut serve = std::pin::pin!(serve);

    let grace = config.shutdown_timeout();
    tokio::select! {
        result = &mut serve => result.context("server error")?,
        _ = async {
            signalled.cancelled().await;
            tokio::time::sleep(grace).await;
        } => {
            tracing::warn!("graceful shutdown timed out after {:?}, cancelling in-flight syncs", grace);
            shutdown.cancel();
            if tokio::time::timeout(CANCEL_GRACE, &mut serve).await.is_err() {
                anyhow::bail!("graceful shutdown timed out.. forcing exit");
            }
        }
    }

    tracing::info!("✅ Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
