use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;

use crate::platform::HostPlatform;
use crate::selector::{RecoveryReport, RecoveryScanner, WidgetStore};

use super::config::DemiseRuntimeConfig;
use super::dispatch::InteractionRouter;
use super::ingress::{DemiseIngressApp, IngressAuth, build_interactions_app};

/// One recovery pass into `store`; the store is marked ready afterwards.
pub async fn run_recovery_scan(
    platform: Arc<dyn HostPlatform>,
    store: Arc<WidgetStore>,
    config: &DemiseRuntimeConfig,
) -> Result<RecoveryReport> {
    let scanner = RecoveryScanner::new(platform, Arc::clone(&store));
    let report = scanner
        .recover_guilds(&config.allowed_guilds, config.history_limit)
        .await
        .context("role selector recovery failed")?;
    store.mark_ready();
    Ok(report)
}

/// Serve the interactions ingress until Ctrl+C.
///
/// The listener binds first; recovery then runs in the background and
/// selection interactions get a "still loading" reply until it completes.
pub async fn run_discord_ingress(
    platform: Arc<dyn HostPlatform>,
    config: DemiseRuntimeConfig,
) -> Result<()> {
    let store = Arc::new(WidgetStore::default());
    let router = Arc::new(InteractionRouter::new(
        Arc::clone(&platform),
        Arc::clone(&store),
        config.clone(),
    ));
    let auth = IngressAuth {
        verifier: config.verifier.clone(),
        secret_token: config.secret_token.clone(),
    };
    let DemiseIngressApp { app, path } = build_interactions_app(router, &config.ingress_path, auth);
    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind ingress on {}", config.bind_addr))?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let mut ingress_server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    println!(
        "Interactions ingress listening on {}{} (Ctrl+C to stop)",
        config.bind_addr, path
    );
    println!(
        "Role selector recovery: history_limit={} guilds={}",
        config.history_limit,
        if config.allowed_guilds.is_empty() {
            "all".to_string()
        } else {
            config.allowed_guilds.len().to_string()
        }
    );

    let recovery_config = config.clone();
    let mut recovery = tokio::spawn(async move {
        run_recovery_scan(platform, store, &recovery_config).await
    });
    let mut recovery_done = false;

    loop {
        tokio::select! {
            result = &mut recovery, if !recovery_done => {
                recovery_done = true;
                match result {
                    Ok(Ok(report)) => println!(
                        "Recovered {} role selector(s) from {} channel(s) ({} failed)",
                        report.widgets_recovered, report.channels_scanned, report.channels_failed
                    ),
                    Ok(Err(error)) => {
                        tracing::error!(
                            event = "selector.recovery.failed",
                            error = %format!("{error:#}"),
                            "role selector recovery failed"
                        );
                        let _ = shutdown_tx.send(());
                        return Err(error);
                    }
                    Err(error) => {
                        tracing::error!("recovery task join error: {error}");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("Shutting down...");
                break;
            }
            result = &mut ingress_server => {
                match result {
                    Ok(Ok(())) => tracing::warn!("interactions ingress server exited"),
                    Ok(Err(error)) => tracing::error!("interactions ingress server failed: {error}"),
                    Err(error) => tracing::error!("interactions ingress task join error: {error}"),
                }
                break;
            }
        }
    }

    if !recovery_done {
        recovery.abort();
    }
    let _ = shutdown_tx.send(());
    Ok(())
}
