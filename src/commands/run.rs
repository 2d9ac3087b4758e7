use crate::output::UserOutput;
use caller_shell::Shell;
use tokio_util::sync::CancellationToken;

/// Bring the client up, wait for Ctrl+C or SIGTERM, then shut down.
pub async fn run_shell(shell: Shell, out: &dyn UserOutput) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();

    // A signal during startup cancels any pending retry of the caller process.
    let signal_cancel = cancel.clone();
    let signals = tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        signal_cancel.cancel();
    });

    shell.startup(&cancel).await?;

    if shell.is_caller_running().await {
        out.status(&format!(
            "Caller process running on port {}. Press Ctrl+C to stop.",
            shell.caller_port()
        ));
    } else {
        out.warning("Caller process is not running; local data remains available. Press Ctrl+C to stop.");
    }

    cancel.cancelled().await;
    signals.abort();

    out.status("Shutting down...");
    shell.shutdown().await?;
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("Failed to create SIGTERM handler: {}", e);
            tokio::signal::ctrl_c().await.ok();
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
}
