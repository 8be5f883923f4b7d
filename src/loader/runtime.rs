use super::{ServiceLoader, ShutdownReason};
use crate::error::{Result, ServiceError};
use crate::logging::LogGate;
use std::future::Future;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::{oneshot, Mutex};

impl ServiceLoader {
    /// Keep services running until SIGINT/SIGTERM, then shut them down.
    ///
    /// Returns the process exit code: 0 for a clean shutdown, 1 if any stop
    /// operation failed.
    pub async fn run(&mut self) -> Result<i32> {
        let (shutdown_sender, shutdown_receiver) = oneshot::channel();
        Self::setup_signal_handlers(shutdown_sender, self.log.clone());

        self.run_until(async move {
            shutdown_receiver.await.map_err(|_| {
                ServiceError::system("Shutdown channel closed unexpectedly")
            })
        })
        .await
    }

    /// Keep services running until `trigger` resolves, then shut them down
    pub async fn run_until<F>(&mut self, trigger: F) -> Result<i32>
    where
        F: Future<Output = Result<ShutdownReason>>,
    {
        self.log.message("Services are running");

        let shutdown_reason = trigger.await?;
        self.log
            .message(format!("Shutdown initiated: {:?}", shutdown_reason));

        let failures = self.stop_all();
        let exit_code = if failures == 0 { 0 } else { 1 };

        self.log
            .message(format!("Shutdown completed with exit code: {}", exit_code));
        Ok(exit_code)
    }

    /// Set up signal handlers for graceful shutdown
    fn setup_signal_handlers(shutdown_sender: oneshot::Sender<ShutdownReason>, log: LogGate) {
        let shutdown_sender = Arc::new(Mutex::new(Some(shutdown_sender)));

        // Handle SIGTERM (systemd stop) - Unix only
        #[cfg(unix)]
        {
            let shutdown_sender_sigterm = Arc::clone(&shutdown_sender);
            let log = log.clone();
            tokio::spawn(async move {
                let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate())
                {
                    Ok(sigterm) => sigterm,
                    Err(e) => {
                        log.error(format!("Failed to register SIGTERM handler: {}", e));
                        return;
                    }
                };

                if let Some(()) = sigterm.recv().await {
                    log.message("Received SIGTERM signal");
                    if let Some(sender) = shutdown_sender_sigterm.lock().await.take() {
                        let _ = sender.send(ShutdownReason::Signal("SIGTERM".to_string()));
                    }
                }
            });
        }

        // Handle SIGINT (Ctrl+C) - Cross-platform
        let shutdown_sender_sigint = Arc::clone(&shutdown_sender);
        tokio::spawn(async move {
            if let Ok(()) = signal::ctrl_c().await {
                log.message("Received SIGINT signal (Ctrl+C)");
                if let Some(sender) = shutdown_sender_sigint.lock().await.take() {
                    let _ = sender.send(ShutdownReason::Signal("SIGINT".to_string()));
                }
            }
        });
    }
}
