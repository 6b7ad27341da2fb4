use anyhow::Context;
use log::warn;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;

/// Exit status used when the grace period runs out after a termination request.
const FORCED_EXIT_CODE: i32 = 130;

/// Cooperative stop flag raised by SIGINT/SIGTERM.
#[derive(Clone, Default)]
pub struct Shutdown {
    requested: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Tells the watcher the driver has flushed and is exiting on its own.
    pub fn mark_finished(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }

    /// Spawns a watcher thread that raises the flag on a termination signal.
    ///
    /// A driver stuck in a blocking read (stdin) never sees the flag, so the
    /// watcher exits the process itself once `grace` has elapsed.
    pub fn install_signal_watcher(&self, grace: Duration) -> anyhow::Result<()> {
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        let shutdown = self.clone();
        thread::Builder::new()
            .name("signal-watch".into())
            .spawn(move || {
                runtime.block_on(wait_for_termination());
                warn!("termination requested; stopping stream");
                shutdown.request();
                thread::sleep(grace);
                if !shutdown.finished.load(Ordering::SeqCst) {
                    warn!("stream did not stop within {:?}; exiting", grace);
                    process::exit(FORCED_EXIT_CODE);
                }
            })
            .context("spawning signal watcher")?;
        Ok(())
    }
}

#[cfg(unix)]
async fn wait_for_termination() {
    use tokio::signal::unix::{signal as unix_signal, SignalKind};

    match unix_signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = signal::ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(err) => {
            warn!("cannot listen for SIGTERM: {}", err);
            let _ = signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_termination() {
    let _ = signal::ctrl_c().await;
}
