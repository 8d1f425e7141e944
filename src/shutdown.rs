use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Duration;
use tracing::warn;

/// Cooperative stop signal shared by a run and whatever may interrupt it.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Shutdown::new()
    }
}

impl Shutdown {
    pub fn new() -> Shutdown {
        let (tx, rx) = watch::channel(false);
        Shutdown {
            tx: Arc::new(tx),
            rx,
        }
    }

    pub fn trigger(&self) {
        // A receiver lives in `self`, so sending cannot fail.
        let _ = self.tx.send(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the signal fires.
    pub async fn wait(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                return std::future::pending().await;
            }
        }
    }

    /// Fires on Ctrl-C.
    pub fn listen_for_ctrl_c(&self) {
        let shutdown = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, finishing current record");
                shutdown.trigger();
            }
        });
    }

    /// Fires once `timeout` has elapsed.
    pub fn trigger_after(&self, timeout: Duration) {
        let shutdown = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            warn!("Run timeout of {:?} reached", timeout);
            shutdown.trigger();
        });
    }
}
