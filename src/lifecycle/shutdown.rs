//! Shutdown coordination between the signal handler and the accept loop.
//!
//! Backed by a `watch` channel holding a single flag, so a listener that
//! subscribes after the trigger still sees it. Dropping the [`Shutdown`]
//! handle is not a shutdown request: only [`Shutdown::trigger`] stops the
//! proxy.

use tokio::sync::watch;

/// Owner side of the shutdown flag.
#[derive(Debug)]
pub struct Shutdown {
    flag: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (flag, _) = watch::channel(false);
        Self { flag }
    }

    /// A handle for the accept loop to wait on.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            flag: self.flag.subscribe(),
        }
    }

    /// Ask every subscriber to stop. Later calls are no-ops.
    pub fn trigger(&self) {
        self.flag.send_if_modified(|stopping| !std::mem::replace(stopping, true));
    }

    pub fn is_triggered(&self) -> bool {
        *self.flag.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver side of the shutdown flag.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    flag: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolve once shutdown has been triggered.
    ///
    /// Never resolves if the owning [`Shutdown`] is dropped without triggering.
    pub async fn wait(&mut self) {
        let owner_gone = self.flag.wait_for(|stopping| *stopping).await.is_err();
        if owner_gone {
            std::future::pending::<()>().await;
        }
    }

    pub fn is_triggered(&self) -> bool {
        *self.flag.borrow()
    }
}
