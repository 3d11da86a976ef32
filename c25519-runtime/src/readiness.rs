//! One-shot readiness signal for background linking.

use crate::bridge::Bridge;
use c25519_core::error::{C25519Error, Result};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Progress of linking the module against its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Linking has not started.
    Uninitialized,
    /// Instantiation is in progress.
    Linking,
    /// The module is linked; primitives may be called.
    Ready,
    /// Linking failed; the error is returned by [`Linking::finish`].
    Failed,
}

impl LinkState {
    /// Whether the state can no longer change.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }
}

/// Cloneable readiness signal.
///
/// Both primitive groups observe the same signal. Once it reports ready it
/// stays ready.
#[derive(Debug, Clone)]
pub struct Readiness {
    rx: watch::Receiver<LinkState>,
}

impl Readiness {
    pub(crate) fn channel() -> (watch::Sender<LinkState>, Self) {
        let (tx, rx) = watch::channel(LinkState::Uninitialized);
        (tx, Self { rx })
    }

    /// Current state without waiting.
    pub fn state(&self) -> LinkState {
        *self.rx.borrow()
    }

    /// Whether linking has completed successfully.
    pub fn is_ready(&self) -> bool {
        self.state() == LinkState::Ready
    }

    /// Wait until linking completes.
    pub async fn ready(&self) -> Result<()> {
        let mut rx = self.rx.clone();
        let state = rx
            .wait_for(|state| state.is_terminal())
            .await
            .map(|state| *state)
            .map_err(|_| C25519Error::LinkAborted {
                cause: "linking task ended without reporting".to_string(),
            })?;

        match state {
            LinkState::Ready => Ok(()),
            _ => Err(C25519Error::LinkAborted {
                cause: "linking failed".to_string(),
            }),
        }
    }
}

/// Handle to a link running in the background.
pub struct Linking {
    readiness: Readiness,
    handle: JoinHandle<Result<Bridge>>,
}

impl Linking {
    pub(crate) fn new(readiness: Readiness, handle: JoinHandle<Result<Bridge>>) -> Self {
        Self { readiness, handle }
    }

    /// A readiness signal for this link.
    pub fn readiness(&self) -> Readiness {
        self.readiness.clone()
    }

    /// Wait for the link and take the bridge.
    pub async fn finish(self) -> Result<Bridge> {
        self.handle.await.map_err(|e| C25519Error::LinkAborted {
            cause: e.to_string(),
        })?
    }
}
