//! Recurring tick driver
//!
//! Runs [`SyncSession::tick`] on a tokio interval until cancelled or until
//! the session is torn down.

use crate::error::{EngineError, EngineResult};
use crate::session::SyncSession;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Session shared between the driver and the presentation layer
pub type SharedSession = Arc<Mutex<SyncSession>>;

/// Wraps a session for sharing with a [`TickDriver`]
pub fn shared(session: SyncSession) -> SharedSession {
    Arc::new(Mutex::new(session))
}

/// Handle to a running tick task
///
/// Dropping the driver cancels it.
#[derive(Debug)]
pub struct TickDriver {
    cancelled: Arc<AtomicBool>,
    handle: JoinHandle<()>,
    updates: watch::Receiver<u64>,
}

impl TickDriver {
    /// Starts ticking `session` every `period`
    ///
    /// Must be called from within a tokio runtime. The task stops on its own
    /// once the session is dismissed. A zero `period` is rejected.
    pub fn spawn(session: SharedSession, period: Duration) -> EngineResult<Self> {
        if period.is_zero() {
            return Err(EngineError::InvalidTickPeriod(period));
        }

        let generation = session
            .lock()
            .map_err(|_| EngineError::lock_poisoned())?
            .generation();

        let cancelled = Arc::new(AtomicBool::new(false));
        let (updates_tx, updates) = watch::channel(0u64);
        let flag = Arc::clone(&cancelled);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut changes = 0u64;

            loop {
                interval.tick().await;
                if flag.load(Ordering::SeqCst) {
                    break;
                }

                let changed = {
                    let Ok(mut guard) = session.lock() else {
                        log::error!("Session lock poisoned, stopping tick driver");
                        break;
                    };
                    if flag.load(Ordering::SeqCst) {
                        break;
                    }
                    if !guard.is_live(generation) {
                        log::debug!("Session {} torn down, stopping tick driver", guard.id());
                        break;
                    }
                    guard.tick()
                };

                if changed {
                    changes += 1;
                    let _ = updates_tx.send(changes);
                }
            }
        });

        Ok(Self {
            cancelled,
            handle,
            updates,
        })
    }

    /// Receiver that is bumped whenever a tick changed the session
    pub fn updates(&self) -> watch::Receiver<u64> {
        self.updates.clone()
    }

    /// Stops ticking; no tick runs after this returns
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.handle.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        self.cancel();
    }
}
