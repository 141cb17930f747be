/*!
 * Pause/resume/cancel handle and event fan-out for a translation run.
 *
 * Control signals travel over a `watch` channel so a paused run sleeps until
 * the state changes instead of polling. Progress and status events go out on
 * a `broadcast` channel that any number of observers may subscribe to.
 */

use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};

use crate::errors::TranslationError;

use super::progress::{TranslationEvent, TranslationProgress, TranslationStatus};

/// Signal observed by the run loop at each boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControlState {
    Running,
    Paused,
    Cancelled,
}

/// Cloneable handle shared between a run and its controllers
#[derive(Debug, Clone)]
pub struct RunControl {
    state: Arc<watch::Sender<ControlState>>,
    events: broadcast::Sender<TranslationEvent>,
    status: Arc<Mutex<TranslationStatus>>,
}

impl RunControl {
    pub fn new(event_capacity: usize) -> Self {
        let (state, _) = watch::channel(ControlState::Running);
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Self {
            state: Arc::new(state),
            events,
            status: Arc::new(Mutex::new(TranslationStatus::Idle)),
        }
    }

    /// Receive every progress and status event from now on
    pub fn subscribe(&self) -> broadcast::Receiver<TranslationEvent> {
        self.events.subscribe()
    }

    /// Hold the run at its next boundary. In-flight requests still finish.
    /// Returns `false` when no running run was affected or a cancel is pending.
    pub fn pause(&self) -> bool {
        {
            let mut status = self.status.lock();
            if *status != TranslationStatus::Running {
                return false;
            }
            let paused = self.state.send_if_modified(|state| {
                if *state == ControlState::Running {
                    *state = ControlState::Paused;
                    true
                } else {
                    false
                }
            });
            if !paused {
                return false;
            }
            *status = TranslationStatus::Paused;
        }
        debug!("Translation paused");
        self.publish(TranslationEvent::Status(TranslationStatus::Paused));
        true
    }

    /// Release a paused run. Returns `false` when the run was not paused.
    pub fn resume(&self) -> bool {
        {
            let mut status = self.status.lock();
            if *status != TranslationStatus::Paused {
                return false;
            }
            self.state.send_if_modified(|state| {
                if *state == ControlState::Paused {
                    *state = ControlState::Running;
                    true
                } else {
                    false
                }
            });
            *status = TranslationStatus::Running;
        }
        debug!("Translation resumed");
        self.publish(TranslationEvent::Status(TranslationStatus::Running));
        true
    }

    /// Ask the run to stop at its next boundary, waking it if paused
    pub fn cancel(&self) {
        debug!("Translation cancellation requested");
        self.state.send_replace(ControlState::Cancelled);
    }

    pub fn status(&self) -> TranslationStatus {
        *self.status.lock()
    }

    pub fn is_paused(&self) -> bool {
        *self.state.borrow() == ControlState::Paused
    }

    pub fn is_cancelled(&self) -> bool {
        *self.state.borrow() == ControlState::Cancelled
    }

    /// Clear leftover signals and announce a new run
    pub(crate) fn begin(&self) {
        self.state.send_replace(ControlState::Running);
        self.set_status(TranslationStatus::Running);
    }

    pub(crate) fn set_status(&self, status: TranslationStatus) {
        *self.status.lock() = status;
        self.publish(TranslationEvent::Status(status));
    }

    pub(crate) fn emit_progress(&self, progress: &TranslationProgress) {
        self.publish(TranslationEvent::Progress(progress.clone()));
    }

    /// Block while paused; fail with `Cancelled` once cancellation is seen
    pub(crate) async fn checkpoint(&self) -> Result<(), TranslationError> {
        let mut receiver = self.state.subscribe();
        let state = match receiver.wait_for(|state| *state != ControlState::Paused).await {
            Ok(state) => *state,
            Err(_) => ControlState::Cancelled,
        };

        match state {
            ControlState::Cancelled => Err(TranslationError::Cancelled),
            _ => Ok(()),
        }
    }

    fn publish(&self, event: TranslationEvent) {
        // No subscribers is not an error
        let _ = self.events.send(event);
    }
}

impl Default for RunControl {
    fn default() -> Self {
        Self::new(256)
    }
}
