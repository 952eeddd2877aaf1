use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

/// Messages posted from background tasks to the UI loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The inactivity countdown armed as `generation` ran out after `after`.
    InactivityTimeout { generation: u64, after: Duration },
}

/// Deadline used when `now + duration` does not fit in an `Instant`.
/// Roughly thirty years, the same horizon tokio clamps sleeps to.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

struct Pending {
    generation: u64,
    deadline: Instant,
    handle: JoinHandle<()>,
}

/// Single-shot auto-logout countdown.
///
/// At most one countdown is live: `arm` cancels the previous one before
/// scheduling. The countdown never touches session state itself; it posts a
/// `SessionEvent` and the UI loop decides, by generation, whether it is still
/// the live one.
pub struct InactivityTimer {
    duration: Duration,
    events: mpsc::Sender<SessionEvent>,
    generation: u64,
    pending: Option<Pending>,
}

impl InactivityTimer {
    /// A zero `duration` disables the timer entirely.
    pub fn new(duration: Duration, events: mpsc::Sender<SessionEvent>) -> Self {
        Self {
            duration,
            events,
            generation: 0,
            pending: None,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn is_enabled(&self) -> bool {
        !self.duration.is_zero()
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Time left before the live countdown fires.
    pub fn remaining(&self) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|p| p.deadline.saturating_duration_since(Instant::now()))
    }

    /// Cancel any live countdown and start a new one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm(&mut self) {
        self.cancel();
        if !self.is_enabled() {
            debug!("Auto-logout disabled, timer not armed");
            return;
        }

        self.generation += 1;
        let generation = self.generation;
        let after = self.duration;
        let events = self.events.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if events
                .send(SessionEvent::InactivityTimeout { generation, after })
                .await
                .is_err()
            {
                debug!(generation, "UI loop gone, auto-logout dropped");
            }
        });

        let now = Instant::now();
        let deadline = now.checked_add(after).unwrap_or_else(|| now + FAR_FUTURE);
        self.pending = Some(Pending {
            generation,
            deadline,
            handle,
        });
        debug!(generation, seconds = after.as_secs(), "Auto-logout timer (re)started");
    }

    /// Cancel the live countdown, if any.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
            debug!(generation = pending.generation, "Auto-logout timer canceled");
        }
    }

    /// Consume a timeout event. Returns false for an event from a countdown
    /// that was canceled or replaced after it fired.
    pub fn take_fired(&mut self, generation: u64) -> bool {
        match self.pending {
            Some(ref pending) if pending.generation == generation => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}

impl Drop for InactivityTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
