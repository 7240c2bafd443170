//! Ephemeral outcome messages with timed expiry.
//!
//! Each pushed entry owns a tokio timer task that removes it after the queue's
//! time-to-live. Dismissing an entry aborts that task, so an automatic removal
//! fires at most once and never after a dismiss.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;

/// How long an entry stays queued unless dismissed.
pub const DEFAULT_TTL: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(u64);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
}

/// Sink for operation outcomes raised by services.
pub trait Notifier {
    fn notify(&self, message: &str, severity: Severity);
}

#[derive(Default)]
struct QueueState {
    entries: Vec<Notification>,
    timers: HashMap<NotificationId, JoinHandle<()>>,
    next_id: u64,
    expired: usize,
}

impl QueueState {
    fn expire(&mut self, id: NotificationId) {
        self.timers.remove(&id);
        if let Some(position) = self.entries.iter().position(|entry| entry.id == id) {
            self.entries.remove(position);
            self.expired += 1;
            tracing::debug!(%id, "notification expired");
        }
    }
}

/// FIFO of notifications. Cloning shares the same queue.
#[derive(Clone)]
pub struct NotificationQueue {
    state: Arc<Mutex<QueueState>>,
    ttl: Duration,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState::default())),
            ttl,
        }
    }

    /// Appends an entry and schedules its removal. Must run inside a tokio runtime.
    pub fn push(&self, message: impl Into<String>, severity: Severity) -> NotificationId {
        let mut state = lock(&self.state);
        state.next_id += 1;
        let id = NotificationId(state.next_id);
        let message = message.into();
        tracing::debug!(%id, ?severity, %message, "notification queued");
        state.entries.push(Notification {
            id,
            message,
            severity,
        });
        let timer = spawn_expiry(Arc::downgrade(&self.state), id, self.ttl);
        state.timers.insert(id, timer);
        id
    }

    /// Removes an entry now and cancels its pending expiry. Returns `false` when
    /// the entry is already gone.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        let mut state = lock(&self.state);
        if let Some(timer) = state.timers.remove(&id) {
            timer.abort();
        }
        match state.entries.iter().position(|entry| entry.id == id) {
            Some(position) => {
                state.entries.remove(position);
                true
            }
            None => false,
        }
    }

    /// Current entries in push order.
    pub fn entries(&self) -> Vec<Notification> {
        lock(&self.state).entries.clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.state).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of automatic removals that actually removed an entry.
    pub fn expired_count(&self) -> usize {
        lock(&self.state).expired
    }
}

impl Notifier for NotificationQueue {
    fn notify(&self, message: &str, severity: Severity) {
        self.push(message, severity);
    }
}

fn spawn_expiry(state: Weak<Mutex<QueueState>>, id: NotificationId, ttl: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(ttl).await;
        if let Some(state) = state.upgrade() {
            lock(&state).expire(id);
        }
    })
}

fn lock(state: &Mutex<QueueState>) -> MutexGuard<'_, QueueState> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
