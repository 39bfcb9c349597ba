use std::sync::{Mutex, PoisonError};

use super::{Cue, NotificationSink};
use crate::events::{EventRecord, SessionAction};

/// One call made on a [`MemorySink`].
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Cue { cue: Cue, volume: f32 },
    Event(EventRecord),
}

/// Sink that keeps every notification in memory, in call order.
///
/// Useful for hosts that render their own feedback and for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    log: Mutex<Vec<Notification>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn events(&self) -> Vec<EventRecord> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Event(record) => Some(record),
                Notification::Cue { .. } => None,
            })
            .collect()
    }

    pub fn actions(&self) -> Vec<SessionAction> {
        self.events().into_iter().map(|e| e.action).collect()
    }

    pub fn cues(&self) -> Vec<Cue> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Cue { cue, .. } => Some(cue),
                Notification::Event(_) => None,
            })
            .collect()
    }

    fn push(&self, notification: Notification) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

impl NotificationSink for MemorySink {
    fn play_cue(&self, cue: Cue, volume: f32) {
        self.push(Notification::Cue { cue, volume });
    }

    fn deliver(&self, record: EventRecord) {
        self.push(Notification::Event(record));
    }
}
