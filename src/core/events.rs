//! In-process broadcast channel between UI surfaces
//!
//! Stands in for the cross-window notification layer: broadcast-and-forget,
//! no acknowledgement. Receivers are expected to re-list notes from disk
//! rather than apply deltas.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};

use super::settings::Settings;

/// Something another UI surface should react to
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A note was saved; listeners re-read from disk
    NoteUpdated(String),
    /// A note's file was deleted
    NoteDeleted(String),
    /// The settings blob changed
    SettingsChanged(Settings),
}

/// Cheap-to-clone broadcast bus
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<Sender<AppEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; events arrive on the returned receiver
    pub fn subscribe(&self) -> Receiver<AppEvent> {
        let (tx, rx) = channel();
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }
        rx
    }

    /// Broadcast to every live listener; dead ones are dropped
    pub fn publish(&self, event: AppEvent) {
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_reach_every_subscriber() {
        let bus = EventBus::new();
        let rx1 = bus.subscribe();
        let rx2 = bus.subscribe();

        bus.publish(AppEvent::NoteUpdated("groceries".to_string()));

        assert_eq!(rx1.try_recv().unwrap(), AppEvent::NoteUpdated("groceries".to_string()));
        assert_eq!(rx2.try_recv().unwrap(), AppEvent::NoteUpdated("groceries".to_string()));
    }

    #[test]
    fn dropped_receivers_do_not_block_publishing() {
        let bus = EventBus::new();
        drop(bus.subscribe());
        let rx = bus.subscribe();

        bus.publish(AppEvent::NoteDeleted("gone".to_string()));
        assert_eq!(rx.try_recv().unwrap(), AppEvent::NoteDeleted("gone".to_string()));
    }
}
