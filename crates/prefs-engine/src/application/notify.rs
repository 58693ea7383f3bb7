//! Synchronous change notification.
//!
//! Setters report changes through a [`ChangeNotifier`].  Two delivery styles
//! are supported:
//!
//! - **Callbacks** registered with [`ChangeNotifier::on_change`], invoked
//!   in-line on the setter's thread.
//! - **Channels** obtained from [`ChangeNotifier::subscribe`]; the event is
//!   queued on every live receiver before the setter returns.
//!
//! In both cases the event is delivered before the setter returns, so an
//! observer that reads the setting back sees the value just written.  No
//! lock is held while callbacks run, so a callback may call back into the
//! engine, including other setters.

use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};

use prefs_core::ModelField;

use crate::application::app_settings::AppSetting;

/// What changed.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    /// A per-model field of the profile `profile_id` changed.
    Model {
        field: ModelField,
        profile_id: String,
    },
    /// The generation parameters of `profile_id` were reset in bulk.
    ModelRestored { profile_id: String },
    /// A process-wide setting changed.
    App(AppSetting),
    /// The in-memory device list was replaced.
    DeviceList,
    /// The in-memory force-metal flag changed to the carried value.
    ForceMetal(bool),
}

type Callback = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Fan-out of [`ChangeEvent`]s to callbacks and channel subscribers.
#[derive(Default)]
pub struct ChangeNotifier {
    callbacks: Mutex<Vec<Callback>>,
    subscribers: Mutex<Vec<mpsc::Sender<ChangeEvent>>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback invoked for every subsequent event.
    pub fn on_change<F>(&self, callback: F)
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        lock(&self.callbacks).push(Arc::new(callback));
    }

    /// Returns a receiver that gets a copy of every subsequent event.
    ///
    /// Dropping the receiver unsubscribes it.
    pub fn subscribe(&self) -> mpsc::Receiver<ChangeEvent> {
        let (tx, rx) = mpsc::channel();
        lock(&self.subscribers).push(tx);
        rx
    }

    /// Delivers `event` to every observer before returning.
    pub fn emit(&self, event: ChangeEvent) {
        // Snapshot so callbacks can re-enter without deadlocking.
        let callbacks: Vec<Callback> = lock(&self.callbacks).clone();
        for callback in &callbacks {
            callback(&event);
        }

        lock(&self.subscribers).retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Number of live observers of either kind.
    pub fn observer_count(&self) -> usize {
        lock(&self.callbacks).len() + lock(&self.subscribers).len()
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("callbacks", &lock(&self.callbacks).len())
            .field("subscribers", &lock(&self.subscribers).len())
            .finish()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn temperature_changed() -> ChangeEvent {
        ChangeEvent::Model {
            field: ModelField::Temperature,
            profile_id: "abc".to_string(),
        }
    }

    #[test]
    fn test_subscriber_receives_event_before_emit_returns() {
        // Arrange
        let notifier = ChangeNotifier::new();
        let rx = notifier.subscribe();

        // Act
        notifier.emit(temperature_changed());

        // Assert: already queued, no waiting needed
        assert_eq!(rx.try_recv(), Ok(temperature_changed()));
    }

    #[test]
    fn test_callback_is_invoked_inline() {
        let notifier = ChangeNotifier::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = Arc::clone(&hits);
        notifier.on_change(move |_| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });

        notifier.emit(ChangeEvent::DeviceList);
        notifier.emit(ChangeEvent::ForceMetal(true));

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let notifier = ChangeNotifier::new();
        let rx = notifier.subscribe();
        assert_eq!(notifier.observer_count(), 1);

        drop(rx);
        notifier.emit(ChangeEvent::DeviceList);

        assert_eq!(notifier.observer_count(), 0);
    }

    #[test]
    fn test_callback_may_reenter_notifier() {
        // Arrange: a callback that registers a subscriber while being invoked
        let notifier = Arc::new(ChangeNotifier::new());
        let inner = Arc::clone(&notifier);
        notifier.on_change(move |event| {
            if *event == ChangeEvent::DeviceList {
                let _rx = inner.subscribe();
            }
        });

        // Act / Assert: must not deadlock
        notifier.emit(ChangeEvent::DeviceList);
    }
}
