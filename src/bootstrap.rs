/// Bootstrap
///
/// Composition root a dashboard session mounts once: wires the live-update
/// feed, active-order polling, SLA watching and the message-arrival sound,
/// injects the context provider, and starts the engine. The engine and the
/// stores are handed in explicitly; nothing here lives in a global.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Receiver;

use crate::audio::{AudioBackend, PlaybackMode, SoundConfig, SoundHandle};
use crate::context::SoundContextSource;
use crate::engine::SoundEngine;
use crate::state::{NotificationStore, Subscription};
use crate::sync::{SocketSync, StoreUpdate};
use crate::watch::{FetchActiveOrders, OrderPoller, SlaWatcher};

pub struct NotificationBootstrap {
    store: NotificationStore,
    engine: Arc<SoundEngine>,
    context: SoundContextSource,
    socket: Option<SocketSync>,
    poller: Option<OrderPoller>,
    sla: Option<SlaWatcher>,
    message_sound: Option<Subscription>,
}

impl NotificationBootstrap {
    pub fn new(
        store: NotificationStore,
        engine: Arc<SoundEngine>,
        context: SoundContextSource,
    ) -> Self {
        Self {
            store,
            engine,
            context,
            socket: None,
            poller: None,
            sla: None,
            message_sound: None,
        }
    }

    /// Re-inject the latest context provider and start the engine.
    ///
    /// Safe to call on every re-render of the mounting page: the provider is
    /// replaced (last write wins) while the engine subscribes only once.
    pub fn attach(&self) {
        self.engine.set_context_provider(self.context.provider());
        self.engine.start();
    }

    /// Drain a live update feed into the store
    pub fn with_socket_feed(&mut self, updates: Receiver<StoreUpdate>) {
        self.socket = Some(SocketSync::start(self.store.clone(), updates));
    }

    /// Refresh the active-order list on a fixed cadence
    pub fn with_order_polling(&mut self, fetch: FetchActiveOrders, interval: Duration) {
        self.poller = Some(OrderPoller::start(self.store.clone(), fetch, interval));
    }

    /// Derive the overdue-order list on a fixed cadence
    pub fn with_sla_watch(&mut self, grace: Duration, check_interval: Duration) {
        self.sla = Some(SlaWatcher::start(self.store.clone(), grace, check_interval));
    }

    /// Chime once whenever the unread-message count rises from zero.
    /// Independent of the rule table.
    pub fn with_message_sound(&mut self, backend: Arc<dyn AudioBackend>, source: &str) {
        let handle = Arc::new(SoundHandle::new(
            SoundConfig {
                id: "MESSAGE_ARRIVAL".to_string(),
                source: source.to_string(),
                mode: PlaybackMode::Once,
                interval_ms: None,
            },
            backend,
            false,
        ));

        let store = self.store.clone();
        let last_count = Arc::new(AtomicUsize::new(0));
        self.message_sound = Some(self.store.subscribe(move || {
            let count = store.state().unread_messages.len();
            let previous = last_count.swap(count, Ordering::SeqCst);
            if count > 0 && previous == 0 {
                handle.play();
            } else if count == 0 && previous > 0 {
                // Re-arm for the next arrival.
                handle.stop();
            }
        }));
    }

    /// Tear the session down: dispose the engine and stop every collaborator
    pub fn detach(&mut self) {
        self.engine.dispose();
        self.message_sound = None;
        if let Some(mut socket) = self.socket.take() {
            socket.stop();
        }
        if let Some(mut poller) = self.poller.take() {
            poller.stop();
        }
        if let Some(mut sla) = self.sla.take() {
            sla.stop();
        }
        tracing::info!("Notification bootstrap detached");
    }

    pub fn engine(&self) -> &Arc<SoundEngine> {
        &self.engine
    }

    pub fn store(&self) -> &NotificationStore {
        &self.store
    }
}

impl Drop for NotificationBootstrap {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioClip;
    use crate::error::AudioError;
    use crate::rules::default_rule_table;
    use crate::state::MessageSummary;

    #[derive(Clone, Default)]
    struct CountingBackend {
        restarts: Arc<AtomicUsize>,
    }

    struct CountingClip {
        restarts: Arc<AtomicUsize>,
    }

    impl AudioBackend for CountingBackend {
        fn load(&self, _source: &str) -> Result<Box<dyn AudioClip>, AudioError> {
            Ok(Box::new(CountingClip {
                restarts: Arc::clone(&self.restarts),
            }))
        }
    }

    impl AudioClip for CountingClip {
        fn restart(&mut self) -> Result<(), AudioError> {
            self.restarts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn stop(&mut self) {}
    }

    fn message(id: &str) -> MessageSummary {
        MessageSummary {
            id: id.to_string(),
            sender: "siege".to_string(),
            preview: "bonjour".to_string(),
        }
    }

    fn assembly() -> (NotificationStore, NotificationBootstrap, CountingBackend) {
        let store = NotificationStore::new();
        let backend = CountingBackend::default();
        let engine = Arc::new(SoundEngine::new(
            store.clone(),
            Arc::new(backend.clone()),
            default_rule_table(),
        ));
        let bootstrap = NotificationBootstrap::new(
            store.clone(),
            engine,
            SoundContextSource::default(),
        );
        (store, bootstrap, backend)
    }

    #[test]
    fn test_attach_subscribes_engine_once() {
        let (store, bootstrap, _backend) = assembly();

        bootstrap.attach();
        bootstrap.attach();
        bootstrap.attach();

        assert!(bootstrap.engine().is_started());
        assert_eq!(store.listener_count(), 1);
    }

    #[test]
    fn test_detach_tears_the_session_down() {
        let (store, mut bootstrap, _backend) = assembly();

        bootstrap.attach();
        bootstrap.detach();

        assert!(!bootstrap.engine().is_started());
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn test_message_sound_plays_on_rising_edge_only() {
        let (store, mut bootstrap, backend) = assembly();
        bootstrap.with_message_sound(Arc::new(backend.clone()), "new-message.mp3");

        store.set_unread_messages(vec![message("m-1")]);
        store.set_unread_messages(vec![message("m-1"), message("m-2")]);

        // One chime for the 0 -> >0 transition, none for 1 -> 2.
        assert_eq!(backend.restarts.load(Ordering::SeqCst), 1);

        // Reading everything re-arms the chime.
        store.set_unread_messages(Vec::new());
        store.set_unread_messages(vec![message("m-3")]);
        assert_eq!(backend.restarts.load(Ordering::SeqCst), 2);
    }
}
