/// Sound engine
///
/// The reactive core: subscribes to the notification store and, on every
/// emission, re-evaluates every rule's trigger against the live state and
/// the current context, driving the matching channel player.
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};

use crate::audio::{AudioBackend, ChannelPlayer, ContinuationFn};
use crate::context::{ContextProviderFn, SoundContext};
use crate::rules::{ChannelDefinition, TriggerFn};
use crate::state::{NotificationStore, Subscription};

struct EngineInner {
    rules: Vec<ChannelDefinition>,
    players: HashMap<&'static str, ChannelPlayer>,
    provider: RwLock<Option<ContextProviderFn>>,
    store: NotificationStore,
}

/// Explicitly constructed engine, injected into the bootstrap rather than
/// living as a process-wide singleton.
pub struct SoundEngine {
    inner: Arc<EngineInner>,
    subscription: Mutex<Option<Subscription>>,
}

impl SoundEngine {
    /// Build one channel player per rule, keyed by rule id, for the life of
    /// the engine.
    pub fn new(
        store: NotificationStore,
        backend: Arc<dyn AudioBackend>,
        rules: Vec<ChannelDefinition>,
    ) -> Self {
        let players = rules
            .iter()
            .map(|rule| {
                let player = ChannelPlayer::new(
                    rule.id,
                    rule.source,
                    rule.mode,
                    rule.interval_ms.map(Duration::from_millis),
                    Arc::clone(&backend),
                );
                (rule.id, player)
            })
            .collect();

        Self {
            inner: Arc::new(EngineInner {
                rules,
                players,
                provider: RwLock::new(None),
                store,
            }),
            subscription: Mutex::new(None),
        }
    }

    /// Inject the way to fetch the current context. Callable any number of
    /// times; the last provider wins. Replacing the provider does not
    /// re-subscribe the engine.
    pub fn set_context_provider(
        &self,
        provider: impl Fn() -> SoundContext + Send + Sync + 'static,
    ) {
        *self.inner.provider.write() = Some(Arc::new(provider));
    }

    /// Subscribe to the notification store. Strictly idempotent: calling
    /// `start` again while subscribed is a no-op.
    pub fn start(&self) {
        let mut subscription = self.subscription.lock();
        if subscription.is_some() {
            tracing::trace!("Sound engine already started");
            return;
        }

        let inner = Arc::clone(&self.inner);
        *subscription = Some(self.inner.store.subscribe(move || {
            EngineInner::evaluate(&inner);
        }));
        tracing::info!(
            "Sound engine subscribed to notification store ({} rules)",
            self.inner.rules.len()
        );
    }

    pub fn is_started(&self) -> bool {
        self.subscription.lock().is_some()
    }

    /// Drop the store subscription and silence every channel. The engine can
    /// be started again afterwards.
    pub fn dispose(&self) {
        if self.subscription.lock().take().is_some() {
            self.stop_all();
            tracing::info!("Sound engine disposed");
        }
    }

    /// Silence every channel without touching the subscription.
    pub fn stop_all(&self) {
        for player in self.inner.players.values() {
            player.stop();
        }
    }

    pub fn is_channel_playing(&self, id: &str) -> bool {
        self.inner
            .players
            .get(id)
            .map(|player| player.is_playing())
            .unwrap_or(false)
    }

    pub fn channel_ids(&self) -> Vec<&'static str> {
        self.inner.rules.iter().map(|rule| rule.id).collect()
    }
}

impl EngineInner {
    /// One evaluation cycle, run synchronously on every store emission.
    fn evaluate(inner: &Arc<EngineInner>) {
        // Until bootstrap wires a provider there is nothing to evaluate
        // against; skipping the whole cycle is the defined behavior.
        let Some(provider) = inner.provider.read().clone() else {
            tracing::trace!("No sound context provider yet, skipping evaluation cycle");
            return;
        };

        let context = provider();
        let state = inner.store.state();

        for rule in &inner.rules {
            // Each rule is isolated: one panicking trigger must not keep the
            // remaining channels from being driven.
            let fired = match catch_unwind(AssertUnwindSafe(|| (rule.trigger)(&state, &context))) {
                Ok(fired) => fired,
                Err(_) => {
                    tracing::warn!(
                        "Trigger for channel {} panicked, leaving channel untouched",
                        rule.id
                    );
                    continue;
                }
            };

            let Some(player) = inner.players.get(rule.id) else {
                continue;
            };

            if fired {
                player.play(Some(Self::continuation(inner, rule.id, rule.trigger)));
            } else {
                player.stop();
            }
        }
    }

    /// Continuation handed to a repeat channel. Re-fetches the live state
    /// and the current context on every tick, so the channel stops as soon
    /// as its condition turns false even between store emissions.
    fn continuation(inner: &Arc<EngineInner>, id: &'static str, trigger: TriggerFn) -> ContinuationFn {
        let inner = Arc::clone(inner);
        Arc::new(move || {
            let Some(provider) = inner.provider.read().clone() else {
                return false;
            };
            let context = provider();
            let state = inner.store.state();

            catch_unwind(AssertUnwindSafe(|| (trigger)(&state, &context))).unwrap_or_else(|_| {
                tracing::warn!("Continuation for channel {} panicked, stopping channel", id);
                false
            })
        })
    }
}
