use parking_lot::RwLock;
/// Notification state store
///
/// Process-wide observable store. Listeners are invoked synchronously on
/// every mutation, so one emission is fully processed before the mutating
/// call returns.
use std::sync::Arc;

use super::notifications::{
    MessageSummary, NotificationSummary, OrderSummary, SharedNotificationState,
};

/// Listener ID for tracking subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

type ListenerFn = Arc<dyn Fn() + Send + Sync>;

struct StoreInner {
    state: RwLock<SharedNotificationState>,
    listeners: RwLock<Vec<(ListenerId, ListenerFn)>>,
    next_id: RwLock<usize>,
}

/// Shared handle to the notification state store
#[derive(Clone)]
pub struct NotificationStore {
    inner: Arc<StoreInner>,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(SharedNotificationState::default()),
                listeners: RwLock::new(Vec::new()),
                next_id: RwLock::new(0),
            }),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SharedNotificationState {
        self.inner.state.read().clone()
    }

    /// Subscribe to change notifications. The returned guard unsubscribes
    /// when dropped.
    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        let mut next_id = self.inner.next_id.write();
        let id = ListenerId(*next_id);
        *next_id += 1;
        drop(next_id);

        self.inner.listeners.write().push((id, Arc::new(listener)));

        Subscription {
            store: self.clone(),
            id,
        }
    }

    /// Unsubscribe a listener
    pub fn unsubscribe(&self, id: ListenerId) {
        self.inner.listeners.write().retain(|(lid, _)| *lid != id);
    }

    /// Mutate the state under the write lock, then notify every listener.
    pub fn update(&self, mutate: impl FnOnce(&mut SharedNotificationState)) {
        {
            let mut state = self.inner.state.write();
            mutate(&mut state);
        }
        self.notify();
    }

    /// Get number of active listeners
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.read().len()
    }

    pub fn set_active_orders(&self, orders: Vec<OrderSummary>) {
        self.update(|state| state.active_orders = orders);
    }

    pub fn set_overdue_orders(&self, orders: Vec<OrderSummary>) {
        self.update(|state| state.overdue_orders = orders);
    }

    pub fn set_unread_messages(&self, messages: Vec<MessageSummary>) {
        self.update(|state| state.unread_messages = messages);
    }

    pub fn set_unread_notifications(&self, notifications: Vec<NotificationSummary>) {
        self.update(|state| state.unread_notifications = notifications);
    }

    fn notify(&self) {
        // Listeners run without the listener lock held, so a callback may
        // subscribe or unsubscribe without deadlocking.
        let listeners: Vec<ListenerFn> = self
            .inner
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener();
        }
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Subscription guard, unsubscribes on drop
pub struct Subscription {
    store: NotificationStore,
    id: ListenerId,
}

impl Subscription {
    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.store.unsubscribe(self.id);
    }
}
