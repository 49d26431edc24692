/// Live update feed
///
/// In-process stand-in for the dashboard's socket channel: a worker thread
/// drains a bounded channel of store updates and applies them to the
/// notification store, which in turn wakes the sound engine.
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, select, Receiver, Sender};

use crate::state::{MessageSummary, NotificationStore, NotificationSummary, OrderSummary};

/// Channel capacity for live updates (feed -> store)
pub const UPDATE_CHANNEL_CAPACITY: usize = 256;

/// Creates a bounded update channel
pub fn update_channel() -> (Sender<StoreUpdate>, Receiver<StoreUpdate>) {
    bounded(UPDATE_CHANNEL_CAPACITY)
}

/// One live update from the outside world
#[derive(Debug, Clone)]
pub enum StoreUpdate {
    /// Full replacement of the active-order list
    ActiveOrders(Vec<OrderSummary>),

    /// Full replacement of the overdue-order list
    OverdueOrders(Vec<OrderSummary>),

    /// Full replacement of the unread-message list
    UnreadMessages(Vec<MessageSummary>),

    /// Full replacement of the unread-notification list
    UnreadNotifications(Vec<NotificationSummary>),

    /// A single order changed: inserted or replaced by id, dropped from the
    /// active list when its status is no longer active
    OrderUpserted(OrderSummary),

    /// An order left the board entirely
    OrderRemoved { id: String },
}

impl StoreUpdate {
    /// Get a human-readable description of the update
    pub fn description(&self) -> String {
        match self {
            StoreUpdate::ActiveOrders(orders) => format!("{} active orders", orders.len()),
            StoreUpdate::OverdueOrders(orders) => format!("{} overdue orders", orders.len()),
            StoreUpdate::UnreadMessages(messages) => {
                format!("{} unread messages", messages.len())
            }
            StoreUpdate::UnreadNotifications(items) => {
                format!("{} unread notifications", items.len())
            }
            StoreUpdate::OrderUpserted(order) => {
                format!("order {} -> {:?}", order.id, order.status)
            }
            StoreUpdate::OrderRemoved { id } => format!("order {} removed", id),
        }
    }
}

fn apply(store: &NotificationStore, update: StoreUpdate) {
    tracing::debug!("Applying live update: {}", update.description());

    match update {
        StoreUpdate::ActiveOrders(orders) => store.set_active_orders(orders),
        StoreUpdate::OverdueOrders(orders) => store.set_overdue_orders(orders),
        StoreUpdate::UnreadMessages(messages) => store.set_unread_messages(messages),
        StoreUpdate::UnreadNotifications(items) => store.set_unread_notifications(items),
        StoreUpdate::OrderUpserted(order) => store.update(|state| {
            state
                .active_orders
                .retain(|existing| existing.id != order.id);
            if order.status.is_active() {
                state.active_orders.push(order);
            }
        }),
        StoreUpdate::OrderRemoved { id } => store.update(|state| {
            state.active_orders.retain(|existing| existing.id != id);
            state.overdue_orders.retain(|existing| existing.id != id);
        }),
    }
}

/// Applies a live update feed to the store until stopped or disconnected
pub struct SocketSync {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SocketSync {
    pub fn start(store: NotificationStore, updates: Receiver<StoreUpdate>) -> Self {
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let handle = thread::spawn(move || {
            tracing::info!("Live update sync started");
            loop {
                select! {
                    recv(stop_rx) -> _ => break,
                    recv(updates) -> update => match update {
                        Ok(update) => apply(&store, update),
                        Err(_) => {
                            tracing::warn!("Live update feed disconnected");
                            break;
                        }
                    },
                }
            }
            tracing::info!("Live update sync stopped");
        });

        Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Stop the worker and wait for it to wind down
    pub fn stop(&mut self) {
        self.stop_tx = None;
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SocketSync {
    fn drop(&mut self) {
        self.stop();
    }
}
