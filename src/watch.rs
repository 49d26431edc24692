/// Background watchers
///
/// Fixed-cadence collaborators the bootstrap activates: the active-order
/// poller and the SLA watcher that derives the overdue-order list.
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crossbeam_channel::{bounded, select, tick, Sender};

use crate::error::AppResult;
use crate::state::{NotificationStore, OrderSummary};

/// Supplies the current active-order list from the outside world
pub type FetchActiveOrders = Arc<dyn Fn() -> AppResult<Vec<OrderSummary>> + Send + Sync>;

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Polls a fetch function on a fixed cadence and mirrors the result into
/// the store, keeping only orders in an active status.
pub struct OrderPoller {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl OrderPoller {
    pub fn start(store: NotificationStore, fetch: FetchActiveOrders, interval: Duration) -> Self {
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let handle = thread::spawn(move || {
            tracing::info!("Active-order polling started ({:?} cadence)", interval);
            let ticker = tick(interval);
            loop {
                select! {
                    recv(stop_rx) -> _ => break,
                    recv(ticker) -> _ => match fetch() {
                        Ok(mut orders) => {
                            orders.retain(|order| order.status.is_active());
                            store.set_active_orders(orders);
                        }
                        Err(e) => tracing::warn!("Active-order poll failed: {:#}", e),
                    },
                }
            }
            tracing::info!("Active-order polling stopped");
        });

        Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    pub fn stop(&mut self) {
        self.stop_tx = None;
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for OrderPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Derives the overdue-order list from promised times on a fixed cadence.
/// Writes to the store only when the overdue set actually changes, so a
/// quiet board does not generate emission churn.
pub struct SlaWatcher {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SlaWatcher {
    pub fn start(store: NotificationStore, grace: Duration, check_interval: Duration) -> Self {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let grace_ms = grace.as_millis() as u64;

        let handle = thread::spawn(move || {
            tracing::info!("SLA watch started ({:?} grace)", grace);
            let ticker = tick(check_interval);
            loop {
                select! {
                    recv(stop_rx) -> _ => break,
                    recv(ticker) -> _ => {
                        let state = store.state();
                        let now = unix_millis();
                        let overdue: Vec<OrderSummary> = state
                            .active_orders
                            .iter()
                            .filter(|order| {
                                order
                                    .promised_for_ms
                                    .map(|promised| promised + grace_ms < now)
                                    .unwrap_or(false)
                            })
                            .cloned()
                            .collect();

                        let current: Vec<&str> =
                            state.overdue_orders.iter().map(|o| o.id.as_str()).collect();
                        let derived: Vec<&str> =
                            overdue.iter().map(|o| o.id.as_str()).collect();
                        if current != derived {
                            tracing::debug!("{} orders past their promised time", overdue.len());
                            store.set_overdue_orders(overdue);
                        }
                    },
                }
            }
            tracing::info!("SLA watch stopped");
        });

        Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    pub fn stop(&mut self) {
        self.stop_tx = None;
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SlaWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::OrderStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn order(id: &str, status: OrderStatus, promised_for_ms: Option<u64>) -> OrderSummary {
        OrderSummary {
            id: id.to_string(),
            status,
            placed_at_ms: unix_millis().saturating_sub(60_000),
            promised_for_ms,
        }
    }

    #[test]
    fn test_poller_keeps_only_active_orders() {
        let store = NotificationStore::new();
        let fetch: FetchActiveOrders = Arc::new(|| {
            Ok(vec![
                order("o-1", OrderStatus::Nouvelle, None),
                order("o-2", OrderStatus::Livree, None),
            ])
        });

        let mut poller = OrderPoller::start(store.clone(), fetch, Duration::from_millis(20));
        thread::sleep(Duration::from_millis(80));
        poller.stop();

        let state = store.state();
        assert_eq!(state.active_orders.len(), 1);
        assert_eq!(state.active_orders[0].id, "o-1");
    }

    #[test]
    fn test_poller_survives_fetch_errors() {
        let store = NotificationStore::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let fetch: FetchActiveOrders = {
            let calls = Arc::clone(&calls);
            Arc::new(move || {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    anyhow::bail!("backend unavailable");
                }
                Ok(vec![order("o-1", OrderStatus::Nouvelle, None)])
            })
        };

        let mut poller = OrderPoller::start(store.clone(), fetch, Duration::from_millis(20));
        thread::sleep(Duration::from_millis(100));
        poller.stop();

        assert!(calls.load(Ordering::SeqCst) >= 2);
        assert_eq!(store.state().active_orders.len(), 1);
    }

    #[test]
    fn test_sla_watch_flags_orders_past_promised_time() {
        let store = NotificationStore::new();
        let now = unix_millis();
        store.set_active_orders(vec![
            order("late", OrderStatus::EnPreparation, Some(now.saturating_sub(10_000))),
            order("on-time", OrderStatus::EnPreparation, Some(now + 600_000)),
            order("no-promise", OrderStatus::Nouvelle, None),
        ]);

        let mut watcher = SlaWatcher::start(
            store.clone(),
            Duration::from_millis(0),
            Duration::from_millis(20),
        );
        thread::sleep(Duration::from_millis(80));
        watcher.stop();

        let state = store.state();
        assert_eq!(state.overdue_orders.len(), 1);
        assert_eq!(state.overdue_orders[0].id, "late");
    }

    #[test]
    fn test_sla_watch_emits_only_on_change() {
        let store = NotificationStore::new();
        let now = unix_millis();
        store.set_active_orders(vec![order(
            "late",
            OrderStatus::EnPreparation,
            Some(now.saturating_sub(10_000)),
        )]);

        let emissions = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&emissions);
        let _subscription = store.subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mut watcher = SlaWatcher::start(
            store.clone(),
            Duration::from_millis(0),
            Duration::from_millis(20),
        );
        thread::sleep(Duration::from_millis(120));
        watcher.stop();

        // The overdue set settles after one write; further ticks stay quiet.
        assert_eq!(emissions.load(Ordering::SeqCst), 1);
    }
}
