/// Live notification snapshot
///
/// Mirrors what the dashboard receives over the wire: active orders, overdue
/// orders, unread messages and unread notifications. The sound engine reads
/// this snapshot and never writes to it.
use serde::{Deserialize, Serialize};

/// Lifecycle status of an order, with the wire values the dashboard uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "NOUVELLE")]
    Nouvelle,

    #[serde(rename = "EN_PREPARATION")]
    EnPreparation,

    #[serde(rename = "PRETE")]
    Prete,

    #[serde(rename = "EN_LIVRAISON")]
    EnLivraison,

    #[serde(rename = "LIVREE")]
    Livree,

    #[serde(rename = "ANNULEE")]
    Annulee,
}

/// Statuses an order can hold while it still needs attention
pub const ACTIVE_ORDER_STATUSES: [OrderStatus; 4] = [
    OrderStatus::Nouvelle,
    OrderStatus::EnPreparation,
    OrderStatus::Prete,
    OrderStatus::EnLivraison,
];

impl OrderStatus {
    /// Check if an order in this status still needs attention
    pub fn is_active(&self) -> bool {
        ACTIVE_ORDER_STATUSES.contains(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: String,
    pub status: OrderStatus,

    /// Epoch milliseconds the order was placed
    pub placed_at_ms: u64,

    /// Epoch milliseconds the order was promised for, if a time was given
    pub promised_for_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSummary {
    pub id: String,
    pub sender: String,
    pub preview: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSummary {
    pub id: String,
    pub title: String,
}

/// Snapshot shared between the store and every rule predicate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SharedNotificationState {
    pub active_orders: Vec<OrderSummary>,
    pub overdue_orders: Vec<OrderSummary>,
    pub unread_messages: Vec<MessageSummary>,
    pub unread_notifications: Vec<NotificationSummary>,
}

impl SharedNotificationState {
    /// Check whether any active order is still waiting to be accepted
    pub fn has_new_orders(&self) -> bool {
        self.active_orders
            .iter()
            .any(|order| order.status == OrderStatus::Nouvelle)
    }

    /// Total unread items across messages and notifications
    pub fn unread_count(&self) -> usize {
        self.unread_messages.len() + self.unread_notifications.len()
    }
}
