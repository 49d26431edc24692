/// Shared notification state
///
/// The process-wide observable snapshot the sound rules react to, and the
/// store that owns it.
pub mod notifications;
pub mod store;

pub use notifications::{
    MessageSummary, NotificationSummary, OrderStatus, OrderSummary, SharedNotificationState,
    ACTIVE_ORDER_STATUSES,
};
pub use store::{ListenerId, NotificationStore, Subscription};
