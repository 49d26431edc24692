/// Rule table
///
/// Pure declarative data: each entry couples a trigger predicate to playback
/// parameters. Predicates are side-effect-free, tolerate a missing user
/// (return false instead of failing), and never depend on another rule's
/// outcome. Table order is evaluation order; simultaneously true rules sound
/// concurrently.
use crate::audio::PlaybackMode;
use crate::context::{SoundContext, UserKind, UserRole};
use crate::state::SharedNotificationState;

/// Pure predicate deciding whether a channel should currently be sounding
pub type TriggerFn = fn(&SharedNotificationState, &SoundContext) -> bool;

pub const ACTIVES_ORDERS_CHANNEL: &str = "ACTIVES_ORDERS_CHANNEL";
pub const OVERDUE_ORDERS_CHANNEL: &str = "OVERDUE_ORDERS_CHANNEL";
pub const NEW_NOTIFICATION_CHANNEL: &str = "NEW_NOTIFICATION_CHANNEL";

/// One channel's playback parameters and trigger, declared once at startup
#[derive(Clone)]
pub struct ChannelDefinition {
    pub id: &'static str,
    pub source: &'static str,
    pub mode: PlaybackMode,

    /// Repeat cadence; the player default applies when omitted
    pub interval_ms: Option<u64>,

    pub trigger: TriggerFn,
}

fn new_orders_waiting(state: &SharedNotificationState, context: &SoundContext) -> bool {
    let Some(user) = context.user.as_ref() else {
        return false;
    };
    if context.dashboard.sound_muted {
        return false;
    }
    user.kind == UserKind::Restaurant
        && user.role == UserRole::Caissier
        && state.has_new_orders()
}

fn orders_overdue(state: &SharedNotificationState, context: &SoundContext) -> bool {
    let Some(user) = context.user.as_ref() else {
        return false;
    };
    if context.dashboard.sound_muted {
        return false;
    }
    user.kind == UserKind::Restaurant
        && matches!(user.role, UserRole::Caissier | UserRole::Manager)
        && !state.overdue_orders.is_empty()
}

fn inbox_unread(state: &SharedNotificationState, context: &SoundContext) -> bool {
    if context.user.is_none() || context.dashboard.sound_muted {
        return false;
    }
    state.unread_count() > 0
}

/// The channel table the dashboard ships with
pub fn default_rule_table() -> Vec<ChannelDefinition> {
    vec![
        ChannelDefinition {
            id: ACTIVES_ORDERS_CHANNEL,
            source: "new-order.mp3",
            mode: PlaybackMode::Repeat,
            interval_ms: Some(3000),
            trigger: new_orders_waiting,
        },
        ChannelDefinition {
            id: OVERDUE_ORDERS_CHANNEL,
            source: "overdue-order.mp3",
            mode: PlaybackMode::Repeat,
            interval_ms: Some(5000),
            trigger: orders_overdue,
        },
        ChannelDefinition {
            id: NEW_NOTIFICATION_CHANNEL,
            source: "notification.mp3",
            mode: PlaybackMode::Once,
            interval_ms: None,
            trigger: inbox_unread,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{DashboardState, User};
    use crate::state::{OrderStatus, OrderSummary};

    fn state_with_new_order() -> SharedNotificationState {
        let mut state = SharedNotificationState::default();
        state.active_orders.push(OrderSummary {
            id: "o-1".to_string(),
            status: OrderStatus::Nouvelle,
            placed_at_ms: 1_700_000_000_000,
            promised_for_ms: None,
        });
        state
    }

    fn context_for(kind: UserKind, role: UserRole) -> SoundContext {
        SoundContext {
            user: Some(User {
                id: "u-1".to_string(),
                name: "Amina".to_string(),
                kind,
                role,
            }),
            dashboard: DashboardState::default(),
        }
    }

    #[test]
    fn test_predicates_tolerate_missing_user() {
        let state = state_with_new_order();
        let context = SoundContext::default();

        for rule in default_rule_table() {
            assert!(
                !(rule.trigger)(&state, &context),
                "rule {} fired without a user",
                rule.id
            );
        }
    }

    #[test]
    fn test_new_orders_gate_by_role() {
        let state = state_with_new_order();

        let cashier = context_for(UserKind::Restaurant, UserRole::Caissier);
        assert!(new_orders_waiting(&state, &cashier));

        let accountant = context_for(UserKind::Restaurant, UserRole::Comptable);
        assert!(!new_orders_waiting(&state, &accountant));

        let head_office = context_for(UserKind::Siege, UserRole::Caissier);
        assert!(!new_orders_waiting(&state, &head_office));
    }

    #[test]
    fn test_mute_gates_every_rule() {
        let mut state = state_with_new_order();
        state.overdue_orders = state.active_orders.clone();
        state.unread_messages.push(crate::state::MessageSummary {
            id: "m-1".to_string(),
            sender: "support".to_string(),
            preview: "hello".to_string(),
        });

        let mut context = context_for(UserKind::Restaurant, UserRole::Caissier);
        context.dashboard.sound_muted = true;

        for rule in default_rule_table() {
            assert!(
                !(rule.trigger)(&state, &context),
                "rule {} fired while muted",
                rule.id
            );
        }
    }

    #[test]
    fn test_overdue_includes_manager() {
        let mut state = SharedNotificationState::default();
        state.overdue_orders = state_with_new_order().active_orders;

        let manager = context_for(UserKind::Restaurant, UserRole::Manager);
        assert!(orders_overdue(&state, &manager));

        let accountant = context_for(UserKind::Restaurant, UserRole::Comptable);
        assert!(!orders_overdue(&state, &accountant));
    }

    #[test]
    fn test_table_shape() {
        let table = default_rule_table();
        assert_eq!(table.len(), 3);
        assert_eq!(table[0].id, ACTIVES_ORDERS_CHANNEL);
        assert_eq!(table[0].interval_ms, Some(3000));
        assert_eq!(table[2].mode, PlaybackMode::Once);
    }
}
