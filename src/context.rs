/// Sound context
///
/// The read-only bundle of current-user and dashboard-UI data rule
/// predicates need beyond the notification store. The engine always reads
/// the latest values through a provider closure rather than a captured
/// snapshot.
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::state::OrderStatus;

/// What kind of account the authenticated user belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserKind {
    #[serde(rename = "RESTAURANT")]
    Restaurant,

    #[serde(rename = "SIEGE")]
    Siege,

    #[serde(rename = "ADMIN")]
    Admin,
}

/// Role of the authenticated user within their account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(rename = "CAISSIER")]
    Caissier,

    #[serde(rename = "COMPTABLE")]
    Comptable,

    #[serde(rename = "MANAGER")]
    Manager,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub kind: UserKind,
    pub role: UserRole,
}

/// Snapshot of the dashboard UI state predicates may consult
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardState {
    pub active_page: String,
    pub status_filter: Vec<OrderStatus>,
    pub sound_muted: bool,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            active_page: "orders".to_string(),
            status_filter: Vec::new(),
            sound_muted: false,
        }
    }
}

/// Read-only context handed to every trigger predicate
#[derive(Debug, Clone, Default)]
pub struct SoundContext {
    pub user: Option<User>,
    pub dashboard: DashboardState,
}

/// Fetches the current context lazily; replaced wholesale, last write wins.
pub type ContextProviderFn = Arc<dyn Fn() -> SoundContext + Send + Sync>;

/// Shared handle to the current authenticated user
#[derive(Clone, Default)]
pub struct AuthStore {
    user: Arc<RwLock<Option<User>>>,
}

impl AuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_user(&self, user: User) {
        *self.user.write() = Some(user);
    }

    pub fn clear(&self) {
        *self.user.write() = None;
    }

    pub fn current(&self) -> Option<User> {
        self.user.read().clone()
    }
}

/// Shared handle to the dashboard UI state
#[derive(Clone, Default)]
pub struct DashboardStore {
    state: Arc<RwLock<DashboardState>>,
}

impl DashboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, mutate: impl FnOnce(&mut DashboardState)) {
        let mut state = self.state.write();
        mutate(&mut state);
    }

    pub fn snapshot(&self) -> DashboardState {
        self.state.read().clone()
    }
}

/// Aggregates the auth and dashboard stores into the context predicates see.
/// Every snapshot reads the latest values, nothing is cached here.
#[derive(Clone, Default)]
pub struct SoundContextSource {
    auth: AuthStore,
    dashboard: DashboardStore,
}

impl SoundContextSource {
    pub fn new(auth: AuthStore, dashboard: DashboardStore) -> Self {
        Self { auth, dashboard }
    }

    pub fn snapshot(&self) -> SoundContext {
        SoundContext {
            user: self.auth.current(),
            dashboard: self.dashboard.snapshot(),
        }
    }

    /// Package this source as the provider closure the engine re-invokes on
    /// every evaluation.
    pub fn provider(&self) -> impl Fn() -> SoundContext + Send + Sync + 'static {
        let source = self.clone();
        move || source.snapshot()
    }
}
