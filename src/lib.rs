//! Notification sound-rules engine for a restaurant back-office dashboard.
//!
//! A small reactive engine: channels (independently controllable
//! notification sounds) are coupled to trigger predicates in a declarative
//! rule table. The engine subscribes to the shared notification store and,
//! on every emission, re-evaluates each trigger against the live state and
//! the current user/dashboard context, starting or stopping the matching
//! channel. Repeat channels keep sounding on a fixed cadence until their
//! condition turns false; the caller never touches a timer.

pub mod audio;
pub mod bootstrap;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod rules;
pub mod state;
pub mod sync;
pub mod watch;

// Re-export the types a host application wires together
pub use audio::{AudioBackend, AudioClip, PlaybackMode, RodioBackend, SoundConfig, SoundHandle};
pub use bootstrap::NotificationBootstrap;
pub use config::Config;
pub use context::{
    AuthStore, DashboardState, DashboardStore, SoundContext, SoundContextSource, User, UserKind,
    UserRole,
};
pub use engine::SoundEngine;
pub use error::AppResult;
pub use rules::{default_rule_table, ChannelDefinition};
pub use state::{NotificationStore, SharedNotificationState};
