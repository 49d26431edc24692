pub mod backend;
pub mod handle;
/// Audio module
///
/// Owns everything that actually makes noise:
/// - A backend seam over sound output (rodio in production, fakes in tests)
/// - Per-channel playback lifecycle with repeat-until-condition-false
///   semantics
/// - An ad-hoc handle for one-off channels outside the global rule table
///
/// ## Architecture
///
/// ```text
/// SoundEngine
///   ├── ChannelPlayer (ACTIVES_ORDERS_CHANNEL)   ─┐
///   ├── ChannelPlayer (OVERDUE_ORDERS_CHANNEL)   ─┤ Independent
///   └── ChannelPlayer (NEW_NOTIFICATION_CHANNEL) ─┘ channels
///
/// Each ChannelPlayer owns:
///   ├── AudioClip (created fresh per play, released on stop)
///   └── repeat ticker (Repeat mode only, one per playing session)
/// ```
pub mod player;

// Re-export commonly used types
pub use backend::{AudioBackend, AudioClip, RodioBackend};
pub use handle::{SoundConfig, SoundHandle};
pub use player::{ChannelPlayer, ContinuationFn, PlaybackMode, DEFAULT_REPEAT_INTERVAL_MS};
