/// Ad-hoc sound handle
///
/// Wraps one channel player for local use outside the global rule table,
/// e.g. a badge that beeps while a pending-order condition holds.
use std::sync::Arc;
use std::time::Duration;

use super::backend::AudioBackend;
use super::player::{ChannelPlayer, ContinuationFn, PlaybackMode};

/// Playback parameters for an ad-hoc channel
#[derive(Debug, Clone)]
pub struct SoundConfig {
    pub id: String,
    pub source: String,
    pub mode: PlaybackMode,
    pub interval_ms: Option<u64>,
}

/// One ad-hoc channel with the same play/stop contract as the rule-table
/// channels, plus a disabled flag that short-circuits `play`.
pub struct SoundHandle {
    player: ChannelPlayer,
    disabled: bool,
}

impl SoundHandle {
    pub fn new(config: SoundConfig, backend: Arc<dyn AudioBackend>, disabled: bool) -> Self {
        Self {
            player: ChannelPlayer::new(
                config.id,
                config.source,
                config.mode,
                config.interval_ms.map(Duration::from_millis),
                backend,
            ),
            disabled,
        }
    }

    /// Start the channel. No-op while disabled or already sounding.
    pub fn play(&self) {
        if self.disabled {
            return;
        }
        self.player.play(None);
    }

    /// Start the channel with a continuation predicate re-checked on every
    /// repeat tick.
    pub fn play_while(&self, keep_playing: ContinuationFn) {
        if self.disabled {
            return;
        }
        self.player.play(Some(keep_playing));
    }

    /// Stop the channel. Always safe, disabled or not.
    pub fn stop(&self) {
        self.player.stop();
    }

    pub fn is_playing(&self) -> bool {
        self.player.is_playing()
    }
}
