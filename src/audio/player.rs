/// Channel player
///
/// Manages exactly one audio channel's on/off state and repeat cadence.
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, select, tick, Receiver, Sender};
use parking_lot::Mutex;

use super::backend::{AudioBackend, AudioClip};

/// Re-checked on every repeat tick to decide whether to keep looping.
pub type ContinuationFn = Arc<dyn Fn() -> bool + Send + Sync>;

/// Repeat cadence applied when a channel definition omits one.
pub const DEFAULT_REPEAT_INTERVAL_MS: u64 = 3000;

/// Playback mode of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackMode {
    /// Play the sound a single time per activation
    Once,

    /// Replay the sound on a fixed interval until told to stop
    Repeat,
}

struct PlayerInner {
    is_playing: bool,
    /// Bumped at every session boundary. A tick that observes a stale
    /// generation belongs to a finished session and must do nothing.
    generation: u64,
    clip: Option<Box<dyn AudioClip>>,
    stop_tx: Option<Sender<()>>,
}

fn stop_locked(inner: &mut PlayerInner) {
    inner.generation += 1;
    // Dropping the sender closes the ticker's stop channel and ends it.
    inner.stop_tx = None;
    if let Some(mut clip) = inner.clip.take() {
        clip.stop();
    }
    inner.is_playing = false;
}

/// Owns one audio channel's playback lifecycle: start, repeat-on-interval,
/// stop. `play` and `stop` are both idempotent.
pub struct ChannelPlayer {
    id: String,
    source: String,
    mode: PlaybackMode,
    interval: Duration,
    backend: Arc<dyn AudioBackend>,
    inner: Arc<Mutex<PlayerInner>>,
}

impl ChannelPlayer {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        mode: PlaybackMode,
        interval: Option<Duration>,
        backend: Arc<dyn AudioBackend>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            mode,
            interval: interval.unwrap_or(Duration::from_millis(DEFAULT_REPEAT_INTERVAL_MS)),
            backend,
            inner: Arc::new(Mutex::new(PlayerInner {
                is_playing: false,
                generation: 0,
                clip: None,
                stop_tx: None,
            })),
        }
    }

    /// Start the channel.
    ///
    /// A no-op while the channel is already sounding: Repeat channels must
    /// not stack a second ticker, and Once channels re-arm on `stop`, not on
    /// replay. In Repeat mode the optional `keep_playing` predicate is
    /// re-evaluated on every tick; absent means "always continue".
    ///
    /// Playback-start failures are logged and swallowed, leaving the channel
    /// consistently idle: no clip, no ticker, not playing.
    pub fn play(&self, keep_playing: Option<ContinuationFn>) {
        let mut inner = self.inner.lock();
        if inner.is_playing {
            return;
        }

        let mut clip = match self.backend.load(&self.source) {
            Ok(clip) => clip,
            Err(e) => {
                tracing::warn!("Failed to load sound for {}: {}", self.id, e);
                return;
            }
        };

        if let Err(e) = clip.restart() {
            tracing::warn!("Failed to start playback for {}: {}", self.id, e);
            return;
        }

        inner.generation += 1;
        let generation = inner.generation;
        inner.clip = Some(clip);
        inner.is_playing = true;
        tracing::debug!("Channel {} playing ({:?})", self.id, self.mode);

        if self.mode == PlaybackMode::Repeat {
            let (stop_tx, stop_rx) = bounded::<()>(1);
            inner.stop_tx = Some(stop_tx);
            drop(inner);
            self.spawn_ticker(generation, stop_rx, keep_playing);
        }
    }

    /// Stop the channel.
    ///
    /// Always safe to call, including when the channel never played. Once
    /// this returns, the session generation has moved on and no in-flight
    /// tick for the old session can act, even if a new `play` follows
    /// immediately.
    pub fn stop(&self) {
        let mut inner = self.inner.lock();
        if !inner.is_playing {
            return;
        }
        stop_locked(&mut inner);
        tracing::debug!("Channel {} stopped", self.id);
    }

    pub fn is_playing(&self) -> bool {
        self.inner.lock().is_playing
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    fn spawn_ticker(
        &self,
        generation: u64,
        stop_rx: Receiver<()>,
        keep_playing: Option<ContinuationFn>,
    ) {
        let inner = Arc::clone(&self.inner);
        let id = self.id.clone();
        let ticker = tick(self.interval);

        thread::spawn(move || loop {
            select! {
                recv(stop_rx) -> _ => break,
                recv(ticker) -> _ => {
                    // The predicate runs outside the player lock; the
                    // generation check below discards the tick if the
                    // session ended meanwhile.
                    let keep = keep_playing.as_ref().map(|p| p()).unwrap_or(true);

                    let mut guard = inner.lock();
                    if guard.generation != generation || !guard.is_playing {
                        break;
                    }
                    if !keep {
                        stop_locked(&mut guard);
                        tracing::debug!("Channel {} stopped: condition no longer holds", id);
                        break;
                    }
                    if let Some(clip) = guard.clip.as_mut() {
                        if let Err(e) = clip.restart() {
                            tracing::warn!("Repeat playback failed for {}: {}", id, e);
                        }
                    }
                }
            }
        });
    }
}
