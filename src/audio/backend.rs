/// Audio output seam
///
/// Channel players talk to sound hardware through these traits so the
/// playback lifecycle can be tested against counting fakes.
use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use crate::error::AudioError;

/// Produces playable sound units from opaque asset references.
pub trait AudioBackend: Send + Sync {
    /// Create a fresh playable sound unit for the given asset reference.
    fn load(&self, source: &str) -> Result<Box<dyn AudioClip>, AudioError>;
}

/// One playable sound unit, created fresh per playback session.
pub trait AudioClip: Send {
    /// Rewind to the start and begin playback.
    fn restart(&mut self) -> Result<(), AudioError>;

    /// Pause playback and clear anything still queued.
    fn stop(&mut self);
}

fn resolve_source(base_dir: &Path, source: &str) -> PathBuf {
    let path = Path::new(source);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Rodio-based backend. Assets are read and decode-verified once, then
/// served from memory for every subsequent playback session.
pub struct RodioBackend {
    stream_handle: OutputStreamHandle,
    base_dir: PathBuf,
    volume: f32,
    cache: Mutex<HashMap<String, Arc<Vec<u8>>>>,
}

impl RodioBackend {
    pub fn new(base_dir: impl Into<PathBuf>, volume: f32) -> Result<Self, AudioError> {
        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|e| AudioError::StreamInitFailed(Box::new(e)))?;

        // The output stream must outlive every sink created from its handle.
        // Channels live for the whole process, so the stream is leaked here
        // instead of being threaded through every owner.
        std::mem::forget(stream);

        Ok(Self {
            stream_handle,
            base_dir: base_dir.into(),
            volume: volume.clamp(0.0, 1.0),
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Read an asset into memory, verifying it decodes before first use.
    fn asset_bytes(&self, source: &str) -> Result<Arc<Vec<u8>>, AudioError> {
        if let Some(data) = self.cache.lock().get(source) {
            return Ok(Arc::clone(data));
        }

        let path = resolve_source(&self.base_dir, source);
        let data = std::fs::read(&path).map_err(|e| AudioError::LoadFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;

        // Warm up the decoder once to verify the asset.
        // Note: We must clone here as rodio's Decoder requires owned data
        // with 'static lifetime
        let cursor = Cursor::new(data.clone());
        let decoder = Decoder::new(cursor).map_err(|e| AudioError::DecodeFailed(Box::new(e)))?;
        let _ = decoder.count();

        tracing::info!(
            "Preloaded sound asset: {} ({} bytes)",
            path.display(),
            data.len()
        );

        let data = Arc::new(data);
        self.cache
            .lock()
            .insert(source.to_string(), Arc::clone(&data));
        Ok(data)
    }
}

impl AudioBackend for RodioBackend {
    fn load(&self, source: &str) -> Result<Box<dyn AudioClip>, AudioError> {
        let audio_data = self.asset_bytes(source)?;
        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| AudioError::StreamInitFailed(Box::new(e)))?;

        Ok(Box::new(RodioClip {
            stream_handle: self.stream_handle.clone(),
            sink,
            audio_data,
            volume: self.volume,
        }))
    }
}

struct RodioClip {
    stream_handle: OutputStreamHandle,
    sink: Sink,
    audio_data: Arc<Vec<u8>>,
    volume: f32,
}

impl AudioClip for RodioClip {
    fn restart(&mut self) -> Result<(), AudioError> {
        // Stop any in-flight playback and reinitialize the sink to clear
        // queued audio.
        self.sink.stop();
        if let Ok(sink) = Sink::try_new(&self.stream_handle) {
            self.sink = sink;
        }

        // Note: We must clone here as rodio's Decoder requires owned data
        // with 'static lifetime
        let cursor = Cursor::new((*self.audio_data).clone());
        let decoder = Decoder::new(cursor).map_err(|e| AudioError::DecodeFailed(Box::new(e)))?;

        self.sink.set_volume(self.volume);
        self.sink.append(decoder);
        self.sink.play();

        Ok(())
    }

    fn stop(&mut self) {
        self.sink.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Note: RodioBackend itself needs real audio hardware, so playback is
    // covered by the fakes in player tests. Only path resolution is testable
    // here.

    #[test]
    fn test_resolve_relative_source() {
        let resolved = resolve_source(Path::new("/opt/orderbell/sounds"), "new-order.mp3");
        assert_eq!(
            resolved,
            PathBuf::from("/opt/orderbell/sounds/new-order.mp3")
        );
    }

    #[test]
    fn test_resolve_absolute_source() {
        let resolved = resolve_source(Path::new("sounds"), "/srv/assets/chime.mp3");
        assert_eq!(resolved, PathBuf::from("/srv/assets/chime.mp3"));
    }
}
