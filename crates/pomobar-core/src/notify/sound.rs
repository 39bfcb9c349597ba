//! Cached audio cue playback.
//!
//! [`SoundPlayer`] keeps one loaded handle per cue. The first play of a cue
//! resolves its resource (primary format, then fallback) and caches the
//! handle; later plays rewind it and reapply the current volume so rapid
//! re-triggering always starts from the beginning. Every failure is logged
//! and swallowed.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use super::output;
use super::Cue;
use crate::error::AudioError;

pub const PRIMARY_EXTENSION: &str = "aiff";
pub const FALLBACK_EXTENSION: &str = "mp3";

const DEFAULT_VOLUME: f32 = 0.8;

/// Capability to play a named cue at a volume (0.0 ..= 1.0).
pub trait CuePlayer: Send + Sync {
    fn play(&self, cue: Cue, volume: f32);
}

/// A loaded, replayable sound.
pub trait CueHandle: Send {
    /// Move the playback position back to the start.
    fn rewind(&mut self);
    fn set_volume(&mut self, volume: f32);
    fn play(&mut self) -> Result<(), AudioError>;
}

/// Resolves cue resources into playable handles.
pub trait CueLoader: Send + Sync {
    /// `Ok(None)` when no resource exists for this cue in `extension`.
    fn load(&self, cue: Cue, extension: &str) -> Result<Option<Box<dyn CueHandle>>, AudioError>;
}

/// Loads `<dir>/<cue>.<ext>` from disk.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    dir: PathBuf,
}

impl DirectoryLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, cue: Cue, extension: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", cue.name(), extension))
    }
}

impl CueLoader for DirectoryLoader {
    fn load(&self, cue: Cue, extension: &str) -> Result<Option<Box<dyn CueHandle>>, AudioError> {
        let path = self.path_for(cue, extension);
        if !path.is_file() {
            return Ok(None);
        }
        let bytes = std::fs::read(&path).map_err(|e| AudioError::Load {
            path: path.clone(),
            message: e.to_string(),
        })?;
        output::open(path, bytes).map(Some)
    }
}

struct PlayerCache {
    volume: f32,
    handles: HashMap<Cue, Box<dyn CueHandle>>,
}

/// Cue cache shared by every timer that plays through it.
pub struct SoundPlayer {
    loader: Box<dyn CueLoader>,
    cache: Mutex<PlayerCache>,
}

impl SoundPlayer {
    pub fn new(loader: impl CueLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            cache: Mutex::new(PlayerCache {
                volume: DEFAULT_VOLUME,
                handles: HashMap::new(),
            }),
        }
    }

    pub fn volume(&self) -> f32 {
        self.lock().volume
    }

    /// Update the volume of every cached cue immediately.
    pub fn set_volume(&self, volume: f32) {
        let mut cache = self.lock();
        Self::apply_volume(&mut cache, volume);
    }

    /// Load every available cue up front so the first play does no file IO.
    ///
    /// Cues with no usable file stay uncached and are looked up again on play.
    pub fn preload(&self) {
        let mut cache = self.lock();
        let volume = cache.volume;
        for cue in Cue::ALL {
            if cache.handles.contains_key(&cue) {
                continue;
            }
            match self.resolve(cue) {
                Ok(mut handle) => {
                    handle.set_volume(volume);
                    cache.handles.insert(cue, handle);
                }
                Err(e) => tracing::debug!(cue = cue.name(), error = %e, "cue not preloaded"),
            }
        }
    }

    pub fn is_cached(&self, cue: Cue) -> bool {
        self.lock().handles.contains_key(&cue)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PlayerCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply_volume(cache: &mut PlayerCache, volume: f32) {
        let volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
        cache.volume = volume;
        for handle in cache.handles.values_mut() {
            handle.set_volume(volume);
        }
    }

    /// First format that loads wins; an unreadable file falls through to the next.
    fn resolve(&self, cue: Cue) -> Result<Box<dyn CueHandle>, AudioError> {
        let mut failure = None;
        for extension in [PRIMARY_EXTENSION, FALLBACK_EXTENSION] {
            match self.loader.load(cue, extension) {
                Ok(Some(handle)) => {
                    tracing::debug!(cue = cue.name(), extension, "loaded sound");
                    return Ok(handle);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(cue = cue.name(), extension, error = %e, "sound unusable");
                    failure = Some(e);
                }
            }
        }
        Err(failure.unwrap_or_else(|| AudioError::NotFound(cue.name().to_string())))
    }

    fn try_play(&self, cue: Cue, volume: f32) -> Result<(), AudioError> {
        let mut cache = self.lock();
        Self::apply_volume(&mut cache, volume);
        let volume = cache.volume;

        if let Some(handle) = cache.handles.get_mut(&cue) {
            handle.rewind();
            handle.set_volume(volume);
            return handle.play();
        }

        let mut handle = self.resolve(cue)?;
        handle.set_volume(volume);
        let result = handle.play();
        cache.handles.insert(cue, handle);
        result
    }
}

impl CuePlayer for SoundPlayer {
    fn play(&self, cue: Cue, volume: f32) {
        if let Err(e) = self.try_play(cue, volume) {
            tracing::warn!(cue = cue.name(), error = %e, "audio cue skipped");
        }
    }
}
