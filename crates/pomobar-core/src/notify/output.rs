//! Audio output behind [`CueHandle`].
//!
//! With the `rodio` feature, cached bytes are decoded and played on the
//! default output device from a detached thread. Without it, playback is
//! only logged, which keeps headless builds free of system audio libraries.
//!
//! rodio is built with mp3 and wav decoders only. An `.aiff` cue is rejected
//! when loaded, so the player falls back to the `.mp3` file; a cue set that
//! ships only `.aiff` files plays nothing under this backend.

use std::path::PathBuf;

use super::sound::CueHandle;
use crate::error::AudioError;

pub(crate) fn open(path: PathBuf, bytes: Vec<u8>) -> Result<Box<dyn CueHandle>, AudioError> {
    imp::open(path, bytes)
}

#[cfg(feature = "rodio")]
mod imp {
    use std::io::Cursor;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use rodio::{Decoder, OutputStream, Sink};

    use super::CueHandle;
    use crate::error::AudioError;

    pub(super) fn open(path: PathBuf, bytes: Vec<u8>) -> Result<Box<dyn CueHandle>, AudioError> {
        let bytes: Arc<[u8]> = Arc::from(bytes);
        // Decode once up front so unsupported formats are rejected at load time.
        Decoder::new(Cursor::new(Arc::clone(&bytes))).map_err(|e| AudioError::Load {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(Box::new(RodioCue {
            path,
            bytes,
            volume: 1.0,
            current: None,
        }))
    }

    struct RodioCue {
        path: PathBuf,
        bytes: Arc<[u8]>,
        volume: f32,
        /// Stop flag of the playback thread started by the last `play`.
        current: Option<Arc<AtomicBool>>,
    }

    impl CueHandle for RodioCue {
        fn rewind(&mut self) {
            if let Some(stop) = self.current.take() {
                stop.store(true, Ordering::Relaxed);
            }
        }

        fn set_volume(&mut self, volume: f32) {
            self.volume = volume;
        }

        fn play(&mut self) -> Result<(), AudioError> {
            let bytes = Arc::clone(&self.bytes);
            let volume = self.volume;
            let path = self.path.clone();
            let stop = Arc::new(AtomicBool::new(false));
            let stop_flag = Arc::clone(&stop);

            std::thread::Builder::new()
                .name("pomobar-cue".into())
                .spawn(move || {
                    let Ok((_stream, handle)) = OutputStream::try_default() else {
                        tracing::warn!(path = %path.display(), "no audio output device");
                        return;
                    };
                    let source = match Decoder::new(Cursor::new(bytes)) {
                        Ok(source) => source,
                        Err(e) => {
                            tracing::warn!(path = %path.display(), error = %e, "failed to decode sound");
                            return;
                        }
                    };
                    let Ok(sink) = Sink::try_new(&handle) else {
                        return;
                    };
                    sink.set_volume(volume);
                    sink.append(source);
                    while !sink.empty() {
                        if stop_flag.load(Ordering::Relaxed) {
                            sink.stop();
                            break;
                        }
                        std::thread::sleep(Duration::from_millis(20));
                    }
                })
                .map_err(|e| AudioError::Playback(e.to_string()))?;

            self.current = Some(stop);
            Ok(())
        }
    }
}

#[cfg(not(feature = "rodio"))]
mod imp {
    use std::path::PathBuf;

    use super::CueHandle;
    use crate::error::AudioError;

    pub(super) fn open(path: PathBuf, bytes: Vec<u8>) -> Result<Box<dyn CueHandle>, AudioError> {
        Ok(Box::new(SilentCue {
            path,
            len: bytes.len(),
            volume: 1.0,
        }))
    }

    struct SilentCue {
        path: PathBuf,
        len: usize,
        volume: f32,
    }

    impl CueHandle for SilentCue {
        fn rewind(&mut self) {}

        fn set_volume(&mut self, volume: f32) {
            self.volume = volume;
        }

        fn play(&mut self) -> Result<(), AudioError> {
            tracing::debug!(
                path = %self.path.display(),
                bytes = self.len,
                volume = self.volume,
                "playing cue (no audio output compiled in)"
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "rodio")]
    #[test]
    fn undecodable_bytes_are_rejected_at_load() {
        let aiff_header = b"FORM\0\0\0\x04AIFF".to_vec();
        let result = open(PathBuf::from("start.aiff"), aiff_header);
        assert!(matches!(result, Err(AudioError::Load { .. })));
    }

    #[cfg(not(feature = "rodio"))]
    #[test]
    fn silent_cue_plays_without_device() {
        let mut cue = open(PathBuf::from("start.aiff"), b"FORM".to_vec()).unwrap();
        cue.set_volume(0.5);
        cue.rewind();
        assert!(cue.play().is_ok());
    }
}
