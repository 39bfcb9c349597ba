//! Notification collaborators invoked by the session timer.
//!
//! Both capabilities are best-effort: failures are logged where they happen
//! and never returned to the timer.

mod delivery;
mod memory;
mod output;
mod sound;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use delivery::{DeliveryReport, DisabledDelivery, EventDelivery, HttpDelivery};
pub use memory::{MemorySink, Notification};
pub use sound::{
    CueHandle, CueLoader, CuePlayer, DirectoryLoader, SoundPlayer, FALLBACK_EXTENSION,
    PRIMARY_EXTENSION,
};

use crate::error::CoreError;
use crate::events::EventRecord;
use crate::storage::Config;

/// Audio feedback tied to a lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cue {
    Start,
    Pause,
    Stop,
    Complete,
}

impl Cue {
    pub const ALL: [Cue; 4] = [Cue::Start, Cue::Pause, Cue::Stop, Cue::Complete];

    /// Resource stem, e.g. `start` for `start.aiff`.
    pub fn name(&self) -> &'static str {
        match self {
            Cue::Start => "start",
            Cue::Pause => "pause",
            Cue::Stop => "stop",
            Cue::Complete => "complete",
        }
    }
}

/// Everything the timer tells the outside world.
pub trait NotificationSink: Send + Sync {
    fn play_cue(&self, cue: Cue, volume: f32);

    /// Hand off a record for delivery; must not block on the network.
    fn deliver(&self, record: EventRecord);
}

/// Composite of an audio cue player and an event delivery channel.
#[derive(Clone)]
pub struct Notifier {
    player: Arc<dyn CuePlayer>,
    delivery: Arc<dyn EventDelivery>,
}

impl Notifier {
    pub fn new(player: Arc<dyn CuePlayer>, delivery: Arc<dyn EventDelivery>) -> Self {
        Self { player, delivery }
    }

    /// Build the sound player and the delivery channel described by `config`.
    ///
    /// Must be called from within a tokio runtime when delivery is enabled,
    /// so detached requests have somewhere to run.
    pub fn from_config(config: &Config) -> Result<Self, CoreError> {
        let player = SoundPlayer::new(DirectoryLoader::new(config.sounds_dir()?));
        if config.sound.enabled {
            player.preload();
        }
        let delivery: Arc<dyn EventDelivery> = if config.endpoint.enabled {
            Arc::new(HttpDelivery::from_config(&config.endpoint)?)
        } else {
            Arc::new(DisabledDelivery)
        };
        Ok(Self::new(Arc::new(player), delivery))
    }
}

impl NotificationSink for Notifier {
    fn play_cue(&self, cue: Cue, volume: f32) {
        self.player.play(cue, volume);
    }

    fn deliver(&self, record: EventRecord) {
        self.delivery.deliver(record);
    }
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn play_cue(&self, _cue: Cue, _volume: f32) {}

    fn deliver(&self, _record: EventRecord) {}
}
