//! # Pomobar Core Library
//!
//! Core logic for the pomobar focus timer, a single-user countdown that
//! lives in a menu bar (or any other host) and reports session lifecycle
//! changes to a remote endpoint and to an audio-feedback player.
//!
//! ## Architecture
//!
//! - **Session Timer**: A synchronous state machine (`Idle`, `Running`,
//!   `Paused`) that counts down one tick at a time and auto-repeats sessions
//! - **Countdown Driver**: Generation-counted tick source; re-arming cancels
//!   the previous driver so ticks never stack
//! - **Notifications**: Best-effort audio cues and fire-and-forget HTTP
//!   event delivery, neither of which can fail a transition
//! - **Runtime**: A tokio task that owns the timer and drives it once per
//!   second, publishing snapshots for the host
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`SessionTimer`]: Core session state machine
//! - [`TimerService`]: Single-task runtime driving a `SessionTimer`
//! - [`Notifier`]: Composite audio + delivery notification sink
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod notify;
pub mod runtime;
pub mod storage;
pub mod timer;

pub use error::{AudioError, ConfigError, CoreError, DeliveryError, Result};
pub use events::{EventRecord, SessionAction};
pub use notify::{
    Cue, CuePlayer, EventDelivery, HttpDelivery, MemorySink, NotificationSink, Notifier,
    SoundPlayer,
};
pub use runtime::{TimerHandle, TimerService};
pub use storage::Config;
pub use timer::{
    format_clock, format_secs, SessionLength, SessionTimer, TimerSettings, TimerSnapshot,
    TimerState,
};
