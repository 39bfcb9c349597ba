//! Session timer state machine.
//!
//! The timer owns the session, the countdown and the auto-repeat policy.
//! It does not use internal threads - something has to call `tick()` once per
//! second with the token of the currently armed driver (see
//! [`crate::runtime::TimerService`]).
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running -> ... -> Idle
//!           |                                     ^
//!           +-- tick reaches 0 (Completed) -------+ (or Running again with auto-repeat)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = SessionTimer::new(TimerSettings::default(), sink);
//! timer.start();
//! // Once per second:
//! timer.tick_now();
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::driver::{CountdownDriver, DriverToken};
use super::format::format_secs;
use super::session::{Session, SessionLength};
use crate::events::{EventRecord, SessionAction};
use crate::notify::{Cue, NotificationSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

/// User-adjustable timer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSettings {
    pub length: SessionLength,
    pub auto_repeat: bool,
    pub sound_enabled: bool,
    /// 0.0 ..= 1.0
    pub sound_volume: f32,
    pub user_id: Option<String>,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            length: SessionLength::default(),
            auto_repeat: true,
            sound_enabled: true,
            sound_volume: 1.0,
            user_id: None,
        }
    }
}

/// Read model published to hosts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub is_running: bool,
    pub has_session: bool,
    pub session_id: Option<Uuid>,
    pub remaining_secs: u64,
    /// `MM:SS`, empty when idle.
    pub remaining_formatted: String,
    pub state_description: String,
    pub duration_minutes: u32,
    pub auto_repeat: bool,
    pub sound_enabled: bool,
    pub sound_volume: f32,
}

/// Core session timer.
///
/// Every transition mutates state first, then plays its cue, then emits its
/// events. Notification failures are handled inside the sink and never
/// reach the timer.
pub struct SessionTimer {
    settings: TimerSettings,
    session: Option<Session>,
    running: bool,
    driver: CountdownDriver,
    sink: Arc<dyn NotificationSink>,
}

impl SessionTimer {
    pub fn new(settings: TimerSettings, sink: Arc<dyn NotificationSink>) -> Self {
        let volume = settings.sound_volume;
        let mut timer = Self {
            settings,
            session: None,
            running: false,
            driver: CountdownDriver::new(),
            sink,
        };
        timer.set_sound_volume(volume);
        timer
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        match (&self.session, self.running) {
            (None, _) => TimerState::Idle,
            (Some(_), true) => TimerState::Running,
            (Some(_), false) => TimerState::Paused,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session.as_ref().map(Session::id)
    }

    /// Remaining seconds of the current session, 0 when idle.
    pub fn remaining_secs(&self) -> u64 {
        self.session.as_ref().map_or(0, Session::remaining_secs)
    }

    /// Duration of the current session, or of the next one when idle.
    pub fn duration_secs(&self) -> u64 {
        self.session
            .as_ref()
            .map_or(self.settings.length.secs(), Session::duration_secs)
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    /// Token of the currently armed countdown driver.
    pub fn driver_token(&self) -> Option<DriverToken> {
        self.driver.current()
    }

    /// `MM:SS` while a session exists, empty otherwise.
    pub fn menu_title(&self) -> String {
        if self.has_session() {
            format_secs(self.remaining_secs())
        } else {
            String::new()
        }
    }

    pub fn state_description(&self) -> String {
        match self.state() {
            TimerState::Running => format!("Session running: {}", self.menu_title()),
            TimerState::Paused => format!("Paused: {}", self.menu_title()),
            TimerState::Idle => "No session running".to_string(),
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            state: self.state(),
            is_running: self.running,
            has_session: self.has_session(),
            session_id: self.session_id(),
            remaining_secs: self.remaining_secs(),
            remaining_formatted: self.menu_title(),
            state_description: self.state_description(),
            duration_minutes: self.settings.length.minutes(),
            auto_repeat: self.settings.auto_repeat,
            sound_enabled: self.settings.sound_enabled,
            sound_volume: self.settings.sound_volume,
        }
    }

    // ── Settings ─────────────────────────────────────────────────────

    /// Applies to the next created session; an active session keeps its
    /// duration.
    pub fn set_length(&mut self, length: SessionLength) {
        self.settings.length = length;
    }

    pub fn set_auto_repeat(&mut self, auto_repeat: bool) {
        self.settings.auto_repeat = auto_repeat;
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.settings.sound_enabled = enabled;
    }

    /// Clamped to 0.0 ..= 1.0; NaN becomes 0.
    pub fn set_sound_volume(&mut self, volume: f32) {
        self.settings.sound_volume = if volume.is_nan() {
            0.0
        } else {
            volume.clamp(0.0, 1.0)
        };
    }

    pub fn set_user_id(&mut self, user_id: Option<String>) {
        self.settings.user_id = user_id;
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a new session, or resume a paused one.
    ///
    /// Calling this while already running re-arms the driver without
    /// creating a session.
    pub fn start(&mut self) {
        let created = match self.session {
            Some(_) => None,
            None => {
                let session = Session::new(self.settings.length.secs());
                let id = session.id();
                self.session = Some(session);
                Some(id)
            }
        };
        self.running = true;
        self.driver.arm();

        if let Some(id) = created {
            tracing::info!(session_id = %id, duration_secs = self.duration_secs(), "session created");
        } else {
            tracing::info!(remaining_secs = self.remaining_secs(), "session started or resumed");
        }

        self.play(Cue::Start);
        if created.is_some() {
            self.emit_create();
        }
        self.emit(SessionAction::StartOrResume);
    }

    /// No-op unless running.
    pub fn pause(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.driver.cancel();
        tracing::info!(remaining_secs = self.remaining_secs(), "session paused");

        self.play(Cue::Pause);
        self.emit(SessionAction::Pause);
    }

    /// End the current session. No-op when idle.
    pub fn stop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        self.running = false;
        self.driver.cancel();
        tracing::info!(session_id = %session.id(), remaining_secs = session.remaining_secs(), "session stopped");

        self.play(Cue::Stop);
        self.emit_for(&session, SessionAction::Stop);
    }

    /// Apply one tick from the driver generation identified by `token`.
    ///
    /// Ticks from a cancelled or replaced generation are discarded.
    pub fn tick(&mut self, token: DriverToken) {
        if !self.running || !self.driver.accepts(token) {
            tracing::trace!(?token, "discarding stale tick");
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let finished = session.countdown();
        tracing::debug!(remaining_secs = session.remaining_secs(), "tick");
        if finished {
            self.complete();
        }
    }

    /// Apply one tick with the currently armed driver, if any.
    pub fn tick_now(&mut self) {
        if let Some(token) = self.driver.current() {
            self.tick(token);
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete(&mut self) {
        self.running = false;
        self.driver.cancel();
        let Some(finished) = self.session.take() else {
            return;
        };
        tracing::info!(session_id = %finished.id(), auto_repeat = self.settings.auto_repeat, "session completed");

        self.play(Cue::Complete);
        self.emit_for(&finished, SessionAction::Complete);

        if self.settings.auto_repeat {
            self.start();
        }
    }

    fn play(&self, cue: Cue) {
        if self.settings.sound_enabled {
            self.sink.play_cue(cue, self.settings.sound_volume);
        }
    }

    fn emit_create(&self) {
        if let Some(session) = &self.session {
            self.sink.deliver(EventRecord::create(
                session.id(),
                session.duration_secs(),
                session.remaining_secs(),
                self.settings.user_id.clone(),
            ));
        }
    }

    fn emit(&self, action: SessionAction) {
        if let Some(session) = &self.session {
            self.emit_for(session, action);
        }
    }

    fn emit_for(&self, session: &Session, action: SessionAction) {
        self.sink.deliver(EventRecord::transition(
            session.id(),
            action,
            session.remaining_secs(),
            self.settings.user_id.clone(),
        ));
    }
}
