//! Timer service: drives a [`SessionTimer`] on a single tokio task.
//!
//! The task owns the timer outright, so commands and ticks are applied one
//! at a time and never race. The countdown driver is a `tokio::time::Interval`
//! tied to the timer's armed [`DriverToken`]: whenever the token changes the
//! old interval is dropped before a new one is installed, and while the
//! driver is idle there is no interval at all.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use crate::error::{CoreError, Result};
use crate::timer::{DriverToken, SessionLength, SessionTimer, TimerSnapshot};

/// One countdown step.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

const COMMAND_BUFFER: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Op {
    Start,
    Pause,
    Toggle,
    Stop,
    SetLength(SessionLength),
    SetAutoRepeat(bool),
    SetSoundEnabled(bool),
    SetSoundVolume(f32),
    Status,
    Shutdown,
}

struct Command {
    op: Op,
    reply: oneshot::Sender<TimerSnapshot>,
}

pub struct TimerService {
    timer: SessionTimer,
    period: Duration,
    commands: mpsc::Receiver<Command>,
    snapshots: watch::Sender<TimerSnapshot>,
    ticker: Option<(DriverToken, Interval)>,
}

impl TimerService {
    /// Spawn the service on the current tokio runtime with a one-second tick.
    pub fn spawn(timer: SessionTimer) -> TimerHandle {
        Self::spawn_with_period(timer, TICK_PERIOD)
    }

    pub fn spawn_with_period(timer: SessionTimer, period: Duration) -> TimerHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(timer.snapshot());
        let service = Self {
            timer,
            period,
            commands: command_rx,
            snapshots: snapshot_tx,
            ticker: None,
        };
        tokio::spawn(service.run());
        TimerHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
        }
    }

    async fn run(mut self) {
        loop {
            self.sync_driver();
            tokio::select! {
                command = self.commands.recv() => {
                    let Some(Command { op, reply }) = command else {
                        break;
                    };
                    let shutdown = op == Op::Shutdown;
                    if !shutdown {
                        self.apply(op);
                    }
                    self.publish();
                    let _ = reply.send(self.timer.snapshot());
                    if shutdown {
                        break;
                    }
                }
                Some(token) = next_tick(&mut self.ticker) => {
                    self.timer.tick(token);
                    self.publish();
                }
            }
        }
        self.ticker = None;
        tracing::debug!("timer service stopped");
    }

    fn apply(&mut self, op: Op) {
        match op {
            Op::Start => self.timer.start(),
            Op::Pause => self.timer.pause(),
            Op::Toggle => {
                if self.timer.is_running() {
                    self.timer.pause();
                } else {
                    self.timer.start();
                }
            }
            Op::Stop => self.timer.stop(),
            Op::SetLength(length) => self.timer.set_length(length),
            Op::SetAutoRepeat(enabled) => self.timer.set_auto_repeat(enabled),
            Op::SetSoundEnabled(enabled) => self.timer.set_sound_enabled(enabled),
            Op::SetSoundVolume(volume) => self.timer.set_sound_volume(volume),
            Op::Status | Op::Shutdown => {}
        }
    }

    /// Replace the interval if the timer's armed token changed.
    fn sync_driver(&mut self) {
        let armed = self.timer.driver_token();
        let installed = self.ticker.as_ref().map(|(token, _)| *token);
        if armed == installed {
            return;
        }

        self.ticker = None;
        if let Some(token) = armed {
            let mut interval = time::interval_at(Instant::now() + self.period, self.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.ticker = Some((token, interval));
        }
    }

    fn publish(&self) {
        let snapshot = self.timer.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}

async fn next_tick(ticker: &mut Option<(DriverToken, Interval)>) -> Option<DriverToken> {
    match ticker {
        Some((token, interval)) => {
            interval.tick().await;
            Some(*token)
        }
        None => std::future::pending().await,
    }
}

/// Host-side handle to a running [`TimerService`].
///
/// Each command resolves once the service has applied it, with the
/// resulting snapshot.
#[derive(Clone)]
pub struct TimerHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<TimerSnapshot>,
}

impl TimerHandle {
    async fn send(&self, op: Op) -> Result<TimerSnapshot> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command { op, reply })
            .await
            .map_err(|_| CoreError::ServiceStopped)?;
        response.await.map_err(|_| CoreError::ServiceStopped)
    }

    pub async fn start(&self) -> Result<TimerSnapshot> {
        self.send(Op::Start).await
    }

    pub async fn pause(&self) -> Result<TimerSnapshot> {
        self.send(Op::Pause).await
    }

    /// Pause when running, otherwise start or resume.
    pub async fn toggle(&self) -> Result<TimerSnapshot> {
        self.send(Op::Toggle).await
    }

    pub async fn stop(&self) -> Result<TimerSnapshot> {
        self.send(Op::Stop).await
    }

    pub async fn set_length(&self, length: SessionLength) -> Result<TimerSnapshot> {
        self.send(Op::SetLength(length)).await
    }

    pub async fn set_auto_repeat(&self, enabled: bool) -> Result<TimerSnapshot> {
        self.send(Op::SetAutoRepeat(enabled)).await
    }

    pub async fn set_sound_enabled(&self, enabled: bool) -> Result<TimerSnapshot> {
        self.send(Op::SetSoundEnabled(enabled)).await
    }

    pub async fn set_sound_volume(&self, volume: f32) -> Result<TimerSnapshot> {
        self.send(Op::SetSoundVolume(volume)).await
    }

    /// Current state as seen by the service.
    pub async fn status(&self) -> Result<TimerSnapshot> {
        self.send(Op::Status).await
    }

    /// Last published snapshot, without a round trip.
    pub fn snapshot(&self) -> TimerSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshots.clone()
    }

    /// Stop the service task. The countdown driver is dropped with it.
    pub async fn shutdown(&self) -> Result<TimerSnapshot> {
        self.send(Op::Shutdown).await
    }
}
