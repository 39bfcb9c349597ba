//! Countdown driver bookkeeping.
//!
//! The driver itself is whatever periodic source the host uses (a tokio
//! interval in [`crate::runtime`], a manual loop in tests). This type only
//! tracks which tick source is current: every `arm` starts a new
//! generation, and a tick is applied only if it carries the token of the
//! armed generation.

/// Identifies one armed generation of the countdown driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DriverToken(u64);

#[derive(Debug, Default)]
pub struct CountdownDriver {
    generation: u64,
    armed: bool,
}

impl CountdownDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any previous generation and arm a new one.
    pub fn arm(&mut self) -> DriverToken {
        self.generation = self.generation.wrapping_add(1);
        self.armed = true;
        DriverToken(self.generation)
    }

    /// Invalidate the current token immediately.
    pub fn cancel(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn current(&self) -> Option<DriverToken> {
        self.armed.then_some(DriverToken(self.generation))
    }

    /// Whether a tick carrying `token` may be applied.
    pub fn accepts(&self, token: DriverToken) -> bool {
        self.armed && token.0 == self.generation
    }
}
