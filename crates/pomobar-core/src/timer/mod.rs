mod driver;
mod engine;
mod format;
mod session;

pub use driver::{CountdownDriver, DriverToken};
pub use engine::{SessionTimer, TimerSettings, TimerSnapshot, TimerState};
pub use format::{format_clock, format_secs};
pub use session::{Session, SessionLength};
