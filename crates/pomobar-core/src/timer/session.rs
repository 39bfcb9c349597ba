use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ConfigError;

/// Configured session length.
///
/// Hosts offer a fixed set of lengths; anything else is rejected when the
/// value is configured rather than at start time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum SessionLength {
    Fifteen,
    Twenty,
    #[default]
    TwentyFive,
    Thirty,
    Fifty,
}

impl SessionLength {
    pub const ALL: [SessionLength; 5] = [
        SessionLength::Fifteen,
        SessionLength::Twenty,
        SessionLength::TwentyFive,
        SessionLength::Thirty,
        SessionLength::Fifty,
    ];

    pub fn minutes(self) -> u32 {
        match self {
            SessionLength::Fifteen => 15,
            SessionLength::Twenty => 20,
            SessionLength::TwentyFive => 25,
            SessionLength::Thirty => 30,
            SessionLength::Fifty => 50,
        }
    }

    pub fn secs(self) -> u64 {
        u64::from(self.minutes()) * 60
    }
}

impl TryFrom<u32> for SessionLength {
    type Error = ConfigError;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|len| len.minutes() == minutes)
            .ok_or_else(|| {
                ConfigError::invalid(
                    "timer.duration_minutes",
                    format!("{minutes} is not one of 15, 20, 25, 30, 50"),
                )
            })
    }
}

impl From<SessionLength> for u32 {
    fn from(len: SessionLength) -> Self {
        len.minutes()
    }
}

impl fmt::Display for SessionLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min", self.minutes())
    }
}

/// One timed focus interval.
///
/// The duration is fixed at creation; only [`Session::countdown`] mutates
/// the remaining time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: Uuid,
    duration_secs: u64,
    remaining_secs: u64,
}

impl Session {
    pub fn new(duration_secs: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            duration_secs,
            remaining_secs: duration_secs,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// Take one second off. Returns `true` when the session has run out.
    pub fn countdown(&mut self) -> bool {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        self.remaining_secs == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lengths_accept_picker_values() {
        for minutes in [15, 20, 25, 30, 50] {
            let len = SessionLength::try_from(minutes).unwrap();
            assert_eq!(len.minutes(), minutes);
            assert_eq!(len.secs(), u64::from(minutes) * 60);
        }
    }

    #[test]
    fn lengths_reject_other_values() {
        for minutes in [0, 1, 24, 45, 60] {
            assert!(SessionLength::try_from(minutes).is_err());
        }
    }

    #[test]
    fn length_serializes_as_minutes() {
        assert_eq!(serde_json::to_string(&SessionLength::Thirty).unwrap(), "30");
        let parsed: SessionLength = serde_json::from_str("50").unwrap();
        assert_eq!(parsed, SessionLength::Fifty);
        assert!(serde_json::from_str::<SessionLength>("7").is_err());
    }

    #[test]
    fn default_length_is_twenty_five() {
        assert_eq!(SessionLength::default().minutes(), 25);
    }

    #[test]
    fn countdown_stops_at_zero() {
        let mut session = Session::new(2);
        assert!(!session.countdown());
        assert_eq!(session.remaining_secs(), 1);
        assert!(session.countdown());
        assert!(session.countdown());
        assert_eq!(session.remaining_secs(), 0);
        assert_eq!(session.duration_secs(), 2);
    }

    #[test]
    fn sessions_get_distinct_ids() {
        assert_ne!(Session::new(60).id(), Session::new(60).id());
    }
}
