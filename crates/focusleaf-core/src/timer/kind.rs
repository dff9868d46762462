use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a session is for. Only affects duration and label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    #[default]
    Work,
    Meditation,
}

impl SessionKind {
    pub fn label(self) -> &'static str {
        match self {
            SessionKind::Work => "Work",
            SessionKind::Meditation => "Meditation",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SessionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "work" => Ok(SessionKind::Work),
            "meditation" => Ok(SessionKind::Meditation),
            other => Err(format!("unknown session kind: {other}")),
        }
    }
}

/// Nominal session lengths, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionDurations {
    pub work_min: u64,
    pub meditation_min: u64,
}

impl SessionDurations {
    pub fn minutes(&self, kind: SessionKind) -> u64 {
        match kind {
            SessionKind::Work => self.work_min,
            SessionKind::Meditation => self.meditation_min,
        }
    }

    /// Duration in milliseconds. Saturates instead of overflowing.
    pub fn duration_ms(&self, kind: SessionKind) -> u64 {
        self.minutes(kind).saturating_mul(60).saturating_mul(1000)
    }
}

impl Default for SessionDurations {
    fn default() -> Self {
        Self {
            work_min: 25,
            meditation_min: 25,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_is_25_minutes_by_default() {
        let d = SessionDurations::default();
        assert_eq!(d.duration_ms(SessionKind::Work), 1_500_000);
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("Meditation".parse::<SessionKind>(), Ok(SessionKind::Meditation));
        assert!("nap".parse::<SessionKind>().is_err());
    }
}
