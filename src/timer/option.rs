use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// A user-selectable reminder interval, or "off"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimerOption {
    TenSeconds,
    ThirtySeconds,
    SixtySeconds,
    ThirtyMinutes,
    SixtyMinutes,
    #[default]
    Deactivated,
}

impl TimerOption {
    /// Every option in the order it is offered to the user
    pub const ALL: [TimerOption; 6] = [
        TimerOption::TenSeconds,
        TimerOption::ThirtySeconds,
        TimerOption::SixtySeconds,
        TimerOption::ThirtyMinutes,
        TimerOption::SixtyMinutes,
        TimerOption::Deactivated,
    ];

    /// Strict lookup: `None` for anything outside the known label set
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "10s" => Some(TimerOption::TenSeconds),
            "30s" => Some(TimerOption::ThirtySeconds),
            "60s" => Some(TimerOption::SixtySeconds),
            "30 min" => Some(TimerOption::ThirtyMinutes),
            "60 min" => Some(TimerOption::SixtyMinutes),
            "Deactivated" => Some(TimerOption::Deactivated),
            _ => None,
        }
    }

    /// Lenient lookup used at every boundary: unknown labels are `Deactivated`
    pub fn from_label(label: &str) -> Self {
        Self::parse(label).unwrap_or(TimerOption::Deactivated)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimerOption::TenSeconds => "10s",
            TimerOption::ThirtySeconds => "30s",
            TimerOption::SixtySeconds => "60s",
            TimerOption::ThirtyMinutes => "30 min",
            TimerOption::SixtyMinutes => "60 min",
            TimerOption::Deactivated => "Deactivated",
        }
    }

    /// Repeat period of this option, `None` when reminders are disabled
    pub fn duration(&self) -> Option<Duration> {
        let millis = match self {
            TimerOption::TenSeconds => 10_000,
            TimerOption::ThirtySeconds => 30_000,
            TimerOption::SixtySeconds => 60_000,
            TimerOption::ThirtyMinutes => 30 * 60 * 1000,
            TimerOption::SixtyMinutes => 60 * 60 * 1000,
            TimerOption::Deactivated => return None,
        };
        Some(Duration::from_millis(millis))
    }

    pub fn is_enabled(&self) -> bool {
        self.duration().is_some()
    }
}

/// Maps a raw label straight to its repeat period
pub fn duration_of(label: &str) -> Option<Duration> {
    TimerOption::from_label(label).duration()
}

impl fmt::Display for TimerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimerOption {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_label(s))
    }
}
