//! Reminder timer: interval options, scheduler state and the scheduler itself

pub mod option;
pub mod scheduler;
pub mod state;

pub use option::{TimerOption, duration_of};
pub use scheduler::{TickOutcome, TimerScheduler};
pub use state::SchedulerState;
