pub mod job;

pub use job::{next_run_after, ReminderJob, ReminderRunReport};
