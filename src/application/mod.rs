pub mod attendance;
pub mod duties;
pub mod groups;
pub mod identity;
pub mod notifications;
pub mod ports;
pub mod reminders;

pub use attendance::{AttendanceEntry, AttendanceRecorder, MarkedAttendance};
pub use duties::{DutyScheduler, ScheduledDuty};
pub use groups::{AddMembersReport, GroupDetails, GroupMembershipManager, MemberOutcome};
pub use identity::{AuthResult, UserService};
pub use notifications::{DeliveryMode, DeliveryReport, Notifier};
pub use ports::{Email, NotificationSender, NotifyError};
pub use reminders::{ReminderJob, ReminderRunReport};
