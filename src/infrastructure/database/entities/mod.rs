//! Database entities module

pub mod attendance;
pub mod duty;
pub mod group;
pub mod group_membership;
pub mod user;

pub use attendance::Entity as Attendance;
pub use duty::Entity as Duty;
pub use group::Entity as Group;
pub use group_membership::Entity as GroupMembership;
pub use user::Entity as User;
