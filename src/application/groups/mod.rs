pub mod service;

pub use service::{AddMembersReport, GroupDetails, GroupMembershipManager, MemberOutcome};
