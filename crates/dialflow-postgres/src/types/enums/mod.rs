//! Database enumeration types.

mod change_set_status;

pub use change_set_status::ChangeSetStatus;
