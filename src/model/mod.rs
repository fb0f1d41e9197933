//! Domain types exchanged with the ManageMe API.

mod task;
mod user;

pub use task::{Deleted, Report, ReportNote, Task, TaskDraft, TaskQuery, TaskRow};
pub use user::{NewUser, TimeWindow, User, UserPatch};
