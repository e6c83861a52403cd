pub mod access_event;
pub mod employee;
pub mod leave_event;
pub mod source;
pub mod summary;
