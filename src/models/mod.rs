pub mod question;
pub mod quiz_attempt;
pub mod student;
pub mod task;
