pub mod commands;
pub mod job;

pub use job::{FAILURE_PREFIX, Job, JobError, JobReport, failure_message};
