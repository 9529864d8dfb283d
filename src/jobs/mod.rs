mod job;
mod scheduler;
mod store;

pub use job::{Job, JobStatus};
pub use scheduler::JobScheduler;
