//! conduit-scheduler: the in-process periodic job engine.
//!
//! A job couples a connection and a named sync with an interval; the
//! scheduler ticks on its own timer and hands due jobs to an injected
//! [`JobRunner`], decoupling "when" from "how to run a sync" so this crate
//! has no dependency on the execution core.

mod errors;
mod job;
mod runner;
mod scheduler;

pub use errors::SchedulerError;
pub use job::{job_id, JobInfo};
pub use runner::JobRunner;
pub use scheduler::Scheduler;
