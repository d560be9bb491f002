pub mod error;
pub mod scheduler;
pub mod task;

pub use error::SchedulerError;
pub use scheduler::{Scheduler, TaskContext, TickReport, DEFAULT_CAPACITY};
pub use task::{Task, TaskFn, TaskId, TaskInfo, TaskResult};
