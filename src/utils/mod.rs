pub mod timing;
pub mod trace;

pub use timing::{ExecutionTimer, Timestamp};
pub use trace::TraceWriter;
