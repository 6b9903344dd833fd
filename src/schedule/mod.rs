pub mod executor;
pub mod manager;
pub mod rule;
pub mod store;
pub mod types;

pub use executor::{BatchReport, DelayFn, RoomFailure, TaskExecutor};
pub use manager::{ScheduleManager, SendOutcome};
pub use rule::{NthWeekday, RepeatRule};
pub use store::{JsonTaskStore, MemoryTaskStore, TaskStore};
pub use types::{ExecutionRecord, RunStatus, ScheduleStore, ScheduleTask, TaskStatus};
