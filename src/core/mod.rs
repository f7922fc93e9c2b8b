pub mod dispatcher;
pub mod event;
pub mod observer;
pub mod queue;
pub mod state;

pub use dispatcher::Dispatcher;
pub use event::{EventKind, EventLog, QueueKind, SimEvent};
pub use observer::Observer;
pub use queue::{BoundedQueue, QueueFull};
pub use state::{Clock, Cycle, ExecUnit, KernelCtx, Pid, Process, ProcessState};
