pub mod core;
pub mod program;
pub mod sim;

pub use crate::core::{Dispatcher, EventKind, KernelCtx, Pid, ProcessState, SimEvent};
pub use crate::program::{CreationSchedule, Instruction, InstructionKind};
pub use crate::sim::{Sim, SimParams};
