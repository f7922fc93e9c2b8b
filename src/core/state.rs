use crate::core::queue::{BoundedQueue, QueueFull};
use crate::program::Instruction;

// Index into the KernelCtx process table
pub type Pid = usize;
pub type Cycle = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Ready,
    Running,
    Blocked,
    Terminated,
}

/// Process control block. One per admitted process, owned by the kernel
/// context for the lifetime of the run; container membership (ready queue,
/// blocked set, execution unit) is tracked by pid.
#[derive(Debug)]
pub struct Process {
    pub pid: Pid,
    pub name: String,
    pub state: ProcessState,
    /// Next instruction to execute; `0 <= pc <= instructions.len()`.
    pub pc: usize,
    pub instructions: Vec<Instruction>,
    /// Cycles of simulated I/O left. Meaningful only while Blocked.
    pub remaining_io: Cycle,
    /// Cycle the process entered Blocked. The I/O monitor never counts down
    /// a wait in the cycle it started.
    pub blocked_at: Cycle,
    pub admitted_at: Cycle,
    pub first_dispatched_at: Option<Cycle>,
    pub terminated_at: Option<Cycle>,
    pub dispatches: u64,
}

/// The single execution unit. Holds at most one running process, and only
/// for the duration of a dispatch.
#[derive(Debug, Default)]
pub struct ExecUnit {
    pub current: Option<Pid>,
}

/// Logical cycle counter. Sole authority for simulated time; everything else
/// reads cycle numbers, nothing else advances them.
#[derive(Debug, Default)]
pub struct Clock {
    next: Cycle,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cycle now beginning and advances by exactly one.
    /// The first tick returns cycle 0.
    pub fn tick(&mut self) -> Cycle {
        let cycle = self.next;
        self.next += 1;
        cycle
    }

    /// The cycle the next tick will return.
    pub fn upcoming(&self) -> Cycle {
        self.next
    }
}

#[derive(Debug)]
pub struct KernelCtx {
    pub clock: Clock,
    pub unit: ExecUnit,
    /// Process table. Entries are never removed, so pids are dense,
    /// monotonically increasing, and never reused.
    pub processes: Vec<Process>,
    pub ready: BoundedQueue<Pid>,
    /// Pids awaiting I/O completion, kept sorted ascending so promotion
    /// order among simultaneous completions is deterministic.
    blocked: Vec<Pid>,
    blocked_capacity: usize,
}

impl KernelCtx {
    pub fn new(capacity: usize) -> Self {
        Self {
            clock: Clock::new(),
            unit: ExecUnit::default(),
            processes: Vec::new(),
            ready: BoundedQueue::new(capacity),
            blocked: Vec::new(),
            blocked_capacity: capacity,
        }
    }

    /// Allocate a fresh pid and table entry in the Ready state. The caller
    /// decides whether the process actually makes it into the ready queue.
    pub fn create_process(
        &mut self,
        name: String,
        instructions: Vec<Instruction>,
        cycle: Cycle,
    ) -> Pid {
        let pid = self.processes.len();
        self.processes.push(Process {
            pid,
            name,
            state: ProcessState::Ready,
            pc: 0,
            instructions,
            remaining_io: 0,
            blocked_at: 0,
            admitted_at: cycle,
            first_dispatched_at: None,
            terminated_at: None,
            dispatches: 0,
        });
        pid
    }

    pub fn process(&self, pid: Pid) -> &Process {
        &self.processes[pid]
    }

    pub fn process_mut(&mut self, pid: Pid) -> &mut Process {
        &mut self.processes[pid]
    }

    pub fn try_ready_enqueue(&mut self, pid: Pid) -> Result<(), QueueFull<Pid>> {
        debug_assert_eq!(
            self.process(pid).state,
            ProcessState::Ready,
            "enqueued pid {pid} must be Ready"
        );
        self.ready.try_enqueue(pid)
    }

    pub fn set_running(&mut self, pid: Pid, cycle: Cycle) {
        debug_assert!(
            self.unit.current.is_none(),
            "execution unit already holds a process"
        );
        self.unit.current = Some(pid);
        let process = self.process_mut(pid);
        process.state = ProcessState::Running;
        process.dispatches += 1;
        if process.first_dispatched_at.is_none() {
            process.first_dispatched_at = Some(cycle);
        }
    }

    /// Preemption path: the process goes back to Ready.
    pub fn mark_ready(&mut self, pid: Pid) {
        self.process_mut(pid).state = ProcessState::Ready;
    }

    pub fn mark_terminated(&mut self, pid: Pid, cycle: Cycle) {
        debug_assert!(
            !self.blocked.contains(&pid),
            "terminating pid {pid} still in the blocked set"
        );
        let process = self.process_mut(pid);
        process.state = ProcessState::Terminated;
        process.terminated_at = Some(cycle);
    }

    /// Move a running process into the blocked set. On overflow the process
    /// is returned untouched for the caller to report and discard.
    pub fn try_block(&mut self, pid: Pid, wait: Cycle, cycle: Cycle) -> Result<(), QueueFull<Pid>> {
        if self.blocked.len() >= self.blocked_capacity {
            return Err(QueueFull(pid));
        }
        let process = self.process_mut(pid);
        process.state = ProcessState::Blocked;
        process.remaining_io = wait;
        process.blocked_at = cycle;
        let at = self.blocked.partition_point(|&p| p < pid);
        self.blocked.insert(at, pid);
        Ok(())
    }

    pub fn unblock(&mut self, pid: Pid) {
        self.blocked.retain(|&p| p != pid);
        self.process_mut(pid).state = ProcessState::Ready;
    }

    pub fn clear_unit(&mut self) {
        self.unit.current = None;
    }

    /// Blocked pids in ascending order.
    pub fn blocked_pids(&self) -> &[Pid] {
        &self.blocked
    }

    /// True when nothing is ready, nothing is blocked, and the unit is free.
    pub fn all_idle(&self) -> bool {
        self.ready.is_empty() && self.blocked.is_empty() && self.unit.current.is_none()
    }
}
