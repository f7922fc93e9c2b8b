use crate::core::event::{EventKind, EventLog, QueueKind};
use crate::core::state::{Cycle, KernelCtx, Pid, ProcessState};
use crate::program::InstructionKind;

/// The scheduling core. Per cycle it places at most one ready process on the
/// execution unit, runs it for up to a quantum of instructions, and routes it
/// onward: ready tail on preemption, blocked set on I/O, nowhere on
/// termination. A separate pass counts down every blocked process's wait.
#[derive(Debug)]
pub struct Dispatcher {
    quantum: u32,
}

/// Where a dispatch left the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DispatchOutcome {
    Preempted,
    Blocked,
    Terminated,
}

impl Dispatcher {
    pub fn new(quantum: u32) -> Self {
        assert!(quantum >= 1, "quantum must be at least 1");
        Self { quantum }
    }

    /// One scheduling decision for the cycle. An empty ready queue is a
    /// logged no-op, never an error.
    pub fn dispatch_one(&self, ctx: &mut KernelCtx, cycle: Cycle, log: &mut EventLog) {
        let pid = match ctx.ready.try_dequeue() {
            Some(pid) => pid,
            None => {
                log.record(cycle, EventKind::Idle);
                return;
            }
        };

        ctx.set_running(pid, cycle);
        log.record(cycle, EventKind::Dispatched { pid });

        let outcome = self.run_quantum(ctx, pid, cycle, log);

        // Every outcome frees the unit within the same cycle; the process
        // never spans a cycle boundary in the Running state.
        ctx.clear_unit();
        debug_assert!(
            outcome == DispatchOutcome::Terminated
                || ctx.process(pid).state != ProcessState::Running,
            "pid {pid} left running after dispatch"
        );
    }

    fn run_quantum(
        &self,
        ctx: &mut KernelCtx,
        pid: Pid,
        cycle: Cycle,
        log: &mut EventLog,
    ) -> DispatchOutcome {
        let mut executed = 0u32;
        loop {
            let process = ctx.process(pid);
            if process.pc >= process.instructions.len() {
                // Ran off the end without an explicit F.
                ctx.mark_terminated(pid, cycle);
                log.record(
                    cycle,
                    EventKind::Terminated {
                        pid,
                        implicit: true,
                    },
                );
                return DispatchOutcome::Terminated;
            }

            let instr = process.instructions[process.pc];
            // The instruction's own kind is examined before the quantum
            // check below, so I/O wins over expiry at the same decision
            // point.
            match instr.kind {
                InstructionKind::Compute => {
                    ctx.process_mut(pid).pc += 1;
                    executed += 1;
                    log.record(
                        cycle,
                        EventKind::Computed {
                            pid,
                            ordinal: instr.ordinal,
                        },
                    );
                }
                InstructionKind::IoRequest { wait } => {
                    ctx.process_mut(pid).pc += 1;
                    log.record(
                        cycle,
                        EventKind::IoIssued {
                            pid,
                            ordinal: instr.ordinal,
                            wait,
                        },
                    );
                    if ctx.try_block(pid, wait, cycle).is_err() {
                        log.record(
                            cycle,
                            EventKind::Dropped {
                                pid,
                                queue: QueueKind::Blocked,
                            },
                        );
                        ctx.mark_terminated(pid, cycle);
                    }
                    return DispatchOutcome::Blocked;
                }
                InstructionKind::Terminate => {
                    ctx.process_mut(pid).pc += 1;
                    ctx.mark_terminated(pid, cycle);
                    log.record(
                        cycle,
                        EventKind::Terminated {
                            pid,
                            implicit: false,
                        },
                    );
                    return DispatchOutcome::Terminated;
                }
            }

            if executed == self.quantum {
                let process = ctx.process(pid);
                if process.pc >= process.instructions.len() {
                    ctx.mark_terminated(pid, cycle);
                    log.record(
                        cycle,
                        EventKind::Terminated {
                            pid,
                            implicit: true,
                        },
                    );
                    return DispatchOutcome::Terminated;
                }
                ctx.mark_ready(pid);
                log.record(cycle, EventKind::Preempted { pid });
                if ctx.try_ready_enqueue(pid).is_err() {
                    log.record(
                        cycle,
                        EventKind::Dropped {
                            pid,
                            queue: QueueKind::Ready,
                        },
                    );
                    ctx.mark_terminated(pid, cycle);
                }
                return DispatchOutcome::Preempted;
            }
        }
    }

    /// The I/O completion pass. Counts down every blocked process except
    /// those that blocked this very cycle, and promotes finished waits to
    /// the ready tail in ascending pid order.
    pub fn advance_blocked(&self, ctx: &mut KernelCtx, cycle: Cycle, log: &mut EventLog) {
        let mut due = Vec::new();
        for &pid in ctx.blocked_pids() {
            if ctx.process(pid).blocked_at == cycle {
                continue;
            }
            due.push(pid);
        }
        // Two passes: membership first, then mutation, to keep the borrow
        // on the blocked set short.
        due.retain(|&pid| {
            let process = ctx.process_mut(pid);
            process.remaining_io -= 1;
            process.remaining_io == 0
        });
        let promoted = due;

        for pid in promoted {
            ctx.unblock(pid);
            log.record(cycle, EventKind::IoComplete { pid });
            if ctx.try_ready_enqueue(pid).is_err() {
                log.record(
                    cycle,
                    EventKind::Dropped {
                        pid,
                        queue: QueueKind::Ready,
                    },
                );
                ctx.mark_terminated(pid, cycle);
            }
        }
    }
}
