use crate::core::state::{KernelCtx, ProcessState};

/// Debug-build consistency pass over the kernel context, run once per cycle
/// after the I/O monitor. Compiled to nothing in release builds.
#[derive(Debug, Default)]
pub struct Observer {
    cycles_checked: u64,
}

impl Observer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, ctx: &KernelCtx) {
        self.cycles_checked += 1;

        // The unit is freed before every cycle boundary.
        debug_assert!(
            ctx.unit.current.is_none(),
            "execution unit occupied at a cycle boundary"
        );

        for process in &ctx.processes {
            let pid = process.pid;
            debug_assert!(
                process.pc <= process.instructions.len(),
                "pid {pid} pc out of bounds"
            );

            let in_ready = ctx.ready.iter().filter(|&&p| p == pid).count();
            let in_blocked = ctx.blocked_pids().iter().filter(|&&p| p == pid).count();

            match process.state {
                ProcessState::Ready => {
                    debug_assert_eq!(in_ready, 1, "ready pid {pid} not queued exactly once");
                    debug_assert_eq!(in_blocked, 0, "ready pid {pid} also in the blocked set");
                }
                ProcessState::Blocked => {
                    debug_assert_eq!(in_blocked, 1, "blocked pid {pid} not held exactly once");
                    debug_assert_eq!(in_ready, 0, "blocked pid {pid} also in the ready queue");
                    debug_assert!(
                        process.remaining_io > 0,
                        "blocked pid {pid} with no wait left"
                    );
                }
                ProcessState::Running => {
                    debug_assert!(false, "pid {pid} still Running at a cycle boundary");
                }
                ProcessState::Terminated => {
                    debug_assert_eq!(in_ready, 0, "terminated pid {pid} in the ready queue");
                    debug_assert_eq!(in_blocked, 0, "terminated pid {pid} in the blocked set");
                }
            }
        }
    }

    pub fn cycles_checked(&self) -> u64 {
        self.cycles_checked
    }
}
