use crate::core::dispatcher::Dispatcher;
use crate::core::event::{EventKind, EventLog, QueueKind, SimEvent};
use crate::core::observer::Observer;
use crate::core::state::{Cycle, KernelCtx, Process};
use crate::program::loader::{self, CreationSchedule};

#[derive(Debug, Clone, Copy)]
pub struct SimParams {
    /// Max instructions per dispatch before forced preemption.
    pub quantum: u32,
    /// Bound on both the ready queue and the blocked set.
    pub capacity: usize,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            quantum: 2,
            capacity: 100,
        }
    }
}

/// Drives one cycle after another in fixed phase order: clock tick, admission
/// of newly due processes, one dispatch, then the I/O completion pass.
pub struct Sim {
    pub ctx: KernelCtx,
    dispatcher: Dispatcher,
    schedule: CreationSchedule,
    log: EventLog,
    observer: Observer,
}

impl Sim {
    pub fn new(schedule: CreationSchedule, params: SimParams) -> Self {
        Self {
            ctx: KernelCtx::new(params.capacity),
            dispatcher: Dispatcher::new(params.quantum),
            schedule,
            log: EventLog::new(),
            observer: Observer::new(),
        }
    }

    /// Run one cycle and return its events.
    pub fn step(&mut self) -> Vec<SimEvent> {
        let cycle = self.ctx.clock.tick();
        self.admit_due(cycle);
        self.dispatcher.dispatch_one(&mut self.ctx, cycle, &mut self.log);
        self.dispatcher
            .advance_blocked(&mut self.ctx, cycle, &mut self.log);
        self.observer.observe(&self.ctx);
        self.log.drain()
    }

    /// Create every process scheduled for this cycle and queue it Ready.
    /// One file failing to load or parse skips that file only; a full ready
    /// queue drops the process and says so.
    fn admit_due(&mut self, cycle: Cycle) {
        let due: Vec<_> = self.schedule.due(cycle).to_vec();
        for path in due {
            let image = match loader::load_program(&path) {
                Ok(image) => image,
                Err(err) => {
                    self.log.record(
                        cycle,
                        EventKind::AdmissionFailed {
                            file: path.display().to_string(),
                            reason: err.to_string(),
                        },
                    );
                    continue;
                }
            };

            let pid = self
                .ctx
                .create_process(image.name.clone(), image.instructions, cycle);
            self.log.record(
                cycle,
                EventKind::Admitted {
                    pid,
                    name: image.name,
                },
            );
            for (line, err) in image.warnings {
                self.log.record(
                    cycle,
                    EventKind::BadInstruction {
                        pid,
                        line,
                        reason: err.to_string(),
                    },
                );
            }

            if self.ctx.try_ready_enqueue(pid).is_err() {
                self.log.record(
                    cycle,
                    EventKind::Dropped {
                        pid,
                        queue: QueueKind::Ready,
                    },
                );
                self.ctx.mark_terminated(pid, cycle);
            }
        }
    }

    /// Nothing queued, nothing blocked, nothing running, and no admissions
    /// still scheduled: the run has nothing left to do.
    pub fn settled(&self) -> bool {
        self.ctx.all_idle() && !self.schedule.pending_at_or_after(self.ctx.clock.upcoming())
    }

    /// Run until natural termination or `max_cycles`, whichever comes first,
    /// and return the whole event log.
    pub fn run(&mut self, max_cycles: u64) -> Vec<SimEvent> {
        let mut events = Vec::new();
        for _ in 0..max_cycles {
            if self.settled() {
                break;
            }
            events.extend(self.step());
        }
        events
    }

    pub fn processes(&self) -> &[Process] {
        &self.ctx.processes
    }
}
