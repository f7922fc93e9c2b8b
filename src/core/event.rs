use std::fmt;

use crate::core::state::{Cycle, Pid};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
    Ready,
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Admitted {
        pid: Pid,
        name: String,
    },
    AdmissionFailed {
        file: String,
        reason: String,
    },
    /// A malformed instruction found at load time, kept as a no-op compute.
    BadInstruction {
        pid: Pid,
        line: usize,
        reason: String,
    },
    Dispatched {
        pid: Pid,
    },
    Computed {
        pid: Pid,
        ordinal: u32,
    },
    IoIssued {
        pid: Pid,
        ordinal: u32,
        wait: Cycle,
    },
    /// Quantum expired with instructions remaining; back to the ready tail.
    Preempted {
        pid: Pid,
    },
    IoComplete {
        pid: Pid,
    },
    Terminated {
        pid: Pid,
        implicit: bool,
    },
    /// No process was ready and the unit stayed free.
    Idle,
    /// Capacity overflow: the process is discarded, an explicit data loss.
    Dropped {
        pid: Pid,
        queue: QueueKind,
    },
}

/// One line of the simulation's output log. `seq` is globally monotonic and
/// breaks ties between events of the same cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimEvent {
    pub seq: u64,
    pub cycle: Cycle,
    pub kind: EventKind,
}

impl fmt::Display for SimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:05}] cycle {:>4}  ", self.seq, self.cycle)?;
        match &self.kind {
            EventKind::Admitted { pid, name } => {
                write!(f, "ADMIT    pid {pid} ({name}) -> ready")
            }
            EventKind::AdmissionFailed { file, reason } => {
                write!(f, "ADMIT-ERR {file}: {reason}")
            }
            EventKind::BadInstruction { pid, line, reason } => {
                write!(f, "DECODE-ERR pid {pid} line {line}: {reason} (kept as no-op)")
            }
            EventKind::Dispatched { pid } => write!(f, "DISPATCH pid {pid} -> running"),
            EventKind::Computed { pid, ordinal } => {
                write!(f, "EXEC     pid {pid} instr {ordinal} I")
            }
            EventKind::IoIssued { pid, ordinal, wait } => {
                write!(f, "EXEC     pid {pid} instr {ordinal} ES {wait} -> blocked")
            }
            EventKind::Preempted { pid } => {
                write!(f, "PREEMPT  pid {pid} quantum expired -> ready tail")
            }
            EventKind::IoComplete { pid } => write!(f, "IO-DONE  pid {pid} -> ready tail"),
            EventKind::Terminated { pid, implicit } => {
                if *implicit {
                    write!(f, "TERM     pid {pid} (end of program)")
                } else {
                    write!(f, "TERM     pid {pid} F")
                }
            }
            EventKind::Idle => write!(f, "IDLE     no process ready"),
            EventKind::Dropped { pid, queue } => {
                let which = match queue {
                    QueueKind::Ready => "ready queue",
                    QueueKind::Blocked => "blocked set",
                };
                write!(f, "DROP     pid {pid} {which} full, process lost")
            }
        }
    }
}

/// Accumulates events for the cycle in flight; the sequence counter lives
/// for the whole run so ordering survives the per-cycle drain.
#[derive(Debug, Default)]
pub struct EventLog {
    seq: u64,
    events: Vec<SimEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, cycle: Cycle, kind: EventKind) {
        self.events.push(SimEvent {
            seq: self.seq,
            cycle,
            kind,
        });
        self.seq += 1;
    }

    /// Hand the cycle's events to the caller, leaving the log empty.
    pub fn drain(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}
