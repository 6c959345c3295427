//! Solve dispatch pool.
//!
//! Recognition must not block the caller while the planner searches, so
//! solve jobs run on a small, bounded, thread-based pool. Each job carries
//! its own derived problem and a reply sender; a reply whose receiver is
//! gone (abandoned request) is silently discarded, so no late completion
//! ever writes into freed request state.

use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::debug;

use crate::error::{ExecutionError, PlanrecError, PlanrecResult};
use crate::problem::Problem;
use crate::solver::Planner;

/// Which of the two derived problems a completion belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    /// The observation-compliant problem.
    Compliant,
    /// The unconstrained baseline problem.
    NotCompliant,
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compliant => write!(f, "compliant"),
            Self::NotCompliant => write!(f, "not-compliant"),
        }
    }
}

/// Completion notification for one branch: the recorded plan cost
/// (infinite when unsolvable).
#[derive(Debug, Clone, Copy)]
pub(crate) struct BranchCompletion {
    pub branch: Branch,
    pub cost: f64,
}

pub(crate) struct SolveJob {
    pub branch: Branch,
    pub problem: Problem,
    pub planner: Arc<dyn Planner>,
    pub reply: Sender<PlanrecResult<BranchCompletion>>,
}

pub(crate) struct SolvePool {
    tx: Sender<SolveJob>,
    workers: Vec<JoinHandle<()>>,
    queue_capacity: usize,
}

impl SolvePool {
    pub(crate) fn start(workers: usize, queue_capacity: usize) -> Self {
        let workers = workers.max(1);
        let queue_capacity = queue_capacity.max(1);
        let (tx, rx) = bounded::<SolveJob>(queue_capacity);

        let mut handles = Vec::with_capacity(workers);
        for idx in 0..workers {
            let rx: Receiver<SolveJob> = rx.clone();
            let thread_name = format!("planrec-solve-{idx}");
            let handle = thread::Builder::new()
                .name(thread_name)
                .spawn(move || {
                    while let Ok(job) = rx.recv() {
                        let result = job.planner.solve(&job.problem).map(|outcome| {
                            debug!(
                                branch = %job.branch,
                                tag = job.problem.tag(),
                                cost = outcome.cost(),
                                "solve completed"
                            );
                            BranchCompletion {
                                branch: job.branch,
                                cost: outcome.cost(),
                            }
                        });
                        // A failed send means the request was abandoned;
                        // the late result is discarded.
                        let _ = job.reply.send(result);
                    }
                })
                .expect("failed to spawn planrec solve worker");
            handles.push(handle);
        }

        Self {
            tx,
            workers: handles,
            queue_capacity,
        }
    }

    pub(crate) fn try_submit(&self, job: SolveJob) -> PlanrecResult<()> {
        match self.tx.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(PlanrecError::Execution(ExecutionError::QueueFull {
                capacity: self.queue_capacity,
            })),
            Err(TrySendError::Disconnected(_)) => {
                Err(PlanrecError::Execution(ExecutionError::Disconnected))
            }
        }
    }
}

impl Drop for SolvePool {
    fn drop(&mut self) {
        // Deterministic shutdown: close the channel so workers drain queued
        // jobs and exit, then join the threads.
        let (dummy, _) = bounded::<SolveJob>(1);
        drop(std::mem::replace(&mut self.tx, dummy));
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}
