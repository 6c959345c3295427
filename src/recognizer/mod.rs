//! Dual-solve coordination.
//!
//! [`GoalRecognizer::evaluate_likelihoods`] is the entry point for one
//! recognition request: it compiles the observation-compliant and
//! not-compliant problems, runs the reachability pre-check per branch,
//! dispatches each still-viable branch to the solve pool, and returns a
//! [`RecognitionHandle`] immediately. The handle joins the two completions
//! (arrival order irrelevant) and converts the recorded costs into a
//! likelihood pair exactly once, after both branches have reported.

mod runtime;

pub use runtime::Branch;

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::compile::ObservationCompiler;
use crate::error::{ExecutionError, PlanrecResult};
use crate::hypothesis::GoalHypothesis;
use crate::likelihood::{likelihood_pair, Beta, Likelihoods};
use crate::observation::ObservationSequence;
use crate::problem::Problem;
use crate::reachability::{ReachabilityOracle, RelaxedReachability};
use crate::solver::Planner;

use runtime::{BranchCompletion, SolveJob, SolvePool};

/// Unique identifier of one recognition request, for trace correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new random request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Recognizer configuration.
#[derive(Debug, Clone)]
pub struct RecognizerConfig {
    /// Rationality/noise parameter of the likelihood model.
    pub beta: Beta,
    /// Number of solve workers. Two suffice for one request at a time;
    /// raise this when evaluating many hypotheses concurrently.
    pub solver_workers: usize,
    /// Maximum queued solve jobs before submission fails with a typed
    /// backpressure error.
    pub queue_capacity: usize,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            beta: Beta::default(),
            solver_workers: 2,
            queue_capacity: 16,
        }
    }
}

/// Coordinates the two concurrent solves of one recognition request.
pub struct GoalRecognizer {
    config: RecognizerConfig,
    planner: Arc<dyn Planner>,
    reachability: Arc<dyn ReachabilityOracle>,
    pool: SolvePool,
}

impl GoalRecognizer {
    /// Creates a recognizer using the relaxed-reachability pre-check.
    #[must_use]
    pub fn new(planner: Arc<dyn Planner>, config: RecognizerConfig) -> Self {
        Self::with_reachability(planner, Arc::new(RelaxedReachability), config)
    }

    /// Creates a recognizer with a custom reachability oracle.
    #[must_use]
    pub fn with_reachability(
        planner: Arc<dyn Planner>,
        reachability: Arc<dyn ReachabilityOracle>,
        config: RecognizerConfig,
    ) -> Self {
        let pool = SolvePool::start(config.solver_workers, config.queue_capacity);
        Self {
            config,
            planner,
            reachability,
            pool,
        }
    }

    /// Returns the recognizer configuration.
    #[must_use]
    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    /// Evaluates one (hypothesis, observation sequence) pair against the
    /// base domain. Returns immediately after dispatching both solves; the
    /// caller waits on the returned handle for the likelihood pair.
    ///
    /// A branch whose goal fails the reachability pre-check completes
    /// immediately with infinite cost and never reaches the planner; the
    /// sibling branch proceeds independently.
    ///
    /// # Errors
    /// Compilation errors, and backpressure errors when the solve queue is
    /// full.
    pub fn evaluate_likelihoods(
        &self,
        base: &Problem,
        hypothesis: &GoalHypothesis,
        observations: &ObservationSequence,
    ) -> PlanrecResult<RecognitionHandle> {
        let request_id = RequestId::new();
        let created_at = Utc::now();

        let compiled = ObservationCompiler::new(base, hypothesis, observations)?.compile()?;
        debug!(
            %request_id,
            hypothesis = %hypothesis,
            observations = observations.len(),
            "recognition request dispatched"
        );

        let (reply, rx) = bounded::<PlanrecResult<BranchCompletion>>(2);
        let branches = [
            (Branch::Compliant, compiled.compliant),
            (Branch::NotCompliant, compiled.not_compliant),
        ];
        for (branch, problem) in branches {
            if !self.reachability.is_goal_reachable(&problem) {
                debug!(
                    %request_id,
                    %branch,
                    "reachability pre-check certified branch unsolvable"
                );
                // Capacity 2 and one message per branch: this never blocks.
                reply
                    .send(Ok(BranchCompletion {
                        branch,
                        cost: f64::INFINITY,
                    }))
                    .map_err(|_| ExecutionError::Disconnected)?;
                continue;
            }
            self.pool.try_submit(SolveJob {
                branch,
                problem,
                planner: Arc::clone(&self.planner),
                reply: reply.clone(),
            })?;
        }

        Ok(RecognitionHandle {
            request_id,
            created_at,
            beta: self.config.beta,
            rx,
        })
    }
}

/// Handle to one in-flight recognition request.
///
/// Dropping the handle abandons the request: any still-running solve's
/// late completion fails to send and is discarded by the worker.
pub struct RecognitionHandle {
    request_id: RequestId,
    created_at: DateTime<Utc>,
    beta: Beta,
    rx: Receiver<PlanrecResult<BranchCompletion>>,
}

impl RecognitionHandle {
    /// Returns the request's unique id.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns when the request was dispatched.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Waits until both branches have reported, then computes the
    /// likelihood pair.
    ///
    /// # Errors
    /// A solver error from either branch, or a disconnection if the
    /// recognizer was dropped mid-request.
    pub fn join(self) -> PlanrecResult<Likelihoods> {
        self.join_inner(None)
    }

    /// Like [`join`](Self::join), but gives up after `timeout` with a
    /// typed timeout error. Bounding solver latency is caller policy; the
    /// core imposes no deadline of its own.
    pub fn join_timeout(self, timeout: Duration) -> PlanrecResult<Likelihoods> {
        self.join_inner(Some(Instant::now() + timeout))
    }

    /// The "both completion flags set" gate: receives exactly two branch
    /// completions, in whatever order they arrive, then converts costs to
    /// likelihoods exactly once.
    fn join_inner(self, deadline: Option<Instant>) -> PlanrecResult<Likelihoods> {
        let mut compliant_cost: Option<f64> = None;
        let mut not_compliant_cost: Option<f64> = None;

        while compliant_cost.is_none() || not_compliant_cost.is_none() {
            let completion = match deadline {
                None => self
                    .rx
                    .recv()
                    .map_err(|_| ExecutionError::Disconnected)?,
                Some(deadline) => self.rx.recv_deadline(deadline).map_err(|err| match err {
                    RecvTimeoutError::Timeout => {
                        let elapsed = (Utc::now() - self.created_at)
                            .num_milliseconds()
                            .max(0);
                        ExecutionError::Timeout {
                            duration_ms: elapsed as u64,
                        }
                    }
                    RecvTimeoutError::Disconnected => ExecutionError::Disconnected,
                })?,
            }?;

            match completion.branch {
                Branch::Compliant => compliant_cost = Some(completion.cost),
                Branch::NotCompliant => not_compliant_cost = Some(completion.cost),
            }
        }

        let pair = likelihood_pair(
            self.beta,
            compliant_cost.unwrap_or(f64::INFINITY),
            not_compliant_cost.unwrap_or(f64::INFINITY),
        );
        info!(
            request_id = %self.request_id,
            compliant_cost = pair.compliant_cost,
            not_compliant_cost = pair.not_compliant_cost,
            compliant = pair.compliant,
            not_compliant = pair.not_compliant,
            supported = pair.is_supported(),
            "likelihood pair ready"
        );
        Ok(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::thread;

    use crate::compile::{COMPLIANT_TAG, NOT_COMPLIANT_TAG};
    use crate::solver::fixed::FixedOutcomePlanner;
    use crate::solver::SolveOutcome;

    /// Base domain for coordination tests: one pick-up in one room.
    fn base_problem() -> Problem {
        let mut p = Problem::new("base");
        let at = p.add_fluent("(agent-at kitchen)").unwrap();
        let ball_at = p.add_fluent("(item-at ball kitchen)").unwrap();
        let carrying = p.add_fluent("(carrying ball)").unwrap();
        p.add_action(
            "(pick-up ball kitchen)",
            vec![at, ball_at],
            vec![carrying],
            vec![ball_at],
        );
        p.set_initial_state([at, ball_at].into_iter().collect()).unwrap();
        p
    }

    fn request(base: &Problem) -> (GoalHypothesis, ObservationSequence) {
        let carrying = base.fluent_named("(carrying ball)").unwrap();
        let hypothesis = GoalHypothesis::new(base, [carrying]).unwrap();
        let pick_up = base.actions()[0].id();
        let observations = ObservationSequence::new(base, vec![pick_up]).unwrap();
        (hypothesis, observations)
    }

    fn recognizer_with(planner: FixedOutcomePlanner, beta: f64) -> GoalRecognizer {
        GoalRecognizer::new(
            Arc::new(planner),
            RecognizerConfig {
                beta: Beta::new(beta).unwrap(),
                ..RecognizerConfig::default()
            },
        )
    }

    #[test]
    fn test_equal_costs_split_evenly() {
        let base = base_problem();
        let (hypothesis, observations) = request(&base);
        let recognizer = recognizer_with(
            FixedOutcomePlanner::new()
                .with_cost(COMPLIANT_TAG, 1.0)
                .with_cost(NOT_COMPLIANT_TAG, 1.0),
            4.0,
        );

        let pair = recognizer
            .evaluate_likelihoods(&base, &hypothesis, &observations)
            .unwrap()
            .join()
            .unwrap();
        assert!((pair.compliant - 0.5).abs() < 1e-12);
        assert!((pair.not_compliant - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_unsolvable_compliant_branch_gets_zero() {
        let base = base_problem();
        let (hypothesis, observations) = request(&base);
        let recognizer = recognizer_with(
            FixedOutcomePlanner::new()
                .with(COMPLIANT_TAG, SolveOutcome::Unsolvable)
                .with_cost(NOT_COMPLIANT_TAG, 2.0),
            1.0,
        );

        let pair = recognizer
            .evaluate_likelihoods(&base, &hypothesis, &observations)
            .unwrap()
            .join()
            .unwrap();
        assert!((pair.compliant).abs() < f64::EPSILON);
        assert!((pair.not_compliant - 1.0).abs() < f64::EPSILON);
        assert!(pair.is_supported());
    }

    #[test]
    fn test_both_unsolvable_is_unsupported() {
        let base = base_problem();
        let (hypothesis, observations) = request(&base);
        let recognizer = recognizer_with(
            FixedOutcomePlanner::new()
                .with(COMPLIANT_TAG, SolveOutcome::Unsolvable)
                .with(NOT_COMPLIANT_TAG, SolveOutcome::Unsolvable),
            1.0,
        );

        let pair = recognizer
            .evaluate_likelihoods(&base, &hypothesis, &observations)
            .unwrap()
            .join()
            .unwrap();
        assert!(!pair.is_supported());
        assert!((pair.compliant).abs() < f64::EPSILON);
        assert!((pair.not_compliant).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reachability_short_circuit_skips_planner() {
        struct CompliantUnreachable;
        impl ReachabilityOracle for CompliantUnreachable {
            fn is_goal_reachable(&self, problem: &Problem) -> bool {
                problem.tag() != COMPLIANT_TAG
            }
        }

        let base = base_problem();
        let (hypothesis, observations) = request(&base);
        // Only the not-compliant branch is scripted: if the compliant
        // branch reached the planner, join would fail with an
        // unscripted-tag error instead of returning a pair.
        let recognizer = GoalRecognizer::with_reachability(
            Arc::new(FixedOutcomePlanner::new().with_cost(NOT_COMPLIANT_TAG, 3.0)),
            Arc::new(CompliantUnreachable),
            RecognizerConfig::default(),
        );

        let pair = recognizer
            .evaluate_likelihoods(&base, &hypothesis, &observations)
            .unwrap()
            .join()
            .unwrap();
        assert!(pair.compliant_cost.is_infinite());
        assert!((pair.not_compliant - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_evaluate_does_not_block_on_slow_solver() {
        struct SlowPlanner;
        impl Planner for SlowPlanner {
            fn solve(&self, _problem: &Problem) -> PlanrecResult<SolveOutcome> {
                thread::sleep(Duration::from_millis(150));
                Ok(SolveOutcome::Solved {
                    cost: 1.0,
                    plan: vec![],
                })
            }
        }

        let base = base_problem();
        let (hypothesis, observations) = request(&base);
        let recognizer = GoalRecognizer::new(
            Arc::new(SlowPlanner),
            RecognizerConfig::default(),
        );

        let started = Instant::now();
        let handle = recognizer
            .evaluate_likelihoods(&base, &hypothesis, &observations)
            .unwrap();
        assert!(
            started.elapsed() < Duration::from_millis(100),
            "dispatch must not wait for the solver"
        );

        let pair = handle.join().unwrap();
        assert!((pair.compliant - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_join_timeout_reports_timeout() {
        struct StuckPlanner;
        impl Planner for StuckPlanner {
            fn solve(&self, _problem: &Problem) -> PlanrecResult<SolveOutcome> {
                thread::sleep(Duration::from_millis(400));
                Ok(SolveOutcome::Unsolvable)
            }
        }

        let base = base_problem();
        let (hypothesis, observations) = request(&base);
        let recognizer = GoalRecognizer::new(
            Arc::new(StuckPlanner),
            RecognizerConfig::default(),
        );

        let handle = recognizer
            .evaluate_likelihoods(&base, &hypothesis, &observations)
            .unwrap();
        let err = handle.join_timeout(Duration::from_millis(20)).unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_join_reports_disconnected_when_reply_sender_dropped() {
        let (_tx, rx) = bounded::<PlanrecResult<BranchCompletion>>(2);
        drop(_tx);

        let handle = RecognitionHandle {
            request_id: RequestId::new(),
            created_at: Utc::now(),
            beta: Beta::default(),
            rx,
        };

        let err = handle.join().unwrap_err();
        assert!(err.is_execution());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_abandoned_request_discards_late_results() {
        let base = base_problem();
        let (hypothesis, observations) = request(&base);
        let recognizer = recognizer_with(
            FixedOutcomePlanner::new()
                .with_cost(COMPLIANT_TAG, 1.0)
                .with_cost(NOT_COMPLIANT_TAG, 1.0),
            1.0,
        );

        let handle = recognizer
            .evaluate_likelihoods(&base, &hypothesis, &observations)
            .unwrap();
        drop(handle);
        // Dropping the recognizer drains the pool; neither late completion
        // may panic on its dead reply channel.
        drop(recognizer);
    }

    #[test]
    fn test_determinism_across_repeated_requests() {
        let base = base_problem();
        let (hypothesis, observations) = request(&base);
        let recognizer = recognizer_with(
            FixedOutcomePlanner::new()
                .with_cost(COMPLIANT_TAG, 2.0)
                .with_cost(NOT_COMPLIANT_TAG, 5.0),
            0.8,
        );

        let first = recognizer
            .evaluate_likelihoods(&base, &hypothesis, &observations)
            .unwrap()
            .join()
            .unwrap();
        let second = recognizer
            .evaluate_likelihoods(&base, &hypothesis, &observations)
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(first, second);
    }
}
