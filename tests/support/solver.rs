use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Mutex;
use std::time::Duration;

use polyedge::adapter::outbound::solver::BranchBoundSolver;
use polyedge::domain::constraint::Constraint;
use polyedge::domain::outcome::PartialOutcome;
use polyedge::port::{FeasibilityResult, LpProblem, LpSolution, Solver};

/// Branch-and-bound solver that stalls on every feasibility call.
///
/// The first call signals `entered` so a test knows an analysis is in flight.
pub struct SlowSolver {
    inner: BranchBoundSolver,
    delay: Duration,
    entered: Mutex<Option<mpsc::Sender<()>>>,
}

impl SlowSolver {
    pub fn new(delay: Duration) -> (Self, mpsc::Receiver<()>) {
        let (tx, rx) = mpsc::channel();
        let solver = Self {
            inner: BranchBoundSolver::with_timeout(Duration::from_secs(5)),
            delay,
            entered: Mutex::new(Some(tx)),
        };
        (solver, rx)
    }
}

impl Solver for SlowSolver {
    fn name(&self) -> &'static str {
        "slow"
    }

    fn find_feasible(
        &self,
        dimension: usize,
        constraints: &[Constraint],
        fixed: &PartialOutcome,
    ) -> FeasibilityResult {
        if let Some(tx) = self.entered.lock().expect("lock entered").take() {
            let _ = tx.send(());
        }
        std::thread::sleep(self.delay);
        self.inner.find_feasible(dimension, constraints, fixed)
    }

    fn minimize_linear(&self, problem: &LpProblem) -> LpSolution {
        self.inner.minimize_linear(problem)
    }
}

/// Solver that never finishes a feasibility search in time.
pub struct TimeoutSolver;

impl Solver for TimeoutSolver {
    fn name(&self) -> &'static str {
        "timeout"
    }

    fn find_feasible(
        &self,
        _dimension: usize,
        _constraints: &[Constraint],
        _fixed: &PartialOutcome,
    ) -> FeasibilityResult {
        FeasibilityResult::Timeout
    }

    fn minimize_linear(&self, problem: &LpProblem) -> LpSolution {
        BranchBoundSolver::with_timeout(Duration::from_secs(5)).minimize_linear(problem)
    }
}

/// Branch-and-bound solver whose first feasibility call panics.
#[derive(Default)]
pub struct PanicOnceSolver {
    inner: BranchBoundSolver,
    tripped: AtomicBool,
}

impl Solver for PanicOnceSolver {
    fn name(&self) -> &'static str {
        "panic-once"
    }

    fn find_feasible(
        &self,
        dimension: usize,
        constraints: &[Constraint],
        fixed: &PartialOutcome,
    ) -> FeasibilityResult {
        if !self.tripped.swap(true, Ordering::SeqCst) {
            panic!("solver failure");
        }
        self.inner.find_feasible(dimension, constraints, fixed)
    }

    fn minimize_linear(&self, problem: &LpProblem) -> LpSolution {
        self.inner.minimize_linear(problem)
    }
}
