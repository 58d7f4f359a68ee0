//! Bound-constrained L-BFGS driver for the inverse kinematics search

use crate::kinematic_traits::Joints;
use crate::objective::IkProblem;
use crate::solve_error::SolveError;
use argmin::core::observers::{Observe, ObserverMode};
use argmin::core::{Error, Executor, KV, State};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::LBFGS;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{debug, trace};

/// Configuration of the bounded solver.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Iteration cap. Reaching it yields the best-found angles with
    /// `converged` judged by the residual, never an error.
    pub max_iters: u64,

    /// Termination tolerance on the gradient norm.
    pub tolerance_grad: f64,

    /// Termination tolerance on the cost decrease between iterations.
    pub tolerance_cost: f64,

    /// Number of corrections kept for the inverse Hessian approximation.
    pub memory: usize,

    /// Tip distance, in chain length units, below which a solution counts
    /// as converged.
    pub position_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            max_iters: 1000,
            tolerance_grad: 1e-8,
            tolerance_cost: 1e-12,
            memory: 7,
            position_tolerance: 1e-4,
        }
    }
}

/// Outcome of one inverse kinematics solve.
///
/// The joint angles are always the best point visited, inside the bounds.
/// `converged` tells whether they actually reach the target; a `false` value
/// is advisory, the angles are still the closest approach found.
#[derive(Debug, Clone)]
pub struct IkSolution {
    pub joints: Joints,

    /// Tip distance from the target at `joints`.
    pub residual: f64,

    /// Tip distance at the (clamped) initial guess, before any iteration.
    pub initial_residual: f64,

    /// True when `residual <= position_tolerance`.
    pub converged: bool,

    pub iterations: u64,
    pub cost_evaluations: usize,
    pub gradient_evaluations: usize,
}

impl fmt::Display for IkSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IkSolution(residual={:.6}, converged={}, iterations={}, cost_evals={}, gradient_evals={})",
            self.residual,
            self.converged,
            self.iterations,
            self.cost_evaluations,
            self.gradient_evaluations
        )
    }
}

#[derive(Clone)]
struct BestVisited {
    iteration: u64,
    cost: f64,
    param: Vec<f64>,
}

/// Records the best state after every iteration. When the line search breaks
/// off mid-run the executor returns an error and drops its state; this keeps
/// the best point reachable so the solve can still report it.
struct BestSeen {
    snapshot: Arc<Mutex<Option<BestVisited>>>,
}

impl<I> Observe<I> for BestSeen
where
    I: State<Param = Vec<f64>, Float = f64>,
{
    fn observe_iter(&mut self, state: &I, _kv: &KV) -> Result<(), Error> {
        if let Some(best) = state.get_best_param() {
            trace!(
                "iteration {}: best cost {}",
                state.get_iter(),
                state.get_best_cost()
            );
            if let Ok(mut guard) = self.snapshot.lock() {
                *guard = Some(BestVisited {
                    iteration: state.get_iter(),
                    cost: state.get_best_cost(),
                    param: best.clone(),
                });
            }
        }
        Ok(())
    }
}

/// L-BFGS with hard boundary clamping: the objective clamps every probe into
/// the bounds and projects the gradient at active bounds, the final angles are
/// clamped once more. One instance per solve.
pub struct LbfgsbSolver {
    config: SolverConfig,
}

impl LbfgsbSolver {
    pub fn new(config: SolverConfig) -> Self {
        LbfgsbSolver { config }
    }

    /// Minimizes the tip distance of `problem` starting from `initial`.
    ///
    /// Never fails on non-convergence; errors mean malformed input or a
    /// non-finite objective.
    pub fn minimize(&self, problem: IkProblem, initial: &[f64]) -> Result<IkSolution, SolveError> {
        if initial.len() != problem.dof() {
            return Err(SolveError::LengthMismatch {
                what: "initial_joint_angles",
                expected: problem.dof(),
                found: initial.len(),
            });
        }
        if self.config.memory == 0 {
            return Err(SolveError::Configuration(
                "memory must be at least 1".to_string(),
            ));
        }
        if !(self.config.position_tolerance >= 0.0) {
            return Err(SolveError::Configuration(format!(
                "position_tolerance must be non-negative, got {}",
                self.config.position_tolerance
            )));
        }

        let constraints = problem.constraints();
        let counts = problem.counts();
        let init_clamped = constraints.clamp(initial);

        let initial_residual = problem.residual(&init_clamped)?;
        if !initial_residual.is_finite() {
            return Err(SolveError::NumericalFailure(format!(
                "cost at the initial guess is not finite: {initial_residual}"
            )));
        }

        // Nothing to do when the start already reaches the target. This also
        // keeps re-solving from a solution an exact no-op.
        if initial_residual <= self.config.position_tolerance {
            debug!("initial guess already within tolerance, residual {initial_residual}");
            return self.finish(init_clamped, initial_residual, initial_residual, 0, 0, 0);
        }

        let linesearch = MoreThuenteLineSearch::new();
        let solver = LBFGS::new(linesearch, self.config.memory)
            .with_tolerance_grad(self.config.tolerance_grad)
            .map_err(|e| SolveError::Configuration(format!("tolerance_grad: {e}")))?
            .with_tolerance_cost(self.config.tolerance_cost)
            .map_err(|e| SolveError::Configuration(format!("tolerance_cost: {e}")))?;

        let snapshot = Arc::new(Mutex::new(None));
        let observer = BestSeen { snapshot: Arc::clone(&snapshot) };

        let max_iters = self.config.max_iters;
        let run = Executor::new(problem, solver)
            .configure(|state| state.param(init_clamped.clone()).max_iters(max_iters))
            .add_observer(observer, ObserverMode::Always)
            .run();

        match run {
            Ok(res) => {
                let state = res.state();
                let (cost_evaluations, gradient_evaluations) = counts.snapshot();
                let (joints, residual) = match state.get_best_param() {
                    Some(best) => (constraints.clamp(best), state.get_best_cost()),
                    None => (init_clamped, initial_residual),
                };
                let iterations = state.get_iter();
                debug!(
                    "terminated after {iterations} iterations: {}",
                    state.get_termination_status()
                );
                self.finish(
                    joints,
                    residual,
                    initial_residual,
                    iterations,
                    cost_evaluations,
                    gradient_evaluations,
                )
            }
            Err(err) => {
                // The distance cost loses smoothness next to an exactly
                // reachable target and More-Thuente can give up there. The
                // best point seen is still the answer; without any recorded
                // point the clamped initial guess is.
                debug!("optimizer stopped early: {err}");
                let (cost_evaluations, gradient_evaluations) = counts.snapshot();
                let best = snapshot.lock().ok().and_then(|guard| guard.clone());
                let (joints, residual, iterations) = match best {
                    Some(visited) => (
                        constraints.clamp(&visited.param),
                        visited.cost,
                        visited.iteration,
                    ),
                    None => (init_clamped, initial_residual, 0),
                };
                self.finish(
                    joints,
                    residual,
                    initial_residual,
                    iterations,
                    cost_evaluations,
                    gradient_evaluations,
                )
            }
        }
    }

    fn finish(
        &self,
        joints: Joints,
        residual: f64,
        initial_residual: f64,
        iterations: u64,
        cost_evaluations: usize,
        gradient_evaluations: usize,
    ) -> Result<IkSolution, SolveError> {
        if !residual.is_finite() || !crate::utils::dh_kinematics::is_valid(&joints) {
            return Err(SolveError::NumericalFailure(format!(
                "solver produced a non-finite result, residual {residual}"
            )));
        }
        let converged = residual <= self.config.position_tolerance;
        debug!("residual {residual} after {iterations} iterations, converged: {converged}");
        Ok(IkSolution {
            joints,
            residual,
            initial_residual,
            converged,
            iterations,
            cost_evaluations,
            gradient_evaluations,
        })
    }
}

impl Default for LbfgsbSolver {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}
