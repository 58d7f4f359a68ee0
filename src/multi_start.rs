//! Parallel multi start solving.
//!
//! The objective is pure and every solve owns its optimizer state, so many
//! starting points can run concurrently. The distance landscape of a serial
//! chain has local minima; restarting from several guesses and keeping the
//! best outcome is the standard remedy.

use crate::kinematic_traits::Kinematics;
use crate::kinematics_impl::DhKinematics;
use crate::solve_error::SolveError;
use crate::solver::IkSolution;
use nalgebra::Matrix4;
use rayon::prelude::*;
use tracing::debug;

/// Solves from every starting point concurrently and returns the best
/// solution. A converged solution beats a non-converged one, then the smaller
/// residual wins, and a tie goes to the earlier starting point, so the result
/// is deterministic for identical inputs.
///
/// Errs only when the inputs are malformed or every solve failed; the first
/// failure is reported then.
pub fn solve_multi_start(
    kinematics: &DhKinematics,
    target: &Matrix4<f64>,
    starts: &[Vec<f64>],
) -> Result<IkSolution, SolveError> {
    if starts.is_empty() {
        return Err(SolveError::NoStartingPoints);
    }
    for start in starts {
        if start.len() != kinematics.dof() {
            return Err(SolveError::LengthMismatch {
                what: "starting_points",
                expected: kinematics.dof(),
                found: start.len(),
            });
        }
    }

    let outcomes: Vec<Result<IkSolution, SolveError>> = starts
        .par_iter()
        .map(|start| kinematics.inverse_homogeneous(target, start))
        .collect();

    let mut best: Option<IkSolution> = None;
    let mut first_error: Option<SolveError> = None;
    for outcome in outcomes {
        match outcome {
            Ok(candidate) => {
                let better = match &best {
                    None => true,
                    Some(current) => {
                        (candidate.converged && !current.converged)
                            || (candidate.converged == current.converged
                                && candidate.residual < current.residual)
                    }
                };
                if better {
                    best = Some(candidate);
                }
            }
            Err(e) => {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    match best {
        Some(solution) => {
            debug!("best of {} starting points: {solution}", starts.len());
            Ok(solution)
        }
        None => Err(first_error.unwrap_or(SolveError::NoStartingPoints)),
    }
}
