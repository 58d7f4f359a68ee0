//! The scalar objective driving the inverse kinematics search

use crate::constraints::Constraints;
use crate::kinematic_traits::Joints;
use crate::parameters::dh_kinematics::{DhLink, chain_transform};
use crate::solve_error::SolveError;
use argmin::core::{CostFunction, Error, Gradient};
use nalgebra::{Matrix4, Vector3};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Cartesian position of the chain tip for the given joint angles.
pub fn tip_position(links: &[DhLink], joints: &[f64]) -> Result<Vector3<f64>, SolveError> {
    let tip = chain_transform(links, joints)?;
    Ok(Vector3::new(tip[(0, 3)], tip[(1, 3)], tip[(2, 3)]))
}

/// Euclidean distance between the chain tip and the target position.
/// This is the cost the solver minimizes.
pub fn distance_to_target(
    links: &[DhLink],
    target: &Vector3<f64>,
    joints: &[f64],
) -> Result<f64, SolveError> {
    Ok((tip_position(links, joints)? - target).norm())
}

/// How the gradient of the tip distance is estimated. The solver only sees this
/// interface, so swapping the estimator does not touch the solver invocation.
pub trait CostGradient: Send + Sync {
    fn gradient(
        &self,
        links: &[DhLink],
        target: &Vector3<f64>,
        joints: &[f64],
    ) -> Result<Joints, SolveError>;
}

/// Central finite differences with a step scaled to the angle magnitude.
/// The default estimator; two cost evaluations per joint.
pub struct CentralDifference {
    /// Relative differentiation step. The absolute step for joint i is
    /// `step * max(|angle_i|, 1)`.
    pub step: f64,
}

impl Default for CentralDifference {
    fn default() -> Self {
        CentralDifference { step: 1e-8 }
    }
}

impl CostGradient for CentralDifference {
    fn gradient(
        &self,
        links: &[DhLink],
        target: &Vector3<f64>,
        joints: &[f64],
    ) -> Result<Joints, SolveError> {
        if !(self.step > 0.0 && self.step.is_finite()) {
            return Err(SolveError::Configuration(format!(
                "finite difference step must be positive and finite, got {}",
                self.step
            )));
        }
        let mut gradient = vec![0.0; joints.len()];
        for i in 0..joints.len() {
            let eps = self.step * joints[i].abs().max(1.0);

            let mut plus = joints.to_vec();
            plus[i] += eps;
            let f_plus = distance_to_target(links, target, &plus)?;

            let mut minus = joints.to_vec();
            minus[i] -= eps;
            let f_minus = distance_to_target(links, target, &minus)?;

            if !f_plus.is_finite() || !f_minus.is_finite() {
                return Err(SolveError::NumericalFailure(format!(
                    "finite difference for joint {} produced a non-finite cost",
                    i
                )));
            }
            gradient[i] = (f_plus - f_minus) / (2.0 * eps);
        }
        Ok(gradient)
    }
}

#[derive(Default)]
pub(crate) struct FuncCounts {
    cost: AtomicUsize,
    grad: AtomicUsize,
}

impl FuncCounts {
    pub(crate) fn snapshot(&self) -> (usize, usize) {
        (
            self.cost.load(Ordering::Relaxed),
            self.grad.load(Ordering::Relaxed),
        )
    }
}

/// One inverse kinematics problem: the chain, the target and the joint bounds,
/// valid for the duration of a single solve.
///
/// The full 4x4 target is stored, but only its translation column enters the
/// cost. Position-only goals are the intended use; an orientation term could be
/// added here without changing any caller.
///
/// Parameters are clamped into the bounds before every evaluation and the
/// gradient is projected at active bounds, so the objective is never probed
/// outside the feasible box.
pub struct IkProblem<'a> {
    links: &'a [DhLink],
    target: Matrix4<f64>,
    constraints: &'a Constraints,
    gradient: &'a dyn CostGradient,
    counts: Arc<FuncCounts>,
}

impl<'a> IkProblem<'a> {
    pub fn new(
        links: &'a [DhLink],
        target: Matrix4<f64>,
        constraints: &'a Constraints,
        gradient: &'a dyn CostGradient,
    ) -> Self {
        IkProblem {
            links,
            target,
            constraints,
            gradient,
            counts: Arc::new(FuncCounts::default()),
        }
    }

    pub fn dof(&self) -> usize {
        self.links.len()
    }

    pub fn target_position(&self) -> Vector3<f64> {
        Vector3::new(self.target[(0, 3)], self.target[(1, 3)], self.target[(2, 3)])
    }

    /// Distance from the tip to the target at the given angles, without
    /// clamping and without touching the evaluation counters.
    pub fn residual(&self, joints: &[f64]) -> Result<f64, SolveError> {
        distance_to_target(self.links, &self.target_position(), joints)
    }

    /// The joint bounds this problem clamps into. The reference outlives the
    /// problem, which is handed over to the executor by value.
    pub fn constraints(&self) -> &'a Constraints {
        self.constraints
    }

    pub(crate) fn counts(&self) -> Arc<FuncCounts> {
        Arc::clone(&self.counts)
    }

    #[cfg(test)]
    pub(crate) fn evaluation_counts(&self) -> (usize, usize) {
        self.counts.snapshot()
    }
}

impl CostFunction for IkProblem<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, params: &Self::Param) -> Result<Self::Output, Error> {
        self.counts.cost.fetch_add(1, Ordering::Relaxed);
        let clamped = self.constraints.clamp(params);
        let cost = distance_to_target(self.links, &self.target_position(), &clamped)?;
        if !cost.is_finite() {
            return Err(Error::msg(format!("cost is not finite: {}", cost)));
        }
        Ok(cost)
    }
}

impl Gradient for IkProblem<'_> {
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(&self, params: &Self::Param) -> Result<Self::Gradient, Error> {
        self.counts.grad.fetch_add(1, Ordering::Relaxed);
        let clamped = self.constraints.clamp(params);
        let mut gradient = self
            .gradient
            .gradient(self.links, &self.target_position(), &clamped)
            .map_err(|e| Error::msg(e.to_string()))?;

        // At an active bound, a component pushing further outside is zeroed.
        // The line search then stays within the box instead of probing the
        // flat clamped region.
        const EPS: f64 = 1e-12;
        for (i, &angle) in clamped.iter().enumerate() {
            if angle <= self.constraints.from[i] + EPS && gradient[i] > 0.0 {
                gradient[i] = 0.0;
            }
            if angle >= self.constraints.to[i] - EPS && gradient[i] < 0.0 {
                gradient[i] = 0.0;
            }
        }
        Ok(gradient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn single_unit_link() -> Vec<DhLink> {
        vec![DhLink::new(0.0, 0.0, 1.0, 0.0)]
    }

    #[test]
    fn test_zero_distance_at_exact_solution() {
        let links = single_unit_link();
        let target = Vector3::new(1.0, 0.0, 0.0);
        assert_eq!(distance_to_target(&links, &target, &[0.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_distance_is_euclidean() {
        let links = single_unit_link();
        // Tip at (0, 1, 0) for a 90 degree rotation, target at origin: distance 1.
        let target = Vector3::new(0.0, 0.0, 0.0);
        let d = distance_to_target(&links, &target, &[PI / 2.0]).unwrap();
        assert!((d - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_wrong_joint_count_is_rejected() {
        let links = single_unit_link();
        let target = Vector3::new(1.0, 0.0, 0.0);
        assert!(matches!(
            distance_to_target(&links, &target, &[0.0, 0.0]),
            Err(SolveError::LengthMismatch { what: "joints", expected: 1, found: 2 })
        ));
    }

    #[test]
    fn test_degenerate_step_is_rejected() {
        let links = single_unit_link();
        let target = Vector3::new(1.0, 0.0, 0.0);
        for step in [0.0, -1e-8, f64::NAN, f64::INFINITY] {
            let fd = CentralDifference { step };
            match fd.gradient(&links, &target, &[0.3]) {
                Err(SolveError::Configuration(_)) => {}
                other => panic!("step {} must be rejected, got {:?}", step, other),
            }
        }
    }

    #[test]
    fn test_cost_clamps_into_bounds() {
        let links = single_unit_link();
        let constraints = Constraints::new(vec![-1.0], vec![1.0]).unwrap();
        let fd = CentralDifference::default();
        let problem = IkProblem::new(&links, Matrix4::identity(), &constraints, &fd);

        let outside = problem.cost(&vec![5.0]).unwrap();
        let at_bound = problem.cost(&vec![1.0]).unwrap();
        assert_eq!(outside, at_bound);
    }

    #[test]
    fn test_gradient_projection_at_active_bound() {
        // Optimal angle would be negative, the lower bound is 0: the gradient
        // at the bound points outward and must be projected to zero.
        let links = single_unit_link();
        let constraints = Constraints::new(vec![0.0], vec![PI]).unwrap();
        let mut target = Matrix4::identity();
        target[(0, 3)] = (-0.5_f64).cos();
        target[(1, 3)] = (-0.5_f64).sin();
        let fd = CentralDifference::default();
        let problem = IkProblem::new(&links, target, &constraints, &fd);

        let gradient = Gradient::gradient(&problem, &vec![0.0]).unwrap();
        assert_eq!(gradient[0], 0.0);
    }

    #[test]
    fn test_central_difference_matches_known_slope() {
        // Single link, target at the origin: cost(angle) = 1 for every angle
        // (the tip moves on the unit circle), so the slope is 0. Against a
        // target on the circle, cost(angle) = 2*|sin((angle - t)/2)|.
        let links = single_unit_link();
        let target = Vector3::new(1.0, 0.0, 0.0);
        let fd = CentralDifference::default();

        let angle = 0.8;
        let gradient = fd.gradient(&links, &target, &[angle]).unwrap();
        let expected = (angle / 2.0).cos() * (angle / 2.0).sin().signum();
        assert!(
            (gradient[0] - expected).abs() < 1e-6,
            "slope {} differs from {}",
            gradient[0],
            expected
        );
    }

    #[test]
    fn test_evaluation_counters() {
        let links = single_unit_link();
        let constraints = Constraints::unbounded(1);
        let fd = CentralDifference::default();
        let problem = IkProblem::new(&links, Matrix4::identity(), &constraints, &fd);

        let _ = problem.cost(&vec![0.1]);
        let _ = problem.cost(&vec![0.2]);
        let _ = Gradient::gradient(&problem, &vec![0.1]);
        assert_eq!(problem.evaluation_counts(), (2, 1));
    }
}
