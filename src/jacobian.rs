//! Geometric position Jacobian of a DH chain

use crate::kinematic_traits::Joints;
use crate::objective::CostGradient;
use crate::parameters::dh_kinematics::DhLink;
use crate::solve_error::SolveError;
use nalgebra::{DMatrix, Matrix4, Vector3};

/// 3 x N Jacobian of the tip position with respect to the joint angles.
///
/// The Jacobian maps joint velocities to the linear velocity of the tip. Each
/// column corresponds to one revolute joint: the cross product of the joint
/// axis with the lever arm from the joint origin to the tip.
pub struct PositionJacobian {
    matrix: DMatrix<f64>,
    tip: Vector3<f64>,
}

impl PositionJacobian {
    /// Computes the Jacobian and the tip position in one pass over the chain.
    ///
    /// Walks the cumulative transform from the base: before link i it yields
    /// the axis and origin of joint i, after the last link the tip itself.
    pub fn new(links: &[DhLink], joints: &[f64]) -> Result<Self, SolveError> {
        if links.len() != joints.len() {
            return Err(SolveError::LengthMismatch {
                what: "joints",
                expected: links.len(),
                found: joints.len(),
            });
        }
        let n = links.len();

        let mut axes: Vec<(Vector3<f64>, Vector3<f64>)> = Vec::with_capacity(n);
        let mut current = Matrix4::<f64>::identity();
        for (link, &angle) in links.iter().zip(joints.iter()) {
            let axis = Vector3::new(current[(0, 2)], current[(1, 2)], current[(2, 2)]);
            let origin = Vector3::new(current[(0, 3)], current[(1, 3)], current[(2, 3)]);
            axes.push((axis, origin));
            current *= link.transform(angle);
        }
        let tip = Vector3::new(current[(0, 3)], current[(1, 3)], current[(2, 3)]);

        let mut matrix = DMatrix::zeros(3, n);
        for (i, (axis, origin)) in axes.iter().enumerate() {
            let column = axis.cross(&(tip - origin));
            matrix.fixed_view_mut::<3, 1>(0, i).copy_from(&column);
        }

        Ok(PositionJacobian { matrix, tip })
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Tip position at the configuration the Jacobian was computed for.
    pub fn tip(&self) -> Vector3<f64> {
        self.tip
    }

    /// Linear velocity of the tip for the given joint velocities.
    pub fn tip_velocity(&self, joint_velocities: &[f64]) -> Result<Vector3<f64>, SolveError> {
        if joint_velocities.len() != self.matrix.ncols() {
            return Err(SolveError::LengthMismatch {
                what: "joint_velocities",
                expected: self.matrix.ncols(),
                found: joint_velocities.len(),
            });
        }
        let mut velocity = Vector3::zeros();
        for (i, &qd) in joint_velocities.iter().enumerate() {
            velocity += self.matrix.fixed_view::<3, 1>(0, i) * qd;
        }
        Ok(velocity)
    }
}

/// Analytic gradient of the tip distance built on [PositionJacobian].
///
/// For the residual `r = tip - target` the gradient of `|r|` is `J^T r / |r|`.
/// The distance is not differentiable at `r = 0`, so residuals below the floor
/// report a zero gradient and let the solver stop there.
pub struct GeometricJacobian {
    pub residual_floor: f64,
}

impl Default for GeometricJacobian {
    fn default() -> Self {
        GeometricJacobian { residual_floor: 1e-12 }
    }
}

impl CostGradient for GeometricJacobian {
    fn gradient(
        &self,
        links: &[DhLink],
        target: &Vector3<f64>,
        joints: &[f64],
    ) -> Result<Joints, SolveError> {
        let jacobian = PositionJacobian::new(links, joints)?;
        let residual = jacobian.tip() - target;
        let norm = residual.norm();
        if !norm.is_finite() {
            return Err(SolveError::NumericalFailure(
                "tip position is not finite".to_string(),
            ));
        }
        if norm < self.residual_floor {
            return Ok(vec![0.0; joints.len()]);
        }
        let gradient = jacobian.matrix().transpose() * (residual / norm);
        Ok(gradient.iter().copied().collect())
    }
}
