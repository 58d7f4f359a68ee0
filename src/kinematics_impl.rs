//! Forward and inverse kinematics over a Denavit-Hartenberg chain.

use crate::constraints::Constraints;
use crate::kinematic_traits::{Kinematics, Pose};
use crate::objective::{CentralDifference, CostGradient, IkProblem};
use crate::parameters::dh_kinematics::{DhLink, chain_transform};
use crate::solve_error::SolveError;
use crate::solver::{IkSolution, LbfgsbSolver, SolverConfig};
use nalgebra::{Matrix4, Rotation3, Translation3, UnitQuaternion};

/// A serial chain of rotary joints described by Denavit-Hartenberg links,
/// with per joint angle limits and a numerical inverse kinematics solver.
///
/// The struct is cheap to keep around and safe to share between threads; each
/// solve builds its own optimizer state.
pub struct DhKinematics {
    links: Vec<DhLink>,
    constraints: Constraints,
    config: SolverConfig,
    gradient: Box<dyn CostGradient>,
}

impl DhKinematics {
    /// Creates a chain without joint limits.
    pub fn new(links: Vec<DhLink>) -> Result<Self, SolveError> {
        let dof = links.len();
        Self::new_with_constraints(links, Constraints::unbounded(dof))
    }

    /// Creates a chain with the given joint limits.
    pub fn new_with_constraints(
        links: Vec<DhLink>,
        constraints: Constraints,
    ) -> Result<Self, SolveError> {
        Self::new_with_config(links, constraints, SolverConfig::default())
    }

    /// Creates a chain with the given joint limits and solver settings.
    pub fn new_with_config(
        links: Vec<DhLink>,
        constraints: Constraints,
        config: SolverConfig,
    ) -> Result<Self, SolveError> {
        if links.is_empty() {
            return Err(SolveError::EmptyChain);
        }
        constraints.validate()?;
        if constraints.dof() != links.len() {
            return Err(SolveError::LengthMismatch {
                what: "joint limits",
                expected: links.len(),
                found: constraints.dof(),
            });
        }
        Ok(DhKinematics {
            links,
            constraints,
            config,
            gradient: Box::new(CentralDifference::default()),
        })
    }

    /// Swaps the finite difference gradient for another strategy, for example
    /// [`crate::jacobian::GeometricJacobian`].
    pub fn with_gradient(mut self, gradient: Box<dyn CostGradient>) -> Self {
        self.gradient = gradient;
        self
    }

    pub fn links(&self) -> &[DhLink] {
        &self.links
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Tip transform of the chain as a full homogeneous matrix.
    pub fn forward_homogeneous(&self, joints: &[f64]) -> Result<Matrix4<f64>, SolveError> {
        chain_transform(&self.links, joints)
    }

    /// Solves towards a raw 4x4 homogeneous target, starting from `initial`.
    /// Only the translation column of the target is pursued.
    pub fn inverse_homogeneous(
        &self,
        target: &Matrix4<f64>,
        initial: &[f64],
    ) -> Result<IkSolution, SolveError> {
        let problem = IkProblem::new(
            &self.links,
            *target,
            &self.constraints,
            self.gradient.as_ref(),
        );
        LbfgsbSolver::new(self.config.clone()).minimize(problem, initial)
    }

    /// Chain description in the same YAML schema `read_chain_from_yaml`
    /// accepts, angles in radians. For quick viewing and round trips. Joints
    /// without any finite limit have no `limits` entry; a one sided range
    /// keeps its open side as `.inf` / `-.inf`.
    pub fn to_yaml(&self) -> String {
        let mut out = String::from("dh_chain:\n  angles: radians\n  links:\n");
        for (link, (from, to)) in self
            .links
            .iter()
            .zip(self.constraints.from.iter().zip(&self.constraints.to))
        {
            if from.is_finite() || to.is_finite() {
                out.push_str(&format!(
                    "    - {{ d: {}, theta: {}, r: {}, alpha: {}, limits: [{}, {}] }}\n",
                    link.d,
                    link.theta,
                    link.r,
                    link.alpha,
                    yaml_bound(*from),
                    yaml_bound(*to)
                ));
            } else {
                out.push_str(&format!(
                    "    - {{ d: {}, theta: {}, r: {}, alpha: {} }}\n",
                    link.d, link.theta, link.r, link.alpha
                ));
            }
        }
        out
    }
}

// serde_yaml reads `.inf` / `-.inf`; the Display form "inf" does not parse
// back as a float.
fn yaml_bound(value: f64) -> String {
    if value == f64::INFINITY {
        ".inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-.inf".to_string()
    } else {
        format!("{}", value)
    }
}

impl Kinematics for DhKinematics {
    fn forward(&self, joints: &[f64]) -> Result<Pose, SolveError> {
        let transform = self.forward_homogeneous(joints)?;
        let rotation =
            Rotation3::from_matrix_unchecked(transform.fixed_view::<3, 3>(0, 0).into_owned());
        let translation =
            Translation3::new(transform[(0, 3)], transform[(1, 3)], transform[(2, 3)]);
        Ok(Pose::from_parts(
            translation,
            UnitQuaternion::from_rotation_matrix(&rotation),
        ))
    }

    fn inverse(&self, target: &Pose) -> Result<IkSolution, SolveError> {
        self.inverse_continuing(target, &self.constraints.center())
    }

    fn inverse_continuing(&self, target: &Pose, initial: &[f64]) -> Result<IkSolution, SolveError> {
        self.inverse_homogeneous(&target.to_homogeneous(), initial)
    }

    fn dof(&self) -> usize {
        self.links.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jacobian::GeometricJacobian;
    use crate::parameters_robots::dh_kinematics::{
        planar_two_link, planar_two_link_limits, puma560, puma560_limits,
    };

    #[test]
    fn test_empty_chain_rejected() {
        assert!(matches!(
            DhKinematics::new(Vec::new()),
            Err(SolveError::EmptyChain)
        ));
    }

    #[test]
    fn test_limit_count_must_match_links() {
        let result = DhKinematics::new_with_constraints(
            planar_two_link(),
            Constraints::unbounded(3),
        );
        assert!(matches!(
            result,
            Err(SolveError::LengthMismatch { what: "joint limits", expected: 2, found: 3 })
        ));
    }

    #[test]
    fn test_forward_checks_joint_count() {
        let kinematics = DhKinematics::new(planar_two_link()).unwrap();
        assert!(kinematics.forward(&[0.0]).is_err());
        assert!(kinematics.forward(&[0.0, 0.0]).is_ok());
    }

    #[test]
    fn test_forward_pose_of_stretched_planar_arm() {
        let kinematics = DhKinematics::new(planar_two_link()).unwrap();
        let pose = kinematics.forward(&[0.0, 0.0]).unwrap();
        assert!((pose.translation.vector.x - 2.0).abs() < 1e-12);
        assert!(pose.translation.vector.y.abs() < 1e-12);
        assert!(pose.translation.vector.z.abs() < 1e-12);
        assert!(pose.rotation.angle() < 1e-12);
    }

    #[test]
    fn test_planar_inverse_from_limit_center() {
        let kinematics =
            DhKinematics::new_with_constraints(planar_two_link(), planar_two_link_limits())
                .unwrap();
        let wanted = kinematics.forward(&[0.5, 0.5]).unwrap();

        let solution = kinematics.inverse(&wanted).unwrap();
        assert!(solution.converged, "{}", solution);
        assert!(kinematics.constraints().compliant(&solution.joints));

        let reached = kinematics.forward(&solution.joints).unwrap();
        let miss = (reached.translation.vector - wanted.translation.vector).norm();
        assert!(miss <= 1e-4, "tip missed the target by {}", miss);
    }

    #[test]
    fn test_puma_inverse_recovers_perturbed_pose() {
        let kinematics =
            DhKinematics::new_with_constraints(puma560(), puma560_limits()).unwrap();
        let reference = [0.3, -0.4, 0.25, 0.5, -0.3, 0.2];
        let wanted = kinematics.forward(&reference).unwrap();

        let start = [0.45, -0.25, 0.1, 0.6, -0.2, 0.1];
        let solution = kinematics.inverse_continuing(&wanted, &start).unwrap();
        assert!(solution.converged, "{}", solution);
        assert!(kinematics.constraints().compliant(&solution.joints));
        assert!(solution.residual <= 1e-4);

        let reached = kinematics.forward(&solution.joints).unwrap();
        let miss = (reached.translation.vector - wanted.translation.vector).norm();
        assert!(miss <= 1e-3, "tip missed the target by {}", miss);
    }

    #[test]
    fn test_analytic_gradient_solves_too() {
        let kinematics = DhKinematics::new_with_constraints(
            planar_two_link(),
            planar_two_link_limits(),
        )
        .unwrap()
        .with_gradient(Box::new(GeometricJacobian::default()));
        let wanted = kinematics.forward(&[0.8, -0.4]).unwrap();

        let solution = kinematics.inverse_continuing(&wanted, &[0.3, 0.3]).unwrap();
        assert!(solution.converged, "{}", solution);
        assert!(solution.residual <= 1e-4);
    }

    #[test]
    fn test_solution_is_a_fixed_point() {
        let kinematics =
            DhKinematics::new_with_constraints(planar_two_link(), planar_two_link_limits())
                .unwrap();
        let wanted = kinematics.forward(&[0.5, 0.5]).unwrap();
        let first = kinematics.inverse(&wanted).unwrap();
        let again = kinematics
            .inverse_continuing(&wanted, &first.joints)
            .unwrap();
        assert!(again.converged);
        assert_eq!(again.iterations, 0);
        assert_eq!(again.joints, first.joints);
    }

    #[test]
    fn test_yaml_quick_view() {
        let kinematics =
            DhKinematics::new_with_constraints(planar_two_link(), planar_two_link_limits())
                .unwrap();
        let yaml = kinematics.to_yaml();
        assert!(yaml.starts_with("dh_chain:"));
        assert!(yaml.contains("angles: radians"));
        assert!(yaml.contains("r: 1"));
        assert!(yaml.contains("limits: ["));

        let unbounded = DhKinematics::new(planar_two_link()).unwrap();
        assert!(!unbounded.to_yaml().contains("limits"));
    }
}
