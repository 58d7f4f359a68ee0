use crate::solve_error::SolveError;
use crate::solver::IkSolution;
use nalgebra::Isometry3;

/// Joint angles in radians, one per link, ordered base to tip.
pub type Joints = Vec<f64>;

/// Pose of the chain tip. It contains both Cartesian position and rotation quaternion.
/// ```
/// use nalgebra::{Isometry3, Translation3, UnitQuaternion};
///
/// type Pose = Isometry3<f64>;
///
/// let translation = Translation3::new(1.0, 0.0, 0.0);
/// let rotation = UnitQuaternion::identity();
/// let pose = Pose::from_parts(translation, rotation);
/// ```
pub type Pose = Isometry3<f64>;

pub trait Kinematics {
    /// Tip pose for the given joint angles.
    fn forward(&self, joints: &[f64]) -> Result<Pose, SolveError>;

    /// Joint angles placing the tip as close as possible to the target position,
    /// starting the search from the neutral guess (the center of the joint
    /// constraints). Only the translation of the target enters the objective.
    fn inverse(&self, target: &Pose) -> Result<IkSolution, SolveError>;

    /// Like `inverse`, but continuing from the given joint angles. When following
    /// a trajectory, the previous solution is the natural starting point and
    /// keeps consecutive solutions close to each other.
    fn inverse_continuing(&self, target: &Pose, initial: &[f64])
    -> Result<IkSolution, SolveError>;

    /// Number of joints.
    fn dof(&self) -> usize;
}
