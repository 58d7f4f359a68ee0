//! Defines the Denavit-Hartenberg link data structure

pub mod dh_kinematics {
    use crate::solve_error::SolveError;
    use nalgebra::Matrix4;

    /// One link of a serial chain in the standard Denavit-Hartenberg convention.
    /// A chain is an ordered `Vec<DhLink>`, base to tip, one entry per joint.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct DhLink {
        /// Offset along the previous z axis to the common normal.
        pub d: f64,

        /// Fixed rotation about the previous z axis. The variable joint angle
        /// is added on top of this offset when the transform is evaluated.
        pub theta: f64,

        /// Length of the common normal (offset along the rotated x axis).
        /// Often named `a` in textbooks.
        pub r: f64,

        /// Twist: rotation about the common normal, the angle between the
        /// previous and the new z axis.
        pub alpha: f64,
    }

    impl DhLink {
        pub fn new(d: f64, theta: f64, r: f64, alpha: f64) -> Self {
            DhLink { d, theta, r, alpha }
        }

        /// Homogeneous transform of this link for the given joint rotation.
        ///
        /// Builds a fresh matrix on every call so the link itself stays immutable
        /// and chains can be evaluated from multiple threads without locking.
        pub fn transform(&self, joint_angle: f64) -> Matrix4<f64> {
            let ct = (self.theta + joint_angle).cos();
            let st = (self.theta + joint_angle).sin();
            let ca = self.alpha.cos();
            let sa = self.alpha.sin();

            Matrix4::new(
                ct, -st * ca, st * sa, self.r * ct,
                st, ct * ca, -ct * sa, self.r * st,
                0.0, sa, ca, self.d,
                0.0, 0.0, 0.0, 1.0,
            )
        }
    }

    /// Tip transform of a chain: the left-to-right product of all link transforms,
    /// starting from identity. Fails when the angle count does not match the
    /// number of links.
    pub fn chain_transform(links: &[DhLink], joints: &[f64]) -> Result<Matrix4<f64>, SolveError> {
        if links.len() != joints.len() {
            return Err(SolveError::LengthMismatch {
                what: "joints",
                expected: links.len(),
                found: joints.len(),
            });
        }
        Ok(links
            .iter()
            .zip(joints.iter())
            .fold(Matrix4::identity(), |tip, (link, &angle)| tip * link.transform(angle)))
    }
}
