//! Hardcoded DH chains for a few robots

pub mod dh_kinematics {
    use crate::constraints::Constraints;
    use crate::parameters::dh_kinematics::DhLink;
    use std::f64::consts::{FRAC_PI_2, PI};

    /// Planar arm of two unit-length links rotating in the xy plane.
    /// Fully stretched along x it reaches (2, 0, 0).
    pub fn planar_two_link() -> Vec<DhLink> {
        vec![
            DhLink::new(0.0, 0.0, 1.0, 0.0),
            DhLink::new(0.0, 0.0, 1.0, 0.0),
        ]
    }

    pub fn planar_two_link_limits() -> Constraints {
        Constraints {
            from: vec![-PI, -PI],
            to: vec![PI, PI],
        }
    }

    /// Unimation PUMA 560 in the standard DH convention.
    /// Values as in Corke, Robotics Toolbox (models.DH.Puma560).
    pub fn puma560() -> Vec<DhLink> {
        vec![
            DhLink::new(0.0, 0.0, 0.0, FRAC_PI_2),
            DhLink::new(0.0, 0.0, 0.4318, 0.0),
            DhLink::new(0.15005, 0.0, 0.0203, -FRAC_PI_2),
            DhLink::new(0.4318, 0.0, 0.0, FRAC_PI_2),
            DhLink::new(0.0, 0.0, 0.0, -FRAC_PI_2),
            DhLink::new(0.0, 0.0, 0.0, 0.0),
        ]
    }

    /// PUMA 560 joint limits (same source as the geometry).
    pub fn puma560_limits() -> Constraints {
        Constraints {
            from: vec![
                (-160.0_f64).to_radians(),
                (-45.0_f64).to_radians(),
                (-225.0_f64).to_radians(),
                (-110.0_f64).to_radians(),
                (-100.0_f64).to_radians(),
                (-266.0_f64).to_radians(),
            ],
            to: vec![
                160.0_f64.to_radians(),
                225.0_f64.to_radians(),
                45.0_f64.to_radians(),
                170.0_f64.to_radians(),
                100.0_f64.to_radians(),
                266.0_f64.to_radians(),
            ],
        }
    }
}
