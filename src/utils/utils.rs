//! Helper functions

use crate::kinematic_traits::{Joints, Pose};

/// Checks angles for validity. This is only internally needed as all returned
/// solutions are already checked.
pub(crate) mod dh_kinematics {

    /// Checks if all elements in the slice are finite
    pub fn is_valid(qs: &[f64]) -> bool {
        qs.iter().all(|&q| q.is_finite())
    }
}

/// Convert a slice of f32's in degrees to Joints
/// that are f64's in radians
pub fn joints(angles: &[f32]) -> Joints {
    angles
        .iter()
        .map(|&angle| (angle as f64).to_radians())
        .collect()
}

/// Convert joints that are f64's in radians to
/// f32's in degrees
pub fn to_degrees(angles: &[f64]) -> Vec<f32> {
    angles
        .iter()
        .map(|&angle| angle.to_degrees() as f32)
        .collect()
}

/// Print joint values, converting radians to degrees.
#[allow(dead_code)]
pub fn dump_joints(joints: &[f64]) {
    let mut row_str = String::new();
    for &joint in joints {
        row_str.push_str(&format!("{:5.2} ", joint.to_degrees()));
    }
    println!("[{}]", row_str.trim_end());
}

pub fn dump_pose(isometry: &Pose) {
    let translation = isometry.translation.vector;
    let rotation = isometry.rotation;

    println!(
        "x: {:.5}, y: {:.5}, z: {:.5},  quat: {:.5},{:.5},{:.5},{:.5}",
        translation.x, translation.y, translation.z, rotation.i, rotation.j, rotation.k, rotation.w
    );
}

/// Allows to specify joint values in degrees (converts to radians)
#[allow(dead_code)]
pub fn as_radians(degrees: &[i32]) -> Joints {
    degrees
        .iter()
        .map(|&deg| (deg as f64).to_radians())
        .collect()
}

pub fn assert_pose_eq(
    ta: &Pose,
    tb: &Pose,
    distance_tolerance: f64,
    angular_tolerance: f64,
) -> bool {
    fn bad(ta: &Pose, tb: &Pose) {
        dump_pose(ta);
        dump_pose(tb);
    }

    let translation_distance = (ta.translation.vector - tb.translation.vector).norm();
    let angular_distance = ta.rotation.angle_to(&tb.rotation);

    if translation_distance.abs() > distance_tolerance {
        bad(ta, tb);
        panic!("Poses have too different translations");
    }

    if angular_distance.abs() > angular_tolerance {
        bad(ta, tb);
        panic!("Poses have too different angles");
    }
    true
}
