//! Strict adapter between flat numeric buffers and the typed solver.
//!
//! Callers integrating over a foreign function boundary hand over plain
//! arrays. Everything is validated and copied into owned structures before
//! any numerics run; unchecked buffers never reach the optimization core.

use crate::constraints::Constraints;
use crate::kinematics_impl::DhKinematics;
use crate::parameters::dh_kinematics::DhLink;
use crate::solve_error::SolveError;
use crate::solver::{IkSolution, SolverConfig};
use nalgebra::Matrix4;

fn expect_len(what: &'static str, expected: usize, found: usize) -> Result<(), SolveError> {
    if expected == found {
        Ok(())
    } else {
        Err(SolveError::LengthMismatch {
            what,
            expected,
            found,
        })
    }
}

/// Builds a validated chain from flat buffers without solving anything.
///
/// `dh_params` holds `[d, theta, r, alpha]` per link, in link order.
pub fn kinematics_from_buffers(
    number_of_links: usize,
    dh_params: &[f64],
    upper_limits: &[f64],
    lower_limits: &[f64],
    config: SolverConfig,
) -> Result<DhKinematics, SolveError> {
    if number_of_links == 0 {
        return Err(SolveError::EmptyChain);
    }
    expect_len("dh_params", 4 * number_of_links, dh_params.len())?;
    expect_len("upper_limits", number_of_links, upper_limits.len())?;
    expect_len("lower_limits", number_of_links, lower_limits.len())?;

    let links: Vec<DhLink> = dh_params
        .chunks_exact(4)
        .map(|link| DhLink::new(link[0], link[1], link[2], link[3]))
        .collect();
    let constraints = Constraints::new(lower_limits.to_vec(), upper_limits.to_vec())?;
    DhKinematics::new_with_config(links, constraints, config)
}

/// Solves inverse kinematics from flat buffers with default solver settings.
///
/// `target` is a row major 4x4 homogeneous transform; only its translation
/// column is pursued. The solved angles are in [`IkSolution::joints`], always
/// within `[lower_limits[i], upper_limits[i]]`.
pub fn solve(
    number_of_links: usize,
    dh_params: &[f64],
    upper_limits: &[f64],
    lower_limits: &[f64],
    initial_joint_angles: &[f64],
    target: &[f64],
) -> Result<IkSolution, SolveError> {
    solve_with_config(
        number_of_links,
        dh_params,
        upper_limits,
        lower_limits,
        initial_joint_angles,
        target,
        SolverConfig::default(),
    )
}

/// Same as [`solve`], with explicit solver settings.
pub fn solve_with_config(
    number_of_links: usize,
    dh_params: &[f64],
    upper_limits: &[f64],
    lower_limits: &[f64],
    initial_joint_angles: &[f64],
    target: &[f64],
    config: SolverConfig,
) -> Result<IkSolution, SolveError> {
    expect_len(
        "initial_joint_angles",
        number_of_links,
        initial_joint_angles.len(),
    )?;
    expect_len("target", 16, target.len())?;

    let kinematics = kinematics_from_buffers(
        number_of_links,
        dh_params,
        upper_limits,
        lower_limits,
        config,
    )?;
    let target = Matrix4::from_row_slice(target);
    kinematics.inverse_homogeneous(&target, initial_joint_angles)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDENTITY_AT_X1: [f64; 16] = [
        1.0, 0.0, 0.0, 1.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ];

    #[test]
    fn test_zero_links_rejected() {
        let result = solve(0, &[], &[], &[], &[], &IDENTITY_AT_X1);
        match result {
            Err(e) => {
                assert!(e.is_invalid_argument());
                assert!(matches!(e, SolveError::EmptyChain));
            }
            Ok(_) => panic!("zero links must not solve"),
        }
    }

    #[test]
    fn test_every_buffer_length_is_checked() {
        let dh = [0.0, 0.0, 1.0, 0.0];
        let ok = [0.0];
        let bad = [0.0, 0.0];

        let cases: [(&str, Result<IkSolution, SolveError>); 5] = [
            (
                "dh_params",
                solve(1, &[0.0; 3], &[1.0], &[-1.0], &ok, &IDENTITY_AT_X1),
            ),
            (
                "upper_limits",
                solve(1, &dh, &[1.0, 1.0], &[-1.0], &ok, &IDENTITY_AT_X1),
            ),
            (
                "lower_limits",
                solve(1, &dh, &[1.0], &[-1.0, -1.0], &ok, &IDENTITY_AT_X1),
            ),
            (
                "initial_joint_angles",
                solve(1, &dh, &[1.0], &[-1.0], &bad, &IDENTITY_AT_X1),
            ),
            ("target", solve(1, &dh, &[1.0], &[-1.0], &ok, &[0.0; 15])),
        ];
        for (name, result) in cases {
            match result {
                Err(SolveError::LengthMismatch { what, .. }) => {
                    assert_eq!(what, name);
                }
                other => panic!("expected length mismatch for {}, got {:?}", name, other),
            }
        }
    }

    #[test]
    fn test_inverted_limits_rejected() {
        let dh = [0.0, 0.0, 1.0, 0.0];
        let result = solve(1, &dh, &[-1.0], &[1.0], &[0.0], &IDENTITY_AT_X1);
        assert!(matches!(
            result,
            Err(SolveError::InvertedBounds { joint: 0, .. })
        ));
    }

    #[test]
    fn test_zero_distance_single_link() {
        let dh = [0.0, 0.0, 1.0, 0.0];
        let solution = solve(1, &dh, &[3.0], &[-3.0], &[0.0], &IDENTITY_AT_X1).unwrap();
        assert!(solution.converged);
        assert_eq!(solution.iterations, 0);
        assert_eq!(solution.residual, 0.0);
        assert_eq!(solution.joints, vec![0.0]);
    }

    #[test]
    fn test_two_link_arm_fully_extended() {
        let dh = [
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 1.0, 0.0,
        ];
        let limits = [std::f64::consts::PI; 2];
        let lower = [-std::f64::consts::PI; 2];
        let target = [
            1.0, 0.0, 0.0, 2.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ];
        let solution = solve(2, &dh, &limits, &lower, &[0.0, 0.0], &target).unwrap();
        assert!(solution.converged);
        assert!(solution.residual <= 1e-4);
        assert!(solution.joints[0].abs() < 1e-6);
        assert!(solution.joints[1].abs() < 1e-6);
    }

    #[test]
    fn test_nan_target_reported_as_numerical_failure() {
        let dh = [0.0, 0.0, 1.0, 0.0];
        let mut target = IDENTITY_AT_X1;
        target[3] = f64::NAN;
        let result = solve(1, &dh, &[3.0], &[-3.0], &[0.5], &target);
        match result {
            Err(e @ SolveError::NumericalFailure(_)) => {
                assert!(!e.is_invalid_argument());
            }
            other => panic!("expected NumericalFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_repeated_solves_are_bit_identical() {
        let dh = [
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 1.0, 0.0,
        ];
        let limits = [std::f64::consts::PI; 2];
        let lower = [-std::f64::consts::PI; 2];
        let target = [
            1.0, 0.0, 0.0, 1.2, //
            0.0, 1.0, 0.0, 0.9, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ];
        let initial = [0.3, 0.3];
        let first = solve(2, &dh, &limits, &lower, &initial, &target).unwrap();
        let second = solve(2, &dh, &limits, &lower, &initial, &target).unwrap();
        assert_eq!(first.joints, second.joints);
        assert_eq!(first.residual, second.residual);
        assert_eq!(first.iterations, second.iterations);
    }
}
