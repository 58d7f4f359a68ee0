use rs_dh_kinematics::constraints::Constraints;
use rs_dh_kinematics::kinematic_traits::{Joints, Kinematics, Pose};
use rs_dh_kinematics::kinematics_impl::DhKinematics;
use rs_dh_kinematics::parameters::dh_kinematics::DhLink;
use rs_dh_kinematics::parameters_robots::dh_kinematics::{puma560, puma560_limits};
use rs_dh_kinematics::utils::{dump_joints, dump_pose};
use std::f64::consts::PI;

/// Usage example.
fn main() -> anyhow::Result<()> {
    let robot = DhKinematics::new_with_constraints(puma560(), puma560_limits())?;
    let joints: Joints = vec![0.0, -0.4, 0.25, 0.3, -0.2, 0.1]; // Joints are an alias of Vec<f64>
    println!("Reference joints:");
    dump_joints(&joints);

    let pose: Pose = robot.forward(&joints)?; // Pose is an alias of nalgebra::Isometry3<f64>
    println!("Tip pose at the reference joints:");
    dump_pose(&pose);

    println!("Solving for that pose from the center of the joint limits:");
    let solution = robot.inverse(&pose)?;
    println!("{}", solution);
    dump_joints(&solution.joints);

    println!("Solving again, continuing from somewhere close:");
    let when_continuing_from: Joints = vec![0.1, -0.3, 0.2, 0.3, -0.2, 0.1];
    let solution = robot.inverse_continuing(&pose, &when_continuing_from)?;
    println!("{}", solution);
    dump_joints(&solution.joints);

    println!("A planar arm with tight limits keeps the answer inside them:");
    let planar = DhKinematics::new_with_constraints(
        vec![
            DhLink::new(0.0, 0.0, 1.0, 0.0),
            DhLink::new(0.0, 0.0, 1.0, 0.0),
        ],
        Constraints::new(vec![-PI / 2.0, -PI / 2.0], vec![PI / 2.0, PI / 2.0])?,
    )?;
    let reachable = planar.forward(&[0.4, 0.3])?;
    let solution = planar.inverse_continuing(&reachable, &[0.0, 0.0])?;
    println!("{}", solution);
    dump_joints(&solution.joints);

    #[cfg(feature = "parallel")]
    {
        use rs_dh_kinematics::multi_start::solve_multi_start;
        let starts = vec![vec![-1.0, 1.0], vec![0.0, 0.0], vec![1.0, -1.0]];
        let best = solve_multi_start(&planar, &reachable.to_homogeneous(), &starts)?;
        println!("Best of {} starting points: {}", starts.len(), best);
    }

    #[cfg(feature = "allow_filesystem")]
    {
        // This requires the YAML library
        println!("Chain as YAML:\n{}", planar.to_yaml());
    }
    Ok(())
}
