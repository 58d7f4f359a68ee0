//! Rust implementation of numerical inverse and forward kinematics for serial
//! robotic arms described by Denavit-Hartenberg parameters
//!
//! Closed form solvers only cover specific geometries. This crate takes the general
//! route instead: the arm is described link by link with the four classic DH parameters,
//! forward kinematics is the ordered product of the per link transforms, and inverse
//! kinematics minimizes the distance between the tip and the target with a bounded
//! quasi-Newton method (L-BFGS with hard clamping into the joint limits).
//!
//! # Features
//!
//! - Any number of rotary joints, not just six; the chain is a plain list of links.
//! - Hard per joint angle limits, respected at every probe of the objective, not only
//!   in the returned result.
//! - A distant or unreachable target is not an error: the result carries the best found
//!   angles together with the achieved residual and a `converged` flag.
//! - Pluggable gradient: central finite differences by default, an analytic geometric
//!   Jacobian as the faster alternative.
//! - Solving again from a returned solution is an exact no-op, so a trajectory can be
//!   tracked by feeding the previous joint positions as the initial guess.
//! - Parallel multi start solving for targets with several basins of attraction
//!   (feature `parallel`).
//! - The chain description can be read from YAML (feature `allow_filesystem`).
//! - A flat buffer entry point (`bridge`) for callers that marshal plain numeric
//!   arrays over a foreign function boundary.
//!
//! # Parameters
//!
//! Each link takes the four classic values (_d, theta, r_ and _alpha_): offset along
//! the previous z axis, rotation offset about it, length along the new x axis and twist
//! about it. The joint variable is added to _theta_. To use the library, build a list of
//! `dh_kinematics::DhLink` values and wrap them in a `DhKinematics`.

pub mod parameters;
pub mod parameters_robots;

#[cfg(feature = "allow_filesystem")]
pub mod parameters_from_file;

#[path = "utils/utils.rs"]
pub mod utils;
pub mod kinematic_traits;
pub mod kinematics_impl;

pub mod constraints;

pub mod jacobian;

pub mod objective;

pub mod solve_error;
pub mod solver;

pub mod bridge;

#[cfg(feature = "allow_filesystem")]
pub mod parameter_error;

#[cfg(feature = "parallel")]
pub mod multi_start;
