//! Command line inverse kinematics for a chain described in YAML.

use anyhow::Context;
use clap::{Parser, Subcommand};
use nalgebra::Matrix4;
use rs_dh_kinematics::kinematic_traits::Kinematics;
use rs_dh_kinematics::parameters_from_file::read_chain_from_yaml;
use rs_dh_kinematics::utils::to_degrees;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about = "Numerical inverse kinematics for arms described by DH parameters")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read a chain description and print it back, normalized to radians
    Show {
        /// Path to the YAML chain description
        chain: PathBuf,
    },
    /// Solve for the joint angles placing the tip at a target position
    Solve {
        /// Path to the YAML chain description
        chain: PathBuf,

        /// Target tip x, in the length units of the chain
        #[arg(short = 'x', allow_hyphen_values = true)]
        x: f64,

        /// Target tip y
        #[arg(short = 'y', allow_hyphen_values = true)]
        y: f64,

        /// Target tip z
        #[arg(short = 'z', allow_hyphen_values = true)]
        z: f64,

        /// Initial joint angles in radians, comma separated. The center of
        /// the joint limits is used when not given.
        #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
        start: Option<Vec<f64>>,

        /// Print the solved angles in degrees instead of radians
        #[arg(long, default_value_t = false)]
        degrees: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Show { chain } => {
            let kinematics = read_chain_from_yaml(&chain)
                .with_context(|| format!("reading {}", chain.display()))?;
            println!("# {} joints", kinematics.dof());
            print!("{}", kinematics.to_yaml());
        }
        Command::Solve {
            chain,
            x,
            y,
            z,
            start,
            degrees,
        } => {
            let kinematics = read_chain_from_yaml(&chain)
                .with_context(|| format!("reading {}", chain.display()))?;
            let mut target = Matrix4::identity();
            target[(0, 3)] = x;
            target[(1, 3)] = y;
            target[(2, 3)] = z;

            let initial = start.unwrap_or_else(|| kinematics.constraints().center());
            let solution = kinematics
                .inverse_homogeneous(&target, &initial)
                .context("solving")?;

            eprintln!("{}", solution);
            if !solution.converged {
                eprintln!("warning: target not reached, printing the closest approach");
            }
            if degrees {
                for angle in to_degrees(&solution.joints) {
                    println!("{angle:.6}");
                }
            } else {
                for angle in &solution.joints {
                    println!("{angle:.9}");
                }
            }
        }
    }
    Ok(())
}
