//! Supports extracting the DH chain from a YAML file (optional)

use serde::Deserialize;
use std::path::Path;

use crate::constraints::Constraints;
use crate::kinematics_impl::DhKinematics;
use crate::parameter_error::ParameterError;
use crate::parameters::dh_kinematics::DhLink;

fn default_angles() -> String {
    "radians".to_string()
}

#[derive(Deserialize)]
struct LinkEntry {
    pub d: f64,
    pub theta: f64,
    pub r: f64,
    pub alpha: f64,
    /// Optional `[from, to]` joint limits; an absent pair means unbounded,
    /// `.inf` / `-.inf` leave one side open.
    #[serde(default)]
    pub limits: Option<[f64; 2]>,
}

#[derive(Deserialize)]
struct Chain {
    /// Either `radians` (default) or `degrees`. Applies to `theta`, `alpha`
    /// and the limits; `d` and `r` are lengths and never converted.
    #[serde(default = "default_angles")]
    pub angles: String,
    pub links: Vec<LinkEntry>,
}

#[derive(Deserialize)]
struct Root {
    #[serde(rename = "dh_chain")]
    pub chain: Chain,
}

/// Reads the chain description from a YAML file. A file like this is supported:
/// ```yaml
/// # Planar elbow arm
/// dh_chain:
///   angles: degrees
///   links:
///     - { d: 0.0, theta: 0.0, r: 1.0, alpha: 0.0, limits: [-180.0, 180.0] }
///     - { d: 0.0, theta: 0.0, r: 1.0, alpha: 0.0, limits: [-180.0, 180.0] }
/// ```
/// Limits are optional per link; a link without them is unbounded, and a
/// single open side is written as `.inf` or `-.inf`. The chain comes back
/// with default solver settings.
pub fn read_chain_from_yaml<P: AsRef<Path>>(path: P) -> Result<DhKinematics, ParameterError> {
    let contents = std::fs::read_to_string(path)?;
    chain_from_yaml_str(&contents)
}

/// Same as [`read_chain_from_yaml`], from an already loaded string.
pub fn chain_from_yaml_str(contents: &str) -> Result<DhKinematics, ParameterError> {
    let root: Root = serde_yaml::from_str(contents)?;

    let degrees = match root.chain.angles.as_str() {
        "radians" => false,
        "degrees" => true,
        other => {
            return Err(ParameterError::WrongAngle(format!(
                "angles must be 'radians' or 'degrees', got '{}'",
                other
            )));
        }
    };
    let to_radians = |angle: f64| if degrees { angle.to_radians() } else { angle };

    let mut links = Vec::with_capacity(root.chain.links.len());
    let mut from = Vec::with_capacity(root.chain.links.len());
    let mut to = Vec::with_capacity(root.chain.links.len());
    for entry in &root.chain.links {
        links.push(DhLink::new(
            entry.d,
            to_radians(entry.theta),
            entry.r,
            to_radians(entry.alpha),
        ));
        match entry.limits {
            Some([lo, hi]) => {
                from.push(to_radians(lo));
                to.push(to_radians(hi));
            }
            None => {
                from.push(f64::NEG_INFINITY);
                to.push(f64::INFINITY);
            }
        }
    }

    let constraints = Constraints::new(from, to)?;
    Ok(DhKinematics::new_with_constraints(links, constraints)?)
}
