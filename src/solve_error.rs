//! Error handling for chain construction and solving

/// Unified error to report failures during chain construction, forward kinematics
/// and inverse kinematics solving.
///
/// Non-convergence is not an error. A solve that stops at the iteration cap or
/// breaks off far from the target still returns the best joint angles found,
/// flagged with `converged == false` on the solution.
#[derive(Debug)]
pub enum SolveError {
    /// The chain has no links.
    EmptyChain,
    /// An input sequence does not match the number of links (or another expected count).
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// A joint limit pair with `from > to`.
    InvertedBounds { joint: usize, from: f64, to: f64 },
    /// A joint limit that is NaN. Unbounded joints are expressed with infinities.
    NonFiniteBound { joint: usize },
    /// A multi start solve was asked to run with no starting points at all.
    NoStartingPoints,
    /// Solver or gradient configuration that cannot be used (non-positive tolerance etc).
    Configuration(String),
    /// NaN or infinity produced while evaluating the objective or by the optimizer.
    NumericalFailure(String),
}

impl SolveError {
    /// True for errors caused by malformed input, as opposed to numerical breakdown.
    pub fn is_invalid_argument(&self) -> bool {
        !matches!(self, SolveError::NumericalFailure(_))
    }
}

impl std::fmt::Display for SolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            SolveError::EmptyChain =>
                write!(f, "Empty chain: at least one link is required"),
            SolveError::LengthMismatch { what, expected, found } =>
                write!(f, "Invalid length of {}: expected {}, found {}", what, expected, found),
            SolveError::InvertedBounds { joint, from, to } =>
                write!(f, "Inverted bounds for joint {}: from {} > to {}", joint, from, to),
            SolveError::NonFiniteBound { joint } =>
                write!(f, "Bound for joint {} is NaN", joint),
            SolveError::NoStartingPoints =>
                write!(f, "No starting points: at least one initial guess is required"),
            SolveError::Configuration(ref msg) =>
                write!(f, "Configuration Error: {}", msg),
            SolveError::NumericalFailure(ref msg) =>
                write!(f, "Numerical Failure: {}", msg),
        }
    }
}

impl std::error::Error for SolveError {}
