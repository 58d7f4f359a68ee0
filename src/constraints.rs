use crate::kinematic_traits::Joints;
use crate::solve_error::SolveError;

/// Box bounds on the joint angles, one `[from, to]` pair per joint.
/// The optimizer never evaluates the objective outside these bounds and the
/// solved angles always land inside them. Unbounded joints use infinities.
#[derive(Debug, Clone)]
pub struct Constraints {
    /// Lower limit per joint, radians.
    pub from: Vec<f64>,

    /// Upper limit per joint, radians. Must not be below `from`.
    pub to: Vec<f64>,
}

impl Constraints {
    /// Checked constructor for caller-supplied limits.
    pub fn new(from: Vec<f64>, to: Vec<f64>) -> Result<Self, SolveError> {
        let constraints = Constraints { from, to };
        constraints.validate()?;
        Ok(constraints)
    }

    /// No limits at all: every joint may take any angle.
    pub fn unbounded(dof: usize) -> Self {
        Constraints {
            from: vec![f64::NEG_INFINITY; dof],
            to: vec![f64::INFINITY; dof],
        }
    }

    /// Re-checks the invariants. Fields are public, so imports that fill them
    /// directly go through this before the solver relies on `clamp`.
    pub fn validate(&self) -> Result<(), SolveError> {
        if self.from.len() != self.to.len() {
            return Err(SolveError::LengthMismatch {
                what: "lower_limits",
                expected: self.to.len(),
                found: self.from.len(),
            });
        }
        for (joint, (&from, &to)) in self.from.iter().zip(self.to.iter()).enumerate() {
            if from.is_nan() || to.is_nan() {
                return Err(SolveError::NonFiniteBound { joint });
            }
            if from > to {
                return Err(SolveError::InvertedBounds { joint, from, to });
            }
        }
        Ok(())
    }

    pub fn dof(&self) -> usize {
        self.from.len()
    }

    /// True if every angle lies within its limits, inclusive.
    pub fn compliant(&self, angles: &[f64]) -> bool {
        angles.len() == self.dof()
            && angles
                .iter()
                .zip(self.from.iter().zip(self.to.iter()))
                .all(|(&angle, (&from, &to))| angle >= from && angle <= to)
    }

    /// Projects the angles onto the bounds elementwise. NaN angles stay NaN
    /// and are caught later by the finiteness checks around the objective.
    pub fn clamp(&self, angles: &[f64]) -> Joints {
        angles
            .iter()
            .zip(self.from.iter().zip(self.to.iter()))
            .map(|(&angle, (&from, &to))| angle.clamp(from, to))
            .collect()
    }

    /// Midpoint of each range, the neutral starting guess. Joints without a
    /// finite range get 0.
    pub fn center(&self) -> Joints {
        self.from
            .iter()
            .zip(self.to.iter())
            .map(|(&from, &to)| {
                let mid = 0.5 * (from + to);
                if mid.is_finite() { mid } else { 0.0 }
            })
            .collect()
    }
}
