//! Error handling for chain extractors

use crate::solve_error::SolveError;
use std::io;

/// Unified error to report failures while reading a chain description.
#[derive(Debug)]
pub enum ParameterError {
    IoError(io::Error),
    ParseError(String),
    WrongAngle(String),
    KinematicsConfigurationError(String),
}

impl std::fmt::Display for ParameterError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            ParameterError::IoError(ref err) =>
                write!(f, "IO Error: {}", err),
            ParameterError::ParseError(ref msg) =>
                write!(f, "Parse Error: {}", msg),
            ParameterError::WrongAngle(ref msg) =>
                write!(f, "Wrong angle representation: {}", msg),
            ParameterError::KinematicsConfigurationError(ref err) =>
                write!(f, "Kinematics Configuration Error: {}", err),
        }
    }
}

impl std::error::Error for ParameterError {}

impl From<io::Error> for ParameterError {
    fn from(err: io::Error) -> Self {
        ParameterError::IoError(err)
    }
}

impl From<serde_yaml::Error> for ParameterError {
    fn from(err: serde_yaml::Error) -> Self {
        ParameterError::ParseError(format!("{}", err))
    }
}

impl From<SolveError> for ParameterError {
    fn from(err: SolveError) -> Self {
        ParameterError::KinematicsConfigurationError(format!("{}", err))
    }
}
