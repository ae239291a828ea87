pub mod coloring;
pub mod conflict;
pub mod flow;
pub mod lp;
pub mod numerics;

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColoringError {
    InvalidInput(String),
    SolverFailure(String),
}

impl fmt::Display for ColoringError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColoringError::InvalidInput(message) => write!(f, "invalid input: {message}"),
            ColoringError::SolverFailure(message) => write!(f, "solver failure: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    InvalidInput(String),
    Infeasible,
    Unbounded,
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowError::InvalidInput(message) => write!(f, "invalid input: {message}"),
            FlowError::Infeasible => write!(f, "problem is infeasible"),
            FlowError::Unbounded => write!(f, "problem is unbounded"),
        }
    }
}
