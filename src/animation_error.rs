//! Error handling for the scene graph, camera and configuration loading.
//!
//! None of these errors are fatal for the frame loop. Graph and camera problems are logged
//! and the affected draw or matrix is substituted, stalled phases are forced forward.

use std::io;

/// Unified error for everything that can go wrong while building, animating
/// or configuring the robot.
#[derive(Debug)]
pub enum AnimationError {
    /// A phase has not converged within the allowed number of frames.
    UnreachableTarget { phase: String, frames: u32 },
    /// A child or sibling link of the node points outside the node range,
    /// to an already linked node, or forms a cycle.
    InvalidGraphReference { node: usize, reference: usize },
    /// Camera forward and up vectors are (nearly) parallel or eye equals target.
    DegenerateCameraBasis(String),
    IoError(io::Error),
    ParseError(String),
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for AnimationError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            AnimationError::UnreachableTarget { ref phase, frames } =>
                write!(f, "Unreachable target: phase {} did not converge in {} frames", phase, frames),
            AnimationError::InvalidGraphReference { node, reference } =>
                write!(f, "Invalid graph reference: node {} links to {}", node, reference),
            AnimationError::DegenerateCameraBasis(ref msg) =>
                write!(f, "Degenerate camera basis: {}", msg),
            AnimationError::IoError(ref err) =>
                write!(f, "IO Error: {}", err),
            AnimationError::ParseError(ref msg) =>
                write!(f, "Parse Error: {}", msg),
            AnimationError::InvalidValue { ref field, ref reason } =>
                write!(f, "Invalid value of {}: {}", field, reason),
        }
    }
}

impl std::error::Error for AnimationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnimationError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for AnimationError {
    fn from(err: io::Error) -> Self {
        AnimationError::IoError(err)
    }
}
