//! Error taxonomy for the check-in planning pipeline.

use thiserror::Error;

/// Everything that can go wrong between reading a flight schedule and
/// reporting the solved KPIs. Each solver status other than optimal maps to
/// its own variant so that callers can tell the cases apart.
#[derive(Debug, Error)]
pub enum AcpError {
    /// Malformed parameter set, flight schedule or check-in window.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The solver proved the model infeasible. The conflicting-constraint
    /// set is surfaced when the backend can compute one.
    #[error("model is infeasible")]
    Infeasible { conflicting: Option<Vec<String>> },

    /// The solver proved the model unbounded.
    #[error("model is unbounded")]
    Unbounded,

    /// The solver could not tell infeasibility and unboundedness apart.
    #[error("model is infeasible or unbounded")]
    InfeasibleOrUnbounded,

    /// The solver gave up on its own time limit; never a partial solution.
    #[error("solver hit its time limit: {0}")]
    SolverTimeout(String),

    /// Any other backend failure.
    #[error("solver failure: {0}")]
    Solver(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
