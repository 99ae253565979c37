//! Evaluation-level errors (wraps the diagnostics of a build)

use thiserror::Error;

use crate::eval::diagnostics::Diagnostics;

/// Errors surfaced to the host once a build is over.
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("build failed with {count} diagnostic(s):\n{diagnostics}")]
    Build {
        count: usize,
        diagnostics: Diagnostics,
    },

    #[error("no workspace was declared")]
    NoWorkspace,

    #[error("config error: {message}")]
    Config { message: String },
}

impl EvalError {
    pub fn build(diagnostics: Diagnostics) -> Self {
        Self::Build {
            count: diagnostics.len(),
            diagnostics,
        }
    }

    /// Diagnostics carried by a failed build.
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            EvalError::Build { diagnostics, .. } => Some(diagnostics),
            EvalError::NoWorkspace | EvalError::Config { .. } => None,
        }
    }
}

/// Result type for evaluation outcomes.
pub type EvalResult<T> = Result<T, EvalError>;
