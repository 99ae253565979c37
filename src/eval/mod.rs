//! Evaluation layer: context stack, attribute dispatch and build results
//!
//! This layer drives DSL bodies against the domain model and records every
//! failure as a diagnostic instead of returning it.

pub mod attributes;
pub mod context;
pub mod design;
pub mod diagnostics;
pub mod elements;
pub mod error;
pub mod workspace;

pub use context::{Context, Evaluator, Scope};
pub use design::{build, build_with, BuildOutput, Design};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{EvalError, EvalResult};
pub use workspace::{Body, DslArg, WorkspaceArgs};
