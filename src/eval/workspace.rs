//! Workspace constructor: the only top-level DSL call.
//!
//! A workspace is declared in one of three shapes:
//!
//! ```text
//! workspace(body)
//! workspace_named("name", body)
//! workspace_described("name", "description", body)
//! ```
//!
//! [`Evaluator::workspace_with`] accepts the same shapes as a positional
//! argument list and reports argument errors instead of relying on the
//! type checker.

use std::fmt;

use tracing::{info, instrument};

use crate::domain::{DomainError, Node, WorkspaceData};
use crate::eval::context::{Context, Evaluator};

/// Boxed DSL body, used where bodies travel inside argument lists.
pub type Body<'a> = Box<dyn FnOnce(&mut Evaluator) + 'a>;

/// One positional argument of [`Evaluator::workspace_with`].
pub enum DslArg<'a> {
    Text(String),
    Integer(i64),
    Boolean(bool),
    Body(Body<'a>),
}

impl<'a> DslArg<'a> {
    pub fn body<F>(f: F) -> Self
    where
        F: FnOnce(&mut Evaluator) + 'a,
    {
        DslArg::Body(Box::new(f))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            DslArg::Text(_) => "string",
            DslArg::Integer(_) => "integer",
            DslArg::Boolean(_) => "boolean",
            DslArg::Body(_) => "function",
        }
    }
}

impl fmt::Debug for DslArg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DslArg::Text(s) => f.debug_tuple("Text").field(s).finish(),
            DslArg::Integer(n) => f.debug_tuple("Integer").field(n).finish(),
            DslArg::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            DslArg::Body(_) => f.write_str("Body(..)"),
        }
    }
}

impl From<&str> for DslArg<'_> {
    fn from(value: &str) -> Self {
        DslArg::Text(value.to_string())
    }
}

impl From<String> for DslArg<'_> {
    fn from(value: String) -> Self {
        DslArg::Text(value)
    }
}

impl From<i64> for DslArg<'_> {
    fn from(value: i64) -> Self {
        DslArg::Integer(value)
    }
}

impl From<bool> for DslArg<'_> {
    fn from(value: bool) -> Self {
        DslArg::Boolean(value)
    }
}

/// Resolved workspace arguments; omitted strings are empty.
pub struct WorkspaceArgs<F> {
    pub name: String,
    pub description: String,
    pub body: F,
}

impl<F> fmt::Debug for WorkspaceArgs<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkspaceArgs")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<'a> WorkspaceArgs<Body<'a>> {
    /// Resolves `(name?, description?, body)` from a positional list.
    ///
    /// Any error aborts the construction; nothing is evaluated.
    pub fn resolve(mut args: Vec<DslArg<'a>>) -> Result<Self, DomainError> {
        let given = args.len();
        let body = match args.pop() {
            None => return Err(DomainError::missing_body("missing child DSL")),
            Some(DslArg::Body(body)) => body,
            Some(_) => {
                return Err(DomainError::missing_body(
                    "missing child DSL (last argument must be a function)",
                ))
            }
        };
        if given > 3 {
            return Err(DomainError::TooManyArguments { given });
        }

        let mut strings = Vec::with_capacity(args.len());
        for (position, arg) in args.into_iter().enumerate() {
            match arg {
                DslArg::Text(text) => strings.push(text),
                other => {
                    return Err(DomainError::InvalidArgument {
                        position,
                        expected: "string",
                        actual: other.type_name(),
                    })
                }
            }
        }
        let mut strings = strings.into_iter();
        Ok(Self {
            name: strings.next().unwrap_or_default(),
            description: strings.next().unwrap_or_default(),
            body,
        })
    }
}

impl Evaluator {
    /// Declares an unnamed workspace.
    pub fn workspace<F>(&mut self, body: F)
    where
        F: FnOnce(&mut Evaluator),
    {
        self.assemble(WorkspaceArgs {
            name: String::new(),
            description: String::new(),
            body,
        });
    }

    /// Declares a workspace with a name.
    pub fn workspace_named<F>(&mut self, name: &str, body: F)
    where
        F: FnOnce(&mut Evaluator),
    {
        self.assemble(WorkspaceArgs {
            name: name.to_string(),
            description: String::new(),
            body,
        });
    }

    /// Declares a workspace with a name and a description.
    pub fn workspace_described<F>(&mut self, name: &str, description: &str, body: F)
    where
        F: FnOnce(&mut Evaluator),
    {
        self.assemble(WorkspaceArgs {
            name: name.to_string(),
            description: description.to_string(),
            body,
        });
    }

    /// Declares a workspace from a positional argument list.
    ///
    /// Accepts one to three arguments; the last must be a body and the
    /// others strings (name, then description).
    pub fn workspace_with(&mut self, args: Vec<DslArg<'_>>) {
        if self.current() != Context::Top {
            self.report_incompatible("workspace");
            return;
        }
        match WorkspaceArgs::resolve(args) {
            Ok(args) => self.assemble(args),
            Err(err) => self.report(err),
        }
    }

    #[instrument(level = "debug", skip_all, fields(name = %args.name))]
    fn assemble<F>(&mut self, args: WorkspaceArgs<F>)
    where
        F: FnOnce(&mut Evaluator),
    {
        if self.current() != Context::Top {
            self.report_incompatible("workspace");
            return;
        }
        if self.published.is_some() {
            self.report(DomainError::WorkspaceRedefined);
            return;
        }

        let WorkspaceArgs {
            name,
            description,
            body,
        } = args;
        let root = self.model.insert_node(
            Node::Workspace(WorkspaceData::new(name, description)),
            None,
        );
        if self.execute(body, root) {
            self.published = Some(root);
            info!(elements = self.model.len(), "workspace published");
        } else {
            self.model.remove_subtree(root);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;

    #[test]
    fn test_resolve_shapes() {
        let args = WorkspaceArgs::resolve(vec!["N".into(), "D".into(), DslArg::body(|_| {})])
            .unwrap();
        assert_eq!((args.name.as_str(), args.description.as_str()), ("N", "D"));

        let args = WorkspaceArgs::resolve(vec![DslArg::body(|_| {})]).unwrap();
        assert!(args.name.is_empty() && args.description.is_empty());
    }

    #[test]
    fn test_resolve_rejects_non_string_name() {
        let err = WorkspaceArgs::resolve(vec![42i64.into(), DslArg::body(|_| {})]).unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidArgument {
                position: 0,
                expected: "string",
                actual: "integer",
            }
        );
    }

    #[test]
    fn test_resolve_rejects_non_string_description() {
        let err = WorkspaceArgs::resolve(vec!["N".into(), true.into(), DslArg::body(|_| {})])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("position 1"));
    }

    #[test]
    fn test_resolve_checks_body_before_arity() {
        let err = WorkspaceArgs::resolve(vec!["a".into(), "b".into(), "c".into(), "d".into()])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingBody);
    }

    #[test]
    fn test_debug_hides_body() {
        let rendered = format!("{:?}", vec![DslArg::from("N"), DslArg::body(|_| {})]);
        assert_eq!(rendered, "[Text(\"N\"), Body(..)]");
    }
}
