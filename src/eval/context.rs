//! Evaluation context: the stack of nodes currently being configured.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use generational_arena::Index;
use itertools::Itertools;
use tracing::{instrument, trace};

use crate::config::Settings;
use crate::domain::{DomainError, ModelArena, Node};
use crate::eval::diagnostics::{Diagnostic, Diagnostics};

/// What the next attribute call applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    /// No active frame: only top-level constructors are legal
    Top,
    Element(Index),
}

/// Why a frame was pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Body of an element or workspace constructor
    Element,
    /// Body of a `properties` call, re-entering the same node
    Properties,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    node: Index,
    scope: Scope,
    aborted: bool,
}

/// Drives nested DSL bodies and owns everything a build touches.
///
/// Builder and attribute functions are methods on the evaluator, so every
/// body receives the context explicitly:
///
/// ```
/// use archdsl::eval::build;
///
/// let output = build(|dsl| {
///     dsl.workspace_named("Shop", |dsl| {
///         dsl.software_system("Checkout", |dsl| {
///             dsl.tag("critical", &[]);
///         });
///     });
/// });
/// assert!(output.diagnostics.is_empty());
/// ```
#[derive(Debug)]
pub struct Evaluator {
    pub(crate) settings: Settings,
    pub(crate) model: ModelArena,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) published: Option<Index>,
    stack: Vec<Frame>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl Evaluator {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            model: ModelArena::new(),
            diagnostics: Diagnostics::new(),
            published: None,
            stack: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Node on top of the stack, or [`Context::Top`] outside any body.
    pub fn current(&self) -> Context {
        match self.stack.last() {
            Some(frame) => Context::Element(frame.node),
            None => Context::Top,
        }
    }

    pub fn current_node(&self) -> Option<&Node> {
        let frame = self.stack.last()?;
        self.model.get_node(frame.node).map(|slot| &slot.node)
    }

    pub(crate) fn current_node_mut(&mut self) -> Option<&mut Node> {
        let frame = self.stack.last()?;
        self.model.get_node_mut(frame.node).map(|slot| &mut slot.node)
    }

    pub fn current_scope(&self) -> Option<Scope> {
        self.stack.last().map(|frame| frame.scope)
    }

    /// Number of frames on the stack.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Elements built so far, including the ones still under construction.
    pub fn model(&self) -> &ModelArena {
        &self.model
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Pushes `node`, runs `body` and pops the frame again.
    ///
    /// Returns `false` when the body aborted, panicked or the depth limit
    /// was reached; non-fatal diagnostics recorded by the body do not
    /// change the result.
    #[instrument(level = "debug", skip(self, body))]
    pub fn execute<F>(&mut self, body: F, node: Index) -> bool
    where
        F: FnOnce(&mut Evaluator),
    {
        self.execute_scoped(Scope::Element, node, body)
    }

    pub(crate) fn execute_scoped<F>(&mut self, scope: Scope, node: Index, body: F) -> bool
    where
        F: FnOnce(&mut Evaluator),
    {
        let limit = self.settings.max_depth;
        if self.stack.len() >= limit {
            self.report(DomainError::DepthExceeded { limit });
            return false;
        }

        self.stack.push(Frame {
            node,
            scope,
            aborted: false,
        });
        let height = self.stack.len();
        trace!(height, ?scope, "frame pushed");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(self)));

        // Nested executes pop their own frames, even when unwinding.
        self.stack.truncate(height);
        let completed = match outcome {
            Ok(()) => self.stack.last().is_some_and(|frame| !frame.aborted),
            Err(payload) => {
                self.report(DomainError::Aborted {
                    reason: format!("body panicked: {}", panic_message(payload.as_ref())),
                });
                false
            }
        };
        self.stack.pop();
        trace!(height, completed, "frame popped");
        completed
    }

    /// Stops the construction of the node on top of the stack.
    ///
    /// The enclosing `execute` returns `false` once the body returns, so the
    /// partially built node is discarded by its constructor.
    pub fn abort(&mut self, reason: impl Into<String>) {
        self.report(DomainError::Aborted {
            reason: reason.into(),
        });
        self.mark_aborted();
    }

    pub(crate) fn mark_aborted(&mut self) {
        if let Some(frame) = self.stack.last_mut() {
            frame.aborted = true;
        }
    }

    /// Records `error` against the current evaluation path.
    pub(crate) fn report(&mut self, error: DomainError) {
        let path = self.context_path();
        self.diagnostics.emit(Diagnostic::new(error, path));
    }

    pub(crate) fn report_incompatible(&mut self, operation: &str) {
        let context = self.context_label();
        self.report(DomainError::incompatible(operation, context));
    }

    /// Label of the current node for error messages.
    pub(crate) fn context_label(&self) -> String {
        match (self.current_node(), self.current_scope()) {
            (Some(node), Some(Scope::Properties)) => format!("properties of {node}"),
            (Some(node), _) => node.to_string(),
            (None, _) => "top level".to_string(),
        }
    }

    /// Renders the stack, e.g. `workspace "W" > software system "S"`.
    pub fn context_path(&self) -> String {
        if self.stack.is_empty() {
            return "top level".to_string();
        }
        self.stack
            .iter()
            .map(|frame| match frame.scope {
                Scope::Properties => "properties".to_string(),
                Scope::Element => self
                    .model
                    .get_node(frame.node)
                    .map(|slot| slot.node.to_string())
                    .unwrap_or_else(|| "<removed>".to_string()),
            })
            .join(" > ")
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorKind, WorkspaceData};

    fn with_root() -> (Evaluator, Index) {
        let mut ev = Evaluator::default();
        let root = ev
            .model
            .insert_node(Node::Workspace(WorkspaceData::new("w", "")), None);
        (ev, root)
    }

    #[test]
    fn test_current_is_top_outside_bodies() {
        let ev = Evaluator::default();
        assert_eq!(ev.current(), Context::Top);
        assert!(ev.current_node().is_none());
        assert_eq!(ev.context_path(), "top level");
    }

    #[test]
    fn test_execute_pushes_and_pops() {
        let (mut ev, root) = with_root();
        let mut seen = None;
        let ok = ev.execute(|ev| seen = Some(ev.current()), root);
        assert!(ok);
        assert_eq!(seen, Some(Context::Element(root)));
        assert_eq!(ev.current(), Context::Top);
    }

    #[test]
    fn test_abort_fails_execute_and_pops() {
        let (mut ev, root) = with_root();
        let ok = ev.execute(|ev| ev.abort("stop"), root);
        assert!(!ok);
        assert_eq!(ev.depth(), 0);
        assert_eq!(ev.diagnostics().count(ErrorKind::Aborted), 1);
    }

    #[test]
    fn test_panic_is_caught_and_frame_popped() {
        let (mut ev, root) = with_root();
        let ok = ev.execute(|_| panic!("boom"), root);
        assert!(!ok);
        assert_eq!(ev.current(), Context::Top);
        let diagnostic = ev.diagnostics().iter().next().unwrap();
        assert_eq!(diagnostic.path(), "workspace \"w\"");
        assert!(diagnostic.to_string().contains("body panicked: boom"));
    }

    #[test]
    fn test_depth_limit_skips_body() {
        let (mut ev, root) = with_root();
        ev.settings.max_depth = 1;
        let mut inner_ran = false;
        let ok = ev.execute(
            |ev| {
                inner_ran = !ev.execute(|_| unreachable!(), root);
            },
            root,
        );
        assert!(ok);
        assert!(inner_ran);
        assert_eq!(ev.diagnostics().count(ErrorKind::Aborted), 1);
    }

    #[test]
    fn test_abort_at_top_level_only_reports() {
        let mut ev = Evaluator::default();
        ev.abort("nothing to stop");
        assert_eq!(ev.diagnostics().len(), 1);
        assert_eq!(ev.current(), Context::Top);
    }
}
