//! Build entry points and the published result of a build.

use std::fmt;

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::config::Settings;
use crate::domain::{ElementKind, ModelArena, Node, PostOrderIterator, TreeIterator, WorkspaceData};
use crate::eval::context::Evaluator;
use crate::eval::diagnostics::Diagnostics;
use crate::eval::error::{EvalError, EvalResult};
use crate::tree_traits::TreeNodeConvert;

/// Runs `body` at top level with default settings.
pub fn build<F>(body: F) -> BuildOutput
where
    F: FnOnce(&mut Evaluator),
{
    build_with(Settings::default(), body)
}

/// Runs `body` at top level and collects the published workspace.
#[instrument(level = "debug", skip_all)]
pub fn build_with<F>(settings: Settings, body: F) -> BuildOutput
where
    F: FnOnce(&mut Evaluator),
{
    let mut evaluator = Evaluator::new(settings);
    body(&mut evaluator);
    evaluator.finish()
}

impl Evaluator {
    /// Ends the build, handing out the published workspace and all diagnostics.
    pub fn finish(self) -> BuildOutput {
        let strict = self.settings.strict;
        let design = self
            .published
            .and_then(|root| Design::from_model(self.model, root));
        debug!(
            published = design.is_some(),
            diagnostics = self.diagnostics.len(),
            "build finished"
        );
        BuildOutput {
            design,
            diagnostics: self.diagnostics,
            strict,
        }
    }
}

/// Everything a build produced.
#[derive(Debug)]
pub struct BuildOutput {
    /// Published workspace, if one was declared successfully
    pub design: Option<Design>,
    pub diagnostics: Diagnostics,
    strict: bool,
}

impl BuildOutput {
    /// Converts the output into a pass/fail result.
    ///
    /// In strict mode any diagnostic fails the build; otherwise only a
    /// missing workspace does.
    pub fn into_result(self) -> EvalResult<Design> {
        match self.design {
            Some(design) if !self.strict || self.diagnostics.is_empty() => Ok(design),
            None if self.diagnostics.is_empty() => Err(EvalError::NoWorkspace),
            _ => Err(EvalError::build(self.diagnostics)),
        }
    }
}

/// A finished architecture model rooted at its workspace.
///
/// Only produced by [`Evaluator::finish`], at most once per build.
#[derive(Debug)]
pub struct Design {
    model: ModelArena,
    root: Index,
}

impl Design {
    fn from_model(model: ModelArena, root: Index) -> Option<Self> {
        let is_workspace = model
            .get_node(root)
            .is_some_and(|slot| slot.node.as_workspace().is_some());
        is_workspace.then_some(Self { model, root })
    }

    /// Workspace header; `Some` for every design built by [`Evaluator::finish`].
    pub fn workspace(&self) -> Option<&WorkspaceData> {
        self.node(self.root).and_then(Node::as_workspace)
    }

    pub fn root(&self) -> Index {
        self.root
    }

    pub fn node(&self, idx: Index) -> Option<&Node> {
        self.model.get_node(idx).map(|slot| &slot.node)
    }

    pub fn children(&self, idx: Index) -> &[Index] {
        self.model
            .get_node(idx)
            .map_or(&[], |slot| slot.children.as_slice())
    }

    pub fn parent(&self, idx: Index) -> Option<Index> {
        self.model.get_node(idx).and_then(|slot| slot.parent)
    }

    /// Pre-order traversal starting at the workspace.
    pub fn iter(&self) -> TreeIterator<'_> {
        self.model.iter()
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        self.model.iter_postorder()
    }

    /// First element of `kind` named `name`, in declaration order.
    pub fn find(&self, kind: ElementKind, name: &str) -> Option<Index> {
        self.iter()
            .find(|(_, slot)| slot.node.kind() == kind && slot.node.name() == name)
            .map(|(idx, _)| idx)
    }

    pub fn depth(&self) -> usize {
        self.model.depth()
    }

    pub fn leaf_names(&self) -> Vec<String> {
        self.model.leaf_names()
    }

    /// Number of nodes, the workspace included.
    pub fn len(&self) -> usize {
        self.model.len()
    }

    pub fn is_empty(&self) -> bool {
        self.model.is_empty()
    }

    pub fn model(&self) -> &ModelArena {
        &self.model
    }
}

impl fmt::Display for Design {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.model.to_tree_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_model_requires_workspace_root() {
        let mut model = ModelArena::new();
        let person = Node::element(ElementKind::Person, "p").unwrap();
        let root = model.insert_node(person, None);
        assert!(Design::from_model(model, root).is_none());
    }

    #[test]
    fn test_workspace_header_of_finished_design() {
        let mut model = ModelArena::new();
        let root = model.insert_node(Node::Workspace(WorkspaceData::new("w", "d")), None);
        let design = Design::from_model(model, root).unwrap();
        assert_eq!(design.workspace().map(|ws| ws.name.as_str()), Some("w"));
    }
}
