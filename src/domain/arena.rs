use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::element::Node;

/// Arena slot: an element plus its links in the model tree.
#[derive(Debug)]
pub struct TreeNode {
    /// Architecture element stored in this slot
    pub node: Node,
    /// Index of parent node in the arena, None for the workspace root
    pub parent: Option<Index>,
    /// Indices of child nodes in declaration order
    pub children: Vec<Index>,
}

/// Arena-based storage for the element tree being built.
///
/// Handles stay valid while elements are added elsewhere in the tree, which
/// lets the evaluation stack hold plain [`Index`] values. Removing a subtree
/// invalidates its handles through the arena's generation counter.
#[derive(Debug, Default)]
pub struct ModelArena {
    arena: Arena<TreeNode>,
    root: Option<Index>,
}

impl ModelArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `node` under `parent`; a parentless node becomes the root.
    #[instrument(level = "trace", skip(self, node))]
    pub fn insert_node(&mut self, node: Node, parent: Option<Index>) -> Index {
        let slot = TreeNode {
            node,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(slot);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        node_idx
    }

    /// Removes `idx` and all of its descendants, detaching it from its parent.
    ///
    /// Returns the number of removed nodes.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_subtree(&mut self, idx: Index) -> usize {
        let parent = match self.arena.get(idx) {
            Some(slot) => slot.parent,
            None => return 0,
        };
        if let Some(parent) = parent.and_then(|p| self.arena.get_mut(p)) {
            parent.children.retain(|&child| child != idx);
        }
        if self.root == Some(idx) {
            self.root = None;
        }

        let mut removed = 0;
        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            if let Some(slot) = self.arena.remove(current) {
                stack.extend(slot.children);
                removed += 1;
            }
        }
        removed
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut TreeNode> {
        self.arena.get_mut(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_depth(root)
        } else {
            0
        }
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(slot) = self.get_node(node_idx) {
            1 + slot
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Collects the names of all leaf elements (elements with no children).
    ///
    /// A workspace without elements is its own leaf.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_names(&self) -> Vec<String> {
        let mut leaves = Vec::new();
        if let Some(root) = self.root {
            self.collect_leaves(root, &mut leaves);
        }
        leaves
    }

    fn collect_leaves(&self, node_idx: Index, leaves: &mut Vec<String>) {
        if let Some(slot) = self.get_node(node_idx) {
            if slot.children.is_empty() {
                leaves.push(slot.node.name().to_string());
            } else {
                for &child in &slot.children {
                    self.collect_leaves(child, leaves);
                }
            }
        }
    }
}

/// Pre-order traversal in declaration order.
///
/// Handles whose slot was freed by [`ModelArena::remove_subtree`] are
/// skipped, so a traversal never yields a discarded element.
pub struct TreeIterator<'a> {
    arena: &'a ModelArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a ModelArena) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push(root);
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(slot) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in slot.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, slot));
            }
        }
        None
    }
}

/// Post-order traversal: children before their parent.
///
/// Like [`TreeIterator`], stale handles are skipped instead of ending the walk.
pub struct PostOrderIterator<'a> {
    arena: &'a ModelArena,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a ModelArena) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push((root, false));
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(slot) = self.arena.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in slot.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, slot));
                }
            }
        }
        None
    }
}
