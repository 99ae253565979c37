/*
Rendering of a model arena as a termtree, one line per element.
Kept outside the arena so the domain layer does not depend on termtree.
 */
use generational_arena::Index;
use termtree::Tree;

use crate::domain::{Location, ModelArena, Node};

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for ModelArena {
    fn to_tree_string(&self) -> Tree<String> {
        if let Some(root_idx) = self.root() {
            fn build_tree(arena: &ModelArena, node_idx: Index) -> Tree<String> {
                let Some(slot) = arena.get_node(node_idx) else {
                    return Tree::new("<removed>".to_string());
                };
                let leaves: Vec<_> = slot
                    .children
                    .iter()
                    .map(|&child| build_tree(arena, child))
                    .collect();
                Tree::new(label(&slot.node)).with_leaves(leaves)
            }

            build_tree(self, root_idx)
        } else {
            Tree::new("Empty model".to_string())
        }
    }
}

/// One-line summary: kind, name and the decorations that are set.
pub fn label(node: &Node) -> String {
    let mut label = node.to_string();
    if let Node::Workspace(ws) = node {
        if let Some(version) = &ws.version {
            label.push_str(&format!(" v{version}"));
        }
        if let Some(enterprise) = &ws.enterprise {
            label.push_str(&format!(" enterprise={:?}", enterprise.name));
        }
    }
    match node.location() {
        Location::External => label.push_str(" [external]"),
        Location::Internal => label.push_str(" [internal]"),
        Location::Unspecified => {}
    }
    if let Some(data) = node.element_data() {
        if !data.tags.is_empty() {
            label.push_str(&format!(" tags={}", data.tags_joined()));
        }
    }
    if let Some(url) = node.url() {
        label.push_str(&format!(" url={url}"));
    }
    if let Some(properties) = node.properties() {
        label.push_str(&format!(" properties={}", properties.len()));
    }
    label
}
