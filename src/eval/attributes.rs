//! Attribute operations: decorate the node on top of the evaluation stack.
//!
//! Each operation asks the current node for the matching capability. When
//! the node's variant does not support it, an incompatible context
//! diagnostic is recorded and the node is left untouched.

use tracing::{debug, trace};

use crate::domain::{validate_url, DomainError, Enterprise, Location};
use crate::eval::context::{Context, Evaluator, Scope};

impl Evaluator {
    /// Appends tags to the current element.
    ///
    /// Every argument is split on `,` and each piece is kept, empty ones
    /// included, so the joined tags read exactly as the comma-joined
    /// arguments. Tags accumulate across calls in call order and are never
    /// deduplicated.
    pub fn tag(&mut self, first: &str, rest: &[&str]) {
        let Some(tags) = self.current_node_mut().and_then(|n| n.tags_mut()) else {
            self.report_incompatible("tag");
            return;
        };
        let before = tags.len();
        tags.extend(
            std::iter::once(first)
                .chain(rest.iter().copied())
                .flat_map(|arg| arg.split(','))
                .map(str::to_string),
        );
        trace!(added = tags.len() - before, "tags appended");
    }

    /// Sets the URL of the current element or health check.
    ///
    /// A malformed URL is reported with its parse failure and the previous
    /// value is kept.
    pub fn url(&mut self, url: &str) {
        let allow_relative = self.settings.allow_relative_urls;
        if self.current_node_mut().and_then(|n| n.url_mut()).is_none() {
            self.report_incompatible("url");
            return;
        }
        if let Err(err) = validate_url(url, allow_relative) {
            self.report(err);
            return;
        }
        if let Some(slot) = self.current_node_mut().and_then(|n| n.url_mut()) {
            *slot = Some(url.to_string());
            debug!(url, "url set");
        }
    }

    /// Marks the current person or software system as external to the enterprise.
    pub fn external(&mut self) {
        self.set_location("external", Location::External);
    }

    /// Marks the current person or software system as internal to the enterprise.
    pub fn internal(&mut self) {
        self.set_location("internal", Location::Internal);
    }

    fn set_location(&mut self, operation: &str, location: Location) {
        match self.current_node_mut().and_then(|n| n.location_mut()) {
            Some(slot) => *slot = location,
            None => self.report_incompatible(operation),
        }
    }

    /// Sets the description of the current element.
    pub fn description(&mut self, text: &str) {
        match self.current_node_mut().and_then(|n| n.description_mut()) {
            Some(slot) => *slot = Some(text.to_string()),
            None => self.report_incompatible("description"),
        }
    }

    /// Opens the property map of the current element and runs `body` on it.
    ///
    /// The map is created on first use. `body` runs with the same node on
    /// top of the stack, so [`Evaluator::prop`] calls inside it fill this
    /// map. An abort inside `body` aborts the element as well.
    pub fn properties<F>(&mut self, body: F)
    where
        F: FnOnce(&mut Evaluator),
    {
        let Context::Element(node) = self.current() else {
            self.report_incompatible("properties");
            return;
        };
        match self.current_node_mut().and_then(|n| n.properties_mut()) {
            Some(map) => {
                map.get_or_insert_with(Default::default);
            }
            None => {
                self.report_incompatible("properties");
                return;
            }
        }
        if !self.execute_scoped(Scope::Properties, node, body) {
            self.mark_aborted();
        }
    }

    /// Sets one property; only legal directly inside a `properties` body.
    pub fn prop(&mut self, key: &str, value: &str) {
        if self.current_scope() != Some(Scope::Properties) {
            self.report_incompatible("prop");
            return;
        }
        match self
            .current_node_mut()
            .and_then(|n| n.properties_mut())
            .and_then(|map| map.as_mut())
        {
            Some(map) => {
                map.insert(key.to_string(), value.to_string());
                trace!(key, "property set");
            }
            None => self.report_incompatible("prop"),
        }
    }

    /// Sets the workspace version; the last call wins.
    pub fn version(&mut self, version: &str) {
        match self.current_node_mut().and_then(|n| n.as_workspace_mut()) {
            Some(ws) => ws.version = Some(version.to_string()),
            None => self.report_incompatible("version"),
        }
    }

    /// Declares the enterprise of the workspace.
    ///
    /// Only one enterprise may be declared; later calls are reported and the
    /// first name is kept.
    pub fn enterprise(&mut self, name: &str) {
        let Some(ws) = self.current_node_mut().and_then(|n| n.as_workspace_mut()) else {
            self.report_incompatible("enterprise");
            return;
        };
        if let Some(existing) = &ws.enterprise {
            let err = DomainError::EnterpriseRedefined {
                existing: existing.name.clone(),
                attempted: name.to_string(),
            };
            self.report(err);
            return;
        }
        ws.enterprise = Some(Enterprise {
            name: name.to_string(),
        });
        debug!(name, "enterprise set");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ElementKind, ErrorKind, Node, WorkspaceData};

    fn evaluator_with(kind: ElementKind) -> (Evaluator, generational_arena::Index) {
        let mut ev = Evaluator::default();
        let node = match kind {
            ElementKind::Workspace => Node::Workspace(WorkspaceData::new("w", "")),
            other => Node::element(other, "n").unwrap(),
        };
        let idx = ev.model.insert_node(node, None);
        (ev, idx)
    }

    fn node(ev: &Evaluator, idx: generational_arena::Index) -> &Node {
        &ev.model.get_node(idx).unwrap().node
    }

    #[test]
    fn test_tag_splits_commas() {
        let (mut ev, idx) = evaluator_with(ElementKind::Container);
        ev.execute(|ev| ev.tag("a,b", &["c"]), idx);
        assert_eq!(node(&ev, idx).tags(), ["a", "b", "c"]);
    }

    #[test]
    fn test_url_checks_context_before_validating() {
        let (mut ev, idx) = evaluator_with(ElementKind::ContainerInstance);
        ev.execute(|ev| ev.url("not a url"), idx);
        assert_eq!(ev.diagnostics().len(), 1);
        assert_eq!(ev.diagnostics().count(ErrorKind::IncompatibleContext), 1);
    }

    #[test]
    fn test_prop_outside_properties_body_is_incompatible() {
        let (mut ev, idx) = evaluator_with(ElementKind::Person);
        ev.execute(
            |ev| {
                ev.properties(|ev| ev.prop("team", "red"));
                ev.prop("team", "blue");
            },
            idx,
        );
        assert_eq!(node(&ev, idx).properties().unwrap()["team"], "red");
        assert_eq!(ev.diagnostics().count(ErrorKind::IncompatibleContext), 1);
    }

    #[test]
    fn test_abort_in_properties_aborts_element() {
        let (mut ev, idx) = evaluator_with(ElementKind::SoftwareSystem);
        let ok = ev.execute(|ev| ev.properties(|ev| ev.abort("bad property")), idx);
        assert!(!ok);
    }

    #[test]
    fn test_attribute_at_top_level_is_incompatible() {
        let mut ev = Evaluator::default();
        ev.tag("a", &[]);
        ev.version("1.0");
        ev.properties(|_| unreachable!());
        assert_eq!(ev.diagnostics().count(ErrorKind::IncompatibleContext), 3);
        assert!(ev
            .diagnostics()
            .iter()
            .all(|d| d.error().to_string().ends_with("top level")));
    }
}
