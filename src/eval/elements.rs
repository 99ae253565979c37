//! Element constructors: declare a child of the current node and run its body.

use tracing::{debug, instrument};

use crate::domain::{ElementKind, Node};
use crate::eval::context::{Context, Evaluator};

impl Evaluator {
    /// Declares a person in the workspace.
    pub fn person<F>(&mut self, name: &str, body: F)
    where
        F: FnOnce(&mut Evaluator),
    {
        self.declare(ElementKind::Person, name, body);
    }

    /// Declares a software system in the workspace.
    pub fn software_system<F>(&mut self, name: &str, body: F)
    where
        F: FnOnce(&mut Evaluator),
    {
        self.declare(ElementKind::SoftwareSystem, name, body);
    }

    /// Declares a container in the current software system.
    pub fn container<F>(&mut self, name: &str, body: F)
    where
        F: FnOnce(&mut Evaluator),
    {
        self.declare(ElementKind::Container, name, body);
    }

    /// Declares a component in the current container.
    pub fn component<F>(&mut self, name: &str, body: F)
    where
        F: FnOnce(&mut Evaluator),
    {
        self.declare(ElementKind::Component, name, body);
    }

    /// Declares a deployment node in the workspace or in another deployment node.
    pub fn deployment_node<F>(&mut self, name: &str, body: F)
    where
        F: FnOnce(&mut Evaluator),
    {
        self.declare(ElementKind::DeploymentNode, name, body);
    }

    /// Declares an infrastructure node in the current deployment node.
    pub fn infrastructure_node<F>(&mut self, name: &str, body: F)
    where
        F: FnOnce(&mut Evaluator),
    {
        self.declare(ElementKind::InfrastructureNode, name, body);
    }

    /// Deploys an instance of the named container to the current deployment node.
    pub fn container_instance<F>(&mut self, container: &str, body: F)
    where
        F: FnOnce(&mut Evaluator),
    {
        self.declare(ElementKind::ContainerInstance, container, body);
    }

    /// Declares a health check of the current container instance.
    pub fn health_check<F>(&mut self, name: &str, body: F)
    where
        F: FnOnce(&mut Evaluator),
    {
        self.declare(ElementKind::HealthCheck, name, body);
    }

    /// Inserts an element under the current node and evaluates its body.
    ///
    /// A body that fails leaves no trace in the tree: the element and
    /// everything declared inside it are removed.
    #[instrument(level = "debug", skip(self, body))]
    fn declare<F>(&mut self, kind: ElementKind, name: &str, body: F)
    where
        F: FnOnce(&mut Evaluator),
    {
        let nestable = self
            .current_node()
            .is_some_and(|node| kind.can_nest_in(node.kind()));
        let Context::Element(parent) = self.current() else {
            self.report_incompatible(&kind.to_string());
            return;
        };
        if !nestable {
            self.report_incompatible(&kind.to_string());
            return;
        }
        let Some(node) = Node::element(kind, name) else {
            self.report_incompatible(&kind.to_string());
            return;
        };

        let idx = self.model.insert_node(node, Some(parent));
        if self.execute(body, idx) {
            debug!(%kind, name, "element declared");
        } else {
            let removed = self.model.remove_subtree(idx);
            debug!(%kind, name, removed, "element discarded");
        }
    }
}
