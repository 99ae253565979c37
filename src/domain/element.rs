//! Architecture elements: the node variants of a model tree and their decorations.

use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;

/// Position of an element relative to the enterprise boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Location {
    #[default]
    Unspecified,
    Internal,
    External,
}

/// Organisational boundary drawn around internal elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enterprise {
    pub name: String,
}

/// Root of a model: name, description, version and the enterprise marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceData {
    pub name: String,
    pub description: String,
    pub version: Option<String>,
    pub enterprise: Option<Enterprise>,
}

impl WorkspaceData {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Self::default()
        }
    }
}

/// Decorations shared by every person, system, container, component and
/// deployment element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementData {
    /// Element name; for container instances the name of the container
    pub name: String,
    pub description: Option<String>,
    /// Tags in call order, duplicates kept
    pub tags: Vec<String>,
    pub url: Option<String>,
    pub location: Location,
    /// Created by the first `properties` call
    pub properties: Option<BTreeMap<String, String>>,
}

impl ElementData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Tags in their comma-joined form.
    pub fn tags_joined(&self) -> String {
        self.tags.iter().join(",")
    }
}

/// Health check attached to a container instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthCheckData {
    pub name: String,
    pub url: Option<String>,
}

/// Discriminant of [`Node`], used for parent checks and messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Workspace,
    Person,
    SoftwareSystem,
    Container,
    Component,
    DeploymentNode,
    InfrastructureNode,
    ContainerInstance,
    HealthCheck,
}

impl ElementKind {
    /// Kinds under which an element of this kind may be declared.
    pub fn allowed_parents(self) -> &'static [ElementKind] {
        use ElementKind::*;
        match self {
            Workspace => &[],
            Person | SoftwareSystem => &[Workspace],
            Container => &[SoftwareSystem],
            Component => &[Container],
            DeploymentNode => &[Workspace, DeploymentNode],
            InfrastructureNode | ContainerInstance => &[DeploymentNode],
            HealthCheck => &[ContainerInstance],
        }
    }

    pub fn can_nest_in(self, parent: ElementKind) -> bool {
        self.allowed_parents().contains(&parent)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ElementKind::Workspace => "workspace",
            ElementKind::Person => "person",
            ElementKind::SoftwareSystem => "software system",
            ElementKind::Container => "container",
            ElementKind::Component => "component",
            ElementKind::DeploymentNode => "deployment node",
            ElementKind::InfrastructureNode => "infrastructure node",
            ElementKind::ContainerInstance => "container instance",
            ElementKind::HealthCheck => "health check",
        };
        f.write_str(label)
    }
}

/// A node of the architecture tree.
///
/// The accessors below are the capability table: each returns `Some` only
/// for the variants on which the attribute is legal. They match exhaustively
/// so that adding a variant forces a decision for every attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Workspace(WorkspaceData),
    Person(ElementData),
    SoftwareSystem(ElementData),
    Container(ElementData),
    Component(ElementData),
    DeploymentNode(ElementData),
    InfrastructureNode(ElementData),
    ContainerInstance(ElementData),
    HealthCheck(HealthCheckData),
}

impl Node {
    /// Creates an element of the given kind with default decorations.
    ///
    /// Returns `None` for [`ElementKind::Workspace`], which is only built by
    /// the workspace constructor.
    pub fn element(kind: ElementKind, name: impl Into<String>) -> Option<Self> {
        let data = ElementData::new(name);
        let node = match kind {
            ElementKind::Workspace => return None,
            ElementKind::Person => Node::Person(data),
            ElementKind::SoftwareSystem => Node::SoftwareSystem(data),
            ElementKind::Container => Node::Container(data),
            ElementKind::Component => Node::Component(data),
            ElementKind::DeploymentNode => Node::DeploymentNode(data),
            ElementKind::InfrastructureNode => Node::InfrastructureNode(data),
            ElementKind::ContainerInstance => Node::ContainerInstance(data),
            ElementKind::HealthCheck => Node::HealthCheck(HealthCheckData {
                name: data.name,
                url: None,
            }),
        };
        Some(node)
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Node::Workspace(_) => ElementKind::Workspace,
            Node::Person(_) => ElementKind::Person,
            Node::SoftwareSystem(_) => ElementKind::SoftwareSystem,
            Node::Container(_) => ElementKind::Container,
            Node::Component(_) => ElementKind::Component,
            Node::DeploymentNode(_) => ElementKind::DeploymentNode,
            Node::InfrastructureNode(_) => ElementKind::InfrastructureNode,
            Node::ContainerInstance(_) => ElementKind::ContainerInstance,
            Node::HealthCheck(_) => ElementKind::HealthCheck,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::Workspace(w) => &w.name,
            Node::HealthCheck(h) => &h.name,
            Node::Person(e)
            | Node::SoftwareSystem(e)
            | Node::Container(e)
            | Node::Component(e)
            | Node::DeploymentNode(e)
            | Node::InfrastructureNode(e)
            | Node::ContainerInstance(e) => &e.name,
        }
    }

    /// Shared decorations, absent on workspace and health check.
    pub fn element_data(&self) -> Option<&ElementData> {
        match self {
            Node::Workspace(_) | Node::HealthCheck(_) => None,
            Node::Person(e)
            | Node::SoftwareSystem(e)
            | Node::Container(e)
            | Node::Component(e)
            | Node::DeploymentNode(e)
            | Node::InfrastructureNode(e)
            | Node::ContainerInstance(e) => Some(e),
        }
    }

    pub fn as_workspace(&self) -> Option<&WorkspaceData> {
        match self {
            Node::Workspace(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_workspace_mut(&mut self) -> Option<&mut WorkspaceData> {
        match self {
            Node::Workspace(w) => Some(w),
            _ => None,
        }
    }

    pub fn tags(&self) -> &[String] {
        self.element_data().map_or(&[], |e| e.tags.as_slice())
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Node::HealthCheck(h) => h.url.as_deref(),
            _ => self.element_data().and_then(|e| e.url.as_deref()),
        }
    }

    pub fn location(&self) -> Location {
        self.element_data().map_or(Location::Unspecified, |e| e.location)
    }

    pub fn properties(&self) -> Option<&BTreeMap<String, String>> {
        self.element_data().and_then(|e| e.properties.as_ref())
    }

    pub fn tags_mut(&mut self) -> Option<&mut Vec<String>> {
        match self {
            Node::Person(e)
            | Node::SoftwareSystem(e)
            | Node::Container(e)
            | Node::Component(e)
            | Node::DeploymentNode(e)
            | Node::InfrastructureNode(e)
            | Node::ContainerInstance(e) => Some(&mut e.tags),
            Node::Workspace(_) | Node::HealthCheck(_) => None,
        }
    }

    pub fn url_mut(&mut self) -> Option<&mut Option<String>> {
        match self {
            Node::Person(e)
            | Node::SoftwareSystem(e)
            | Node::Container(e)
            | Node::Component(e)
            | Node::DeploymentNode(e)
            | Node::InfrastructureNode(e) => Some(&mut e.url),
            Node::HealthCheck(h) => Some(&mut h.url),
            Node::Workspace(_) | Node::ContainerInstance(_) => None,
        }
    }

    pub fn location_mut(&mut self) -> Option<&mut Location> {
        match self {
            Node::Person(e) | Node::SoftwareSystem(e) => Some(&mut e.location),
            Node::Workspace(_)
            | Node::Container(_)
            | Node::Component(_)
            | Node::DeploymentNode(_)
            | Node::InfrastructureNode(_)
            | Node::ContainerInstance(_)
            | Node::HealthCheck(_) => None,
        }
    }

    pub fn properties_mut(&mut self) -> Option<&mut Option<BTreeMap<String, String>>> {
        match self {
            Node::Person(e)
            | Node::SoftwareSystem(e)
            | Node::Container(e)
            | Node::Component(e)
            | Node::DeploymentNode(e)
            | Node::InfrastructureNode(e)
            | Node::ContainerInstance(e) => Some(&mut e.properties),
            Node::Workspace(_) | Node::HealthCheck(_) => None,
        }
    }

    pub fn description_mut(&mut self) -> Option<&mut Option<String>> {
        match self {
            Node::Person(e)
            | Node::SoftwareSystem(e)
            | Node::Container(e)
            | Node::Component(e)
            | Node::DeploymentNode(e)
            | Node::InfrastructureNode(e) => Some(&mut e.description),
            Node::Workspace(_) | Node::ContainerInstance(_) | Node::HealthCheck(_) => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.kind(), self.name())
    }
}
