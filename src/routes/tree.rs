use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::compute::BindingId;
use crate::provision::ProvisionError;
use crate::types::HttpMethod;

/// Index of a node inside a [`RouteTree`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Authorization {
    #[default]
    None,
    Custom,
}

/// Per-method gate settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodOptions {
    pub authorization: Authorization,
    pub api_key_required: bool,
}

impl MethodOptions {
    /// Open method: no authorizer, no API key
    pub fn open() -> Self {
        Self::default()
    }

    /// Custom authorizer plus API key
    pub fn gated() -> Self {
        Self {
            authorization: Authorization::Custom,
            api_key_required: true,
        }
    }

    pub fn is_gated(&self) -> bool {
        self.authorization == Authorization::Custom || self.api_key_required
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodBinding {
    pub binding: BindingId,
    pub options: MethodOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteNode {
    pub segment: String,
    /// Back-link only; the arena owns every node
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub methods: BTreeMap<HttpMethod, MethodBinding>,
}

impl RouteNode {
    fn new(segment: &str, parent: Option<NodeId>) -> Self {
        Self {
            segment: segment.to_string(),
            parent,
            children: Vec::new(),
            methods: BTreeMap::new(),
        }
    }

    /// `{id}` style segments capture a path parameter
    pub fn is_parameter(&self) -> bool {
        is_parameter_segment(&self.segment)
    }
}

/// One (path, method) pair with its binding, flattened out of the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub path: String,
    pub method: HttpMethod,
    pub binding: BindingId,
    pub options: MethodOptions,
}

/// Route tree rooted at the shared API entry point.
///
/// Nodes live in an arena and are never removed, so a [`NodeId`] stays valid for
/// the lifetime of the tree. Sibling segments are unique and each node holds at
/// most one binding per HTTP method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTree {
    nodes: Vec<RouteNode>,
}

impl Default for RouteTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![RouteNode::new("", None)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> Result<&RouteNode, ProvisionError> {
        self.nodes.get(id.0).ok_or(ProvisionError::UnknownNode(id.0))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut RouteNode, ProvisionError> {
        self.nodes.get_mut(id.0).ok_or(ProvisionError::UnknownNode(id.0))
    }

    /// Register `segment` under `parent`. Registering an existing sibling is an error,
    /// never a lookup.
    pub fn add_child(&mut self, parent: NodeId, segment: &str) -> Result<NodeId, ProvisionError> {
        validate_segment(segment)?;

        if self.find(parent, segment).is_some() {
            return Err(ProvisionError::DuplicateRoute {
                parent: self.path(parent),
                segment: segment.to_string(),
            });
        }
        // Validates the parent before the arena grows
        self.node(parent)?;

        let id = NodeId(self.nodes.len());
        self.nodes.push(RouteNode::new(segment, Some(parent)));
        self.node_mut(parent)?.children.push(id);

        tracing::debug!("Registered route {}", self.path(id));
        Ok(id)
    }

    pub fn attach_handler(
        &mut self,
        node: NodeId,
        method: HttpMethod,
        binding: BindingId,
        options: MethodOptions,
    ) -> Result<(), ProvisionError> {
        let path = self.path(node);
        let target = self.node_mut(node)?;

        if target.methods.contains_key(&method) {
            return Err(ProvisionError::DuplicateMethod { path, method });
        }

        tracing::debug!("Attached {} {} -> {}", method, path, binding);
        target.methods.insert(method, MethodBinding { binding, options });
        Ok(())
    }

    pub fn find(&self, parent: NodeId, segment: &str) -> Option<NodeId> {
        let node = self.nodes.get(parent.0)?;
        node.children
            .iter()
            .copied()
            .find(|child| self.nodes[child.0].segment == segment)
    }

    /// Resolve a `/`-separated path from the root, e.g. `products/{id}`
    pub fn lookup(&self, path: &str) -> Option<NodeId> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .try_fold(self.root(), |node, segment| self.find(node, segment))
    }

    /// Render the absolute path of `node`, `/` for the root
    pub fn path(&self, node: NodeId) -> String {
        let mut segments = Vec::new();
        let mut cursor = Some(node);

        while let Some(id) = cursor {
            match self.nodes.get(id.0) {
                Some(current) => {
                    if current.parent.is_some() {
                        segments.push(current.segment.as_str());
                    }
                    cursor = current.parent;
                }
                None => break,
            }
        }

        segments.reverse();
        format!("/{}", segments.join("/"))
    }

    /// Depth-first, insertion-ordered traversal starting at the root
    pub fn walk(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];

        while let Some(id) = stack.pop() {
            order.push(id);
            for child in self.nodes[id.0].children.iter().rev() {
                stack.push(*child);
            }
        }

        order
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.walk()
            .into_iter()
            .flat_map(|id| {
                let path = self.path(id);
                self.nodes[id.0]
                    .methods
                    .iter()
                    .map(move |(method, bound)| Endpoint {
                        path: path.clone(),
                        method: *method,
                        binding: bound.binding.clone(),
                        options: bound.options,
                    })
            })
            .collect()
    }

    /// Number of registered routes, the root entry point excluded
    pub fn route_count(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn method_count(&self) -> usize {
        self.nodes.iter().map(|n| n.methods.len()).sum()
    }
}

pub fn is_parameter_segment(segment: &str) -> bool {
    segment.len() > 2 && segment.starts_with('{') && segment.ends_with('}')
}

fn validate_segment(segment: &str) -> Result<(), ProvisionError> {
    let malformed_param = (segment.starts_with('{') || segment.ends_with('}')) && !is_parameter_segment(segment);

    if segment.is_empty() || segment.contains('/') || segment.trim() != segment || malformed_param {
        return Err(ProvisionError::InvalidSegment(segment.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(name: &str) -> BindingId {
        BindingId::new(name)
    }

    #[test]
    fn test_duplicate_segment_is_rejected() {
        let mut tree = RouteTree::new();
        let root = tree.root();
        tree.add_child(root, "products").unwrap();

        let err = tree.add_child(root, "products").unwrap_err();
        assert_eq!(
            err,
            ProvisionError::DuplicateRoute { parent: "/".into(), segment: "products".into() }
        );
        assert_eq!(tree.route_count(), 1);
    }

    #[test]
    fn test_distinct_siblings_are_preserved_in_order() {
        let mut tree = RouteTree::new();
        let root = tree.root();
        let products = tree.add_child(root, "products").unwrap();
        let orders = tree.add_child(root, "orders").unwrap();

        assert_ne!(products, orders);
        assert_eq!(tree.node(root).unwrap().children, vec![products, orders]);
    }

    #[test]
    fn test_same_segment_under_different_parents() {
        let mut tree = RouteTree::new();
        let root = tree.root();
        let products = tree.add_child(root, "products").unwrap();
        let orders = tree.add_child(root, "orders").unwrap();
        let a = tree.add_child(products, "{id}").unwrap();
        let b = tree.add_child(orders, "{id}").unwrap();

        assert_eq!(tree.path(a), "/products/{id}");
        assert_eq!(tree.path(b), "/orders/{id}");
        assert!(tree.node(a).unwrap().is_parameter());
    }

    #[test]
    fn test_duplicate_method_is_rejected() {
        let mut tree = RouteTree::new();
        let products = tree.add_child(tree.root(), "products").unwrap();
        tree.attach_handler(products, HttpMethod::Get, binding("a"), MethodOptions::open())
            .unwrap();

        let err = tree
            .attach_handler(products, HttpMethod::Get, binding("b"), MethodOptions::open())
            .unwrap_err();
        assert!(matches!(err, ProvisionError::DuplicateMethod { method: HttpMethod::Get, .. }));
        assert_eq!(tree.method_count(), 1);
    }

    #[test]
    fn test_invalid_segments() {
        let mut tree = RouteTree::new();
        let root = tree.root();
        for bad in ["", "a/b", "{", "{}", "{id", " users"] {
            assert!(matches!(tree.add_child(root, bad), Err(ProvisionError::InvalidSegment(_))), "{bad:?}");
        }
    }

    #[test]
    fn test_lookup_and_walk() {
        let mut tree = RouteTree::new();
        let root = tree.root();
        let users = tree.add_child(root, "users").unwrap();
        let username = tree.add_child(users, "{username}").unwrap();
        let disable = tree.add_child(username, "disable").unwrap();
        let ai = tree.add_child(root, "ai-concierge").unwrap();

        assert_eq!(tree.lookup("users/{username}/disable"), Some(disable));
        assert_eq!(tree.lookup("/users/nobody"), None);
        assert_eq!(tree.walk(), vec![root, users, username, disable, ai]);
    }

    #[test]
    fn test_unknown_parent() {
        let mut tree = RouteTree::new();
        let other = {
            let mut bigger = RouteTree::new();
            bigger.add_child(bigger.root(), "x").unwrap()
        };
        assert_eq!(tree.add_child(other, "y"), Err(ProvisionError::UnknownNode(1)));
    }
}
