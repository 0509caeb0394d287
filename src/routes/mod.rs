// Route registry: the HTTP resource tree every tenant stack hangs off.

pub mod tree;

pub use tree::{Authorization, Endpoint, MethodBinding, MethodOptions, NodeId, RouteNode, RouteTree};
