mod common;

use anyhow::Result;

use tenant_provisioner::compute::BindingId;
use tenant_provisioner::provision::ProvisionError;
use tenant_provisioner::routes::{MethodOptions, RouteTree};
use tenant_provisioner::types::HttpMethod;

#[test]
fn sibling_segments_are_unique_but_may_repeat_across_parents() -> Result<()> {
    let mut tree = RouteTree::new();
    let root = tree.root();

    let products = tree.add_child(root, "products")?;
    let orders = tree.add_child(root, "orders")?;
    tree.add_child(products, "{id}")?;
    tree.add_child(orders, "{id}")?;

    let err = tree.add_child(root, "products").unwrap_err();
    assert_eq!(
        err,
        ProvisionError::DuplicateRoute {
            parent: "/".into(),
            segment: "products".into()
        }
    );
    assert_eq!(tree.route_count(), 4);
    Ok(())
}

#[test]
fn one_binding_per_method() -> Result<()> {
    let mut tree = RouteTree::new();
    let products = tree.add_child(tree.root(), "products")?;

    tree.attach_handler(products, HttpMethod::Get, BindingId::new("a"), MethodOptions::open())?;
    tree.attach_handler(products, HttpMethod::Post, BindingId::new("b"), MethodOptions::open())?;

    let err = tree
        .attach_handler(products, HttpMethod::Get, BindingId::new("c"), MethodOptions::open())
        .unwrap_err();
    assert!(matches!(err, ProvisionError::DuplicateMethod { method: HttpMethod::Get, .. }));

    let node = tree.node(products)?;
    assert_eq!(node.methods[&HttpMethod::Get].binding, BindingId::new("a"));
    Ok(())
}

#[test]
fn paths_and_lookup_agree() -> Result<()> {
    let mut tree = RouteTree::new();
    let users = tree.add_child(tree.root(), "users")?;
    let username = tree.add_child(users, "{username}")?;
    let disable = tree.add_child(username, "disable")?;

    assert_eq!(tree.path(tree.root()), "/");
    assert_eq!(tree.path(disable), "/users/{username}/disable");
    assert_eq!(tree.lookup("users/{username}/disable"), Some(disable));
    assert_eq!(tree.lookup("/users/"), Some(users));
    assert_eq!(tree.lookup("users/enable"), None);
    assert_eq!(tree.node(disable)?.parent, Some(username));
    assert!(tree.node(username)?.is_parameter());
    Ok(())
}

#[test]
fn endpoints_follow_registration_order() -> Result<()> {
    let mut tree = RouteTree::new();
    let orders = tree.add_child(tree.root(), "orders")?;
    let products = tree.add_child(tree.root(), "products")?;
    tree.attach_handler(products, HttpMethod::Get, BindingId::new("p"), MethodOptions::open())?;
    tree.attach_handler(orders, HttpMethod::Get, BindingId::new("o"), MethodOptions::gated())?;

    let paths: Vec<_> = tree.endpoints().into_iter().map(|e| (e.path, e.options.is_gated())).collect();
    assert_eq!(paths, vec![("/orders".to_string(), true), ("/products".to_string(), false)]);
    Ok(())
}

#[test]
fn malformed_segments_are_rejected() {
    let mut tree = RouteTree::new();
    let root = tree.root();

    for segment in ["", "a/b", " padded", "{", "{}", "{id", "id}"] {
        assert_eq!(
            tree.add_child(root, segment).unwrap_err(),
            ProvisionError::InvalidSegment(segment.to_string()),
            "segment {:?}",
            segment
        );
    }
    assert_eq!(tree.route_count(), 0);
}

#[test]
fn tree_survives_a_json_round_trip() -> Result<()> {
    let stack = common::pooled_stack()?;
    let encoded = serde_json::to_string(&stack.routes)?;
    let decoded: RouteTree = serde_json::from_str(&encoded)?;
    assert_eq!(decoded, stack.routes);
    Ok(())
}
