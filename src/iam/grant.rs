use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Additive permission record: every action applies to every resource.
///
/// Both sets are ordered, so two grants built from the same actions and resources
/// compare and serialize identically no matter the insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessGrant {
    /// Role the grant is attached to; unset until [`Role::attach`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<String>,
    pub actions: BTreeSet<String>,
    pub resources: BTreeSet<String>,
}

impl AccessGrant {
    pub fn new<A, R>(actions: A, resources: R) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            principal: None,
            actions: actions.into_iter().map(Into::into).collect(),
            resources: resources.into_iter().map(Into::into).collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// A grant with no actions or no resources permits nothing
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() || self.resources.is_empty()
    }

    fn bound_to(mut self, principal: &str) -> Self {
        self.principal = Some(principal.to_string());
        self
    }
}

/// Execution role accumulating managed policies and inline grants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assumed_by: Option<String>,
    #[serde(default)]
    pub managed_policies: BTreeSet<String>,
    #[serde(default)]
    grants: BTreeSet<AccessGrant>,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            assumed_by: None,
            managed_policies: BTreeSet::new(),
            grants: BTreeSet::new(),
        }
    }

    pub fn assumed_by(mut self, service_principal: impl Into<String>) -> Self {
        self.assumed_by = Some(service_principal.into());
        self
    }

    pub fn with_managed_policy(mut self, policy: impl Into<String>) -> Self {
        self.managed_policies.insert(policy.into());
        self
    }

    /// Attach a grant to this role. Empty grants are skipped and reported as `false`.
    /// Grants are never removed once attached.
    pub fn attach(&mut self, grant: AccessGrant) -> bool {
        if grant.is_empty() {
            return false;
        }
        let bound = grant.bound_to(&self.name);
        tracing::debug!(
            role = %self.name,
            actions = bound.actions.len(),
            resources = ?bound.resources,
            "Attached grant"
        );
        self.grants.insert(bound);
        true
    }

    pub fn grants(&self) -> impl Iterator<Item = &AccessGrant> {
        self.grants.iter()
    }

    pub fn grant_count(&self) -> usize {
        self.grants.len()
    }

    /// Union of every action granted to the role
    pub fn actions(&self) -> BTreeSet<&str> {
        self.grants
            .iter()
            .flat_map(|g| g.actions.iter().map(String::as_str))
            .collect()
    }

    pub fn resources(&self) -> BTreeSet<&str> {
        self.grants
            .iter()
            .flat_map(|g| g.resources.iter().map(String::as_str))
            .collect()
    }

    /// True when some grant allows `action` on `resource`
    pub fn allows(&self, action: &str, resource: &str) -> bool {
        self.grants
            .iter()
            .any(|g| g.actions.contains(action) && g.resources.contains(resource))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_grant_is_not_attached() {
        let mut role = Role::new("tenant-role");
        assert!(!role.attach(AccessGrant::empty()));
        assert!(!role.attach(AccessGrant::new(["s3:GetObject"], Vec::<String>::new())));
        assert_eq!(role.grant_count(), 0);
    }

    #[test]
    fn test_attach_binds_principal() {
        let mut role = Role::new("tenant-role");
        assert!(role.attach(AccessGrant::new(["dynamodb:GetItem"], ["arn:table"])));

        let grant = role.grants().next().unwrap();
        assert_eq!(grant.principal.as_deref(), Some("tenant-role"));
        assert!(role.allows("dynamodb:GetItem", "arn:table"));
        assert!(!role.allows("dynamodb:PutItem", "arn:table"));
    }

    #[test]
    fn test_attach_is_idempotent_per_grant() {
        let mut role = Role::new("r");
        let grant = AccessGrant::new(["a", "b"], ["x"]);
        role.attach(grant.clone());
        role.attach(grant);
        assert_eq!(role.grant_count(), 1);
    }

    #[test]
    fn test_action_order_does_not_matter() {
        assert_eq!(
            AccessGrant::new(["b", "a"], ["y", "x"]),
            AccessGrant::new(["a", "b"], ["x", "y"])
        );
    }
}
