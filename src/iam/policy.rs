use super::{AccessGrant, DeploymentEnvironment, IdentityProviderDetails};
use crate::compute::DataStore;
use crate::provision::ProvisionError;

/// User-management elevation an identity-provider kind requires
struct ProviderGrantTemplate {
    kind: &'static str,
    actions: &'static [&'static str],
    resource: fn(&IdentityProviderDetails, &DeploymentEnvironment) -> Result<String, ProvisionError>,
}

const COGNITO_ACTIONS: &[&str] = &[
    "cognito-idp:AdminDeleteUser",
    "cognito-idp:AdminEnableUser",
    "cognito-idp:AdminCreateUser",
    "cognito-idp:CreateGroup",
    "cognito-idp:AdminDisableUser",
    "cognito-idp:AdminAddUserToGroup",
    "cognito-idp:GetGroup",
    "cognito-idp:AdminUpdateUserAttributes",
    "cognito-idp:AdminGetUser",
    "cognito-idp:ListUsers",
    "cognito-idp:ListUsersInGroup",
    "cognito-idp:AdminListGroupsForUser",
];

fn cognito_user_pool(idp: &IdentityProviderDetails, env: &DeploymentEnvironment) -> Result<String, ProvisionError> {
    let pool_id = idp.detail("userPoolId").ok_or_else(|| ProvisionError::MissingProviderDetail {
        kind: idp.kind.clone(),
        field: "userPoolId".to_string(),
    })?;
    Ok(env.arn("cognito-idp", &format!("userpool/{}", pool_id)))
}

// New provider kinds are added here; call sites never branch on kind.
const PROVIDER_TABLE: &[ProviderGrantTemplate] = &[ProviderGrantTemplate {
    kind: "Cognito",
    actions: COGNITO_ACTIONS,
    resource: cognito_user_pool,
}];

fn lookup(kind: &str) -> Option<&'static ProviderGrantTemplate> {
    PROVIDER_TABLE.iter().find(|entry| entry.kind == kind)
}

/// Identity-provider kinds with a table entry
pub fn known_provider_kinds() -> impl Iterator<Item = &'static str> {
    PROVIDER_TABLE.iter().map(|entry| entry.kind)
}

/// Grant the user-management binding needs for `idp`.
///
/// Kinds without a table entry need no elevation and get an empty grant.
pub fn grants_for(
    idp: &IdentityProviderDetails,
    env: &DeploymentEnvironment,
) -> Result<AccessGrant, ProvisionError> {
    match lookup(&idp.kind) {
        Some(template) => {
            let resource = (template.resource)(idp, env)?;
            Ok(AccessGrant::new(template.actions.iter().copied(), [resource]))
        }
        None => Ok(AccessGrant::empty()),
    }
}

/// Like [`grants_for`] but fails closed on kinds outside the table
pub fn strict_grants_for(
    idp: &IdentityProviderDetails,
    env: &DeploymentEnvironment,
) -> Result<AccessGrant, ProvisionError> {
    if lookup(&idp.kind).is_none() {
        return Err(ProvisionError::UnknownProviderKind(idp.kind.clone()));
    }
    grants_for(idp, env)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    ReadWrite,
}

/// Grant on exactly one store
pub fn data_access_grant(store: &DataStore, mode: AccessMode) -> AccessGrant {
    let actions: Vec<&str> = match mode {
        AccessMode::Read => store.read_actions().to_vec(),
        AccessMode::ReadWrite => store
            .read_actions()
            .iter()
            .chain(store.write_actions())
            .copied()
            .collect(),
    };
    AccessGrant::new(actions, [store.identifier.clone()])
}

/// Read access to secrets named `{prefix}-*`
pub fn secret_read_grant(prefix: &str, env: &DeploymentEnvironment) -> AccessGrant {
    AccessGrant::new(
        ["secretsmanager:GetSecretValue"],
        [env.arn("secretsmanager", &format!("secret:{}-*", prefix))],
    )
}
