use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity-provider integration a tenant signs in through.
///
/// Only `kind` is interpreted during provisioning; `details` is handed to the
/// user-management binding as opaque configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityProviderDetails {
    #[serde(rename = "name", alias = "kind")]
    pub kind: String,
    #[serde(default)]
    pub details: Value,
}

impl IdentityProviderDetails {
    pub fn new(kind: impl Into<String>, details: Value) -> Self {
        Self {
            kind: kind.into(),
            details,
        }
    }

    /// String-valued provider detail, e.g. `userPoolId`
    pub fn detail(&self, field: &str) -> Option<&str> {
        self.details.get(field).and_then(Value::as_str)
    }

    /// Serialized form passed to bindings as `IDP_DETAILS`
    pub fn to_config_value(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accepts_name_or_kind() {
        let by_name: IdentityProviderDetails =
            serde_json::from_value(json!({"name": "Cognito", "details": {"userPoolId": "p"}})).unwrap();
        let by_kind: IdentityProviderDetails =
            serde_json::from_value(json!({"kind": "Cognito", "details": {"userPoolId": "p"}})).unwrap();

        assert_eq!(by_name, by_kind);
        assert_eq!(by_name.detail("userPoolId"), Some("p"));
    }

    #[test]
    fn test_config_value_round_trips_details() {
        let idp = IdentityProviderDetails::new("OIDC", json!({"issuer": "https://id.example.com"}));
        let encoded = idp.to_config_value().unwrap();
        assert!(encoded.contains(r#""name":"OIDC""#));
        assert!(encoded.contains("https://id.example.com"));
    }
}
