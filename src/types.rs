// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP methods a route node can bind to a compute binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five handler roles every service unit exposes
/// Collection roles hang off `/{segment}`, item roles off `/{segment}/{id}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CrudRole {
    GetAll,
    Create,
    Get,
    Update,
    Delete,
}

impl CrudRole {
    pub const ALL: [CrudRole; 5] = [
        CrudRole::GetAll,
        CrudRole::Create,
        CrudRole::Get,
        CrudRole::Update,
        CrudRole::Delete,
    ];

    /// HTTP method the role is attached under
    pub fn method(&self) -> HttpMethod {
        match self {
            CrudRole::GetAll | CrudRole::Get => HttpMethod::Get,
            CrudRole::Create => HttpMethod::Post,
            CrudRole::Update => HttpMethod::Put,
            CrudRole::Delete => HttpMethod::Delete,
        }
    }

    /// True for roles that target the collection route rather than the item route
    pub fn is_collection(&self) -> bool {
        matches!(self, CrudRole::GetAll | CrudRole::Create)
    }

    /// PascalCase suffix used in binding ids and function names
    pub fn label(&self) -> &'static str {
        match self {
            CrudRole::GetAll => "GetAll",
            CrudRole::Create => "Create",
            CrudRole::Get => "Get",
            CrudRole::Update => "Update",
            CrudRole::Delete => "Delete",
        }
    }
}

impl fmt::Display for CrudRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crud_roles_split_two_collection_three_item() {
        let collection: Vec<_> = CrudRole::ALL.iter().filter(|r| r.is_collection()).collect();
        assert_eq!(collection.len(), 2);
        assert_eq!(CrudRole::Create.method(), HttpMethod::Post);
        assert_eq!(CrudRole::Update.method(), HttpMethod::Put);
    }

    #[test]
    fn test_method_serializes_uppercase() {
        let value = serde_json::to_value(HttpMethod::Delete).unwrap();
        assert_eq!(value, serde_json::json!("DELETE"));
    }
}
