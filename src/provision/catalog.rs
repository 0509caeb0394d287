use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::ProvisionError;
use crate::routes::tree::is_parameter_segment;
use crate::types::CrudRole;

/// Function names for the five CRUD roles of a service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerNames {
    #[serde(default)]
    pub get_all: Option<String>,
    #[serde(default)]
    pub create: Option<String>,
    #[serde(default)]
    pub get: Option<String>,
    #[serde(default)]
    pub update: Option<String>,
    #[serde(default)]
    pub delete: Option<String>,
}

impl HandlerNames {
    pub fn complete(get_all: &str, create: &str, get: &str, update: &str, delete: &str) -> Self {
        Self {
            get_all: Some(get_all.to_string()),
            create: Some(create.to_string()),
            get: Some(get.to_string()),
            update: Some(update.to_string()),
            delete: Some(delete.to_string()),
        }
    }

    pub fn handler(&self, role: CrudRole) -> Option<&str> {
        let name = match role {
            CrudRole::GetAll => &self.get_all,
            CrudRole::Create => &self.create,
            CrudRole::Get => &self.get,
            CrudRole::Update => &self.update,
            CrudRole::Delete => &self.delete,
        };
        name.as_deref().filter(|n| !n.trim().is_empty())
    }

    pub fn missing(&self) -> Vec<CrudRole> {
        CrudRole::ALL
            .into_iter()
            .filter(|role| self.handler(*role).is_none())
            .collect()
    }
}

/// Declarative shape of one backend microservice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceUnitSpec {
    #[serde(alias = "serviceName")]
    pub name: String,
    /// Code directory, relative to the request's source root
    #[serde(alias = "entry")]
    pub code_entry_path: String,
    #[serde(alias = "index")]
    pub handler_index_file: String,
    #[serde(alias = "handlers")]
    pub handler_names: HandlerNames,
    pub route_segment: String,
    #[serde(alias = "sortKey")]
    pub sort_key_name: String,
    pub table_name_env_key: String,
}

impl ServiceUnitSpec {
    pub fn handler(&self, role: CrudRole) -> Result<&str, ProvisionError> {
        self.handler_names
            .handler(role)
            .ok_or_else(|| self.incomplete())
    }

    fn incomplete(&self) -> ProvisionError {
        ProvisionError::IncompleteHandlerSet {
            service: self.name.clone(),
            missing: self.handler_names.missing(),
        }
    }

    pub fn validate(&self) -> Result<(), ProvisionError> {
        if self.name.trim().is_empty() {
            return Err(ProvisionError::InvalidConfig("service name must not be empty".into()));
        }
        if !self.handler_names.missing().is_empty() {
            return Err(self.incomplete());
        }
        let segment = &self.route_segment;
        if segment.is_empty() || segment.contains('/') || is_parameter_segment(segment) {
            return Err(ProvisionError::InvalidSegment(segment.clone()));
        }
        if self.sort_key_name.trim().is_empty() || self.table_name_env_key.trim().is_empty() {
            return Err(ProvisionError::InvalidConfig(format!(
                "service '{}' needs a sort key and a table name key",
                self.name
            )));
        }
        Ok(())
    }
}

/// Explicit, ordered list of services every tenant stack gets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceCatalog {
    specs: Vec<ServiceUnitSpec>,
}

impl Default for ServiceCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ServiceCatalog {
    pub fn new(specs: Vec<ServiceUnitSpec>) -> Self {
        Self { specs }
    }

    /// Product and order services
    pub fn builtin() -> Self {
        Self::new(vec![product_service(), order_service()])
    }

    pub fn specs(&self) -> &[ServiceUnitSpec] {
        &self.specs
    }

    /// Check every spec, then the catalog as a whole, before anything is built
    pub fn validate(&self, reserved_segments: &[&str]) -> Result<(), ProvisionError> {
        let mut names = BTreeSet::new();
        let mut segments = BTreeSet::new();

        for spec in &self.specs {
            spec.validate()?;

            if !names.insert(spec.name.as_str()) {
                return Err(ProvisionError::DuplicateService(spec.name.clone()));
            }
            if reserved_segments.contains(&spec.route_segment.as_str()) {
                return Err(ProvisionError::ReservedSegment(spec.route_segment.clone()));
            }
            if !segments.insert(spec.route_segment.as_str()) {
                return Err(ProvisionError::DuplicateRoute {
                    parent: "/".to_string(),
                    segment: spec.route_segment.clone(),
                });
            }
        }
        Ok(())
    }
}

pub fn product_service() -> ServiceUnitSpec {
    ServiceUnitSpec {
        name: "ProductService".to_string(),
        code_entry_path: "ProductService".to_string(),
        handler_index_file: "product_service.py".to_string(),
        handler_names: HandlerNames::complete(
            "get_products",
            "create_product",
            "get_product",
            "update_product",
            "delete_product",
        ),
        route_segment: "products".to_string(),
        sort_key_name: "productId".to_string(),
        table_name_env_key: "PRODUCT_TABLE_NAME".to_string(),
    }
}

pub fn order_service() -> ServiceUnitSpec {
    ServiceUnitSpec {
        name: "OrderService".to_string(),
        code_entry_path: "OrderService".to_string(),
        handler_index_file: "order_service.py".to_string(),
        handler_names: HandlerNames::complete("get_orders", "create_order", "get_order", "update_order", "delete_order"),
        route_segment: "orders".to_string(),
        sort_key_name: "orderId".to_string(),
        table_name_env_key: "ORDER_TABLE_NAME".to_string(),
    }
}
