// Provisioning: turns a tenant request plus the service catalog into an immutable
// TenantStack (route tree, service units, auxiliary services, roles).
//
// Validation runs before construction and construction happens on values owned by
// the run, so nothing partially built escapes a failed provision.

pub mod error;
pub mod request;
pub mod service_unit;
pub mod catalog;
pub mod tenant;

pub use error::ProvisionError;
pub use request::TenantProvisioningRequest;
pub use service_unit::{ServiceUnit, ITEM_SEGMENT};
pub use catalog::{HandlerNames, ServiceCatalog, ServiceUnitSpec};
pub use tenant::{
    AuxiliaryService, TenantProvisioner, TenantStack, AI_CONCIERGE_SEGMENT, CONCIERGE_SECRET_PREFIX,
    RESERVED_SEGMENTS, USERS_SEGMENT,
};
