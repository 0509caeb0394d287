// Access grants: what each role in a tenant stack may do, and on which resources.

pub mod arn;
pub mod grant;
pub mod identity;
pub mod policy;

pub use arn::DeploymentEnvironment;
pub use grant::{AccessGrant, Role};
pub use identity::IdentityProviderDetails;
pub use policy::{data_access_grant, grants_for, secret_read_grant, strict_grants_for, AccessMode};

/// Managed policies every auxiliary execution role starts with
pub const BASIC_EXECUTION_POLICY: &str = "service-role/AWSLambdaBasicExecutionRole";
pub const LAMBDA_INSIGHTS_POLICY: &str = "CloudWatchLambdaInsightsExecutionRolePolicy";
pub const XRAY_WRITE_POLICY: &str = "AWSXrayWriteOnlyAccess";

/// Service principal compute bindings assume their roles through
pub const LAMBDA_SERVICE_PRINCIPAL: &str = "lambda.amazonaws.com";
