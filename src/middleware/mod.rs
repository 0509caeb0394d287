pub mod auth;
pub mod response;

pub use auth::{
    enforce_gate, generate_token, AuthDecision, Authorizer, Claims, JwtAuthorizer, StaticAuthorizer, API_KEY_HEADER,
};
pub use response::{ApiResponse, ApiResult};
