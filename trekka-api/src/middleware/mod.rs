pub mod auth;
pub mod resiliency;

pub use auth::{user_auth_middleware, UserClaims};
pub use resiliency::{CircuitBreaker, GuardedExtractor};
