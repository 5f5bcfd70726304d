pub mod auth;
pub mod extract;
pub mod filter;
pub mod lang;
pub mod permission;
pub mod ratelimit;
pub mod request;
pub mod response;

pub use auth::{require_access, require_refresh, AuthUser};
pub use extract::{ClientIp, Payload};
pub use filter::{ListFilter, UserListFilter};
pub use lang::lang;
pub use permission::require_module;
pub use ratelimit::{rate_limit, RateLimiter};
pub use request::{load_product, load_profile, load_user};
pub use response::{ApiResponse, ApiResult};
