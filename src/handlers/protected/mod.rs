// handlers/protected/mod.rs - endpoints behind `require_access`
//
// Item routes (`/:id`) additionally run a loader that places the addressed
// record in the request extensions.

pub mod auth;
pub mod product;
pub mod profile;
pub mod user;
