//! 中间件模块
//!
//! 提供访问分级与 JWT 认证中间件

mod access;
mod auth;

pub use access::{AccessTier, authorize, classify};
pub use auth::{auth_middleware, bearer_token};
