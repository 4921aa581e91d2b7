//! 访问分级
//!
//! 每个请求按 (方法, 路径) 归入公开、登录用户、管理员三档之一。
//! 未登记的路由按登录用户处理，先认证再交给路由层返回 404。

use axum::http::Method;

use crate::auth::AuthToken;
use crate::error::ApiError;

/// 访问级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessTier {
    /// 无需 Token
    Public,
    /// 任意有效 Token
    Authenticated,
    /// 角色为 admin 的有效 Token
    Admin,
}

/// 管理端资源前缀
const ADMIN_RESOURCES: [&str; 4] = ["/features", "/tags", "/banners", "/banner"];

/// 按方法和路径确定访问级别
pub fn classify(method: &Method, path: &str) -> AccessTier {
    match (method, path) {
        (&Method::POST, "/users") | (&Method::POST, "/login") => AccessTier::Public,
        (&Method::GET, "/health") | (&Method::GET, "/ready") => AccessTier::Public,
        (&Method::GET, "/user_banner") => AccessTier::Authenticated,
        _ if ADMIN_RESOURCES.iter().any(|prefix| matches_resource(path, prefix)) => {
            AccessTier::Admin
        }
        _ => AccessTier::Authenticated,
    }
}

/// `/banner` 与 `/banner/7` 匹配，`/bannerx` 不匹配
fn matches_resource(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// 检查已认证的 Token 是否满足访问级别
pub fn authorize(tier: AccessTier, token: &AuthToken) -> Result<(), ApiError> {
    match tier {
        AccessTier::Admin if !token.role.is_admin() => {
            Err(ApiError::Forbidden("需要管理员权限".to_string()))
        }
        _ => Ok(()),
    }
}
