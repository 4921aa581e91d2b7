//! JWT 认证中间件
//!
//! 验证请求中的 Bearer Token，按访问级别检查角色，并将 Token 信息注入请求扩展

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::access::{AccessTier, authorize, classify};
use crate::error::ApiError;
use crate::state::AppState;

/// 认证中间件
///
/// 公开路由直接放行；其余路由必须携带有效 Token，管理端路由还要求 admin 角色。
/// 验证通过后 `AuthToken` 可通过 `Extension<AuthToken>` 在 handler 中取得。
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let tier = classify(request.method(), request.uri().path());
    if tier == AccessTier::Public {
        return next.run(request).await;
    }

    let Some(token) = bearer_token(request.headers()) else {
        return ApiError::Unauthorized("缺少认证 Token".to_string()).into_response();
    };

    let auth = match state.jwt_manager.verify_token(token) {
        Ok(auth) => auth,
        Err(e) => {
            debug!(error = %e, path = %request.uri().path(), "Token rejected");
            return ApiError::from(e).into_response();
        }
    };

    if let Err(e) = authorize(tier, &auth) {
        debug!(user = %auth.subject, role = %auth.role, path = %request.uri().path(), "Access denied");
        return e.into_response();
    }

    request.extensions_mut().insert(auth);
    next.run(request).await
}

/// 从 Authorization header 提取 Bearer Token
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
