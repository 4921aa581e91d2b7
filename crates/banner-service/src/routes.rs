//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射

use axum::{
    Router, middleware,
    routing::{get, post},
};

use banner_shared::observability::middleware as obs_middleware;

use crate::{handlers, middleware::auth_middleware, state::AppState};

/// 构建注册与登录路由（公开路由，无需认证）
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
}

/// 构建功能与标签管理路由
fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/features", post(handlers::feature::create_feature))
        .route("/features/{id}", get(handlers::feature::get_feature))
        .route("/tags", post(handlers::tag::create_tag))
        .route("/tags/{id}", get(handlers::tag::get_tag))
}

/// 构建横幅管理路由
fn banner_routes() -> Router<AppState> {
    Router::new()
        .route("/banners", post(handlers::banner::create_banner))
        .route("/banner", get(handlers::banner::list_banners))
        .route(
            "/banner/{id}",
            get(handlers::banner::get_banner)
                .patch(handlers::banner::update_banner)
                .delete(handlers::banner::delete_banner),
        )
}

/// 构建用户侧路由
fn user_routes() -> Router<AppState> {
    Router::new().route("/user_banner", get(handlers::user_banner::get_user_banner))
}

/// 构建探针路由
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
}

/// 构建所有 API 路由
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(catalog_routes())
        .merge(banner_routes())
        .merge(user_routes())
        .merge(health_routes())
}

/// 构建完整应用：路由 + 认证 + 请求追踪
///
/// CORS、超时等部署相关的层由 main 叠加。
pub fn build_app(state: AppState) -> Router {
    api_routes()
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_construction() {
        let _auth = auth_routes();
        let _catalog = catalog_routes();
        let _banner = banner_routes();
        let _user = user_routes();
        let _health = health_routes();
        let _api = api_routes();
    }
}
