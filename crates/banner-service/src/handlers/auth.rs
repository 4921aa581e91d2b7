//! 注册与登录处理器

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::{info, warn};
use validator::Validate;

use banner_shared::error::BannerError;

use crate::auth::{hash_password, verify_password};
use crate::dto::{LoginRequest, LoginResponse, RegisterRequest, UserDto};
use crate::error::{ApiError, Result};
use crate::models::Role;
use crate::state::AppState;

/// 用户注册
///
/// POST /users
///
/// 注册用户的角色固定为 user，管理员只能通过启动初始化创建。
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserDto>)> {
    let Json(req) = payload?;
    req.validate()?;

    let password_hash = hash_password(&req.password)?;

    let user = state
        .users
        .create_user(&req.username, &password_hash, Role::User)
        .await
        .map_err(|e| match e {
            BannerError::Conflict { .. } => ApiError::UsernameTaken(req.username.clone()),
            other => other.into(),
        })?;

    info!(user_id = user.id, username = %user.username, "User registered");

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// 用户登录
///
/// POST /login
///
/// 用户不存在与密码错误返回同一错误，避免暴露用户名是否存在。
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let user = state
        .users
        .find_user_by_name(&req.username)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !verify_password(&req.password, &user.password_hash)? {
        warn!(username = %req.username, "Login failed: wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let (token, expires_at) = state
        .jwt_manager
        .generate_token(user.id, &user.username, user.role)?;

    info!(user_id = user.id, role = %user.role, "User logged in");

    Ok(Json(LoginResponse {
        user_id: user.id,
        name: user.username,
        role: user.role,
        token,
        expires_at,
    }))
}
