//! 启动装配
//!
//! 按配置选择存储后端、执行迁移并初始化管理员账号。

use std::sync::Arc;

use anyhow::Context;
use banner_shared::{
    config::{AppConfig, AuthConfig, StorageBackend},
    database::Database,
    error::BannerError,
};
use tracing::{info, warn};

use crate::auth::{JwtConfig, hash_password};
use crate::models::Role;
use crate::repository::{MemoryStore, UserRepositoryTrait};
use crate::state::AppState;

/// 按 `storage.backend` 构建应用状态
///
/// Postgres 后端同时返回连接池句柄，停机时由调用方关闭。
pub async fn build_state(config: &AppConfig) -> anyhow::Result<(AppState, Option<Database>)> {
    let jwt_config = JwtConfig::from(&config.auth);

    let (state, database) = match config.storage.backend {
        StorageBackend::Postgres => {
            let db = Database::connect(&config.database)
                .await
                .context("连接数据库失败")?;
            if config.database.run_migrations {
                db.run_migrations().await.context("执行数据库迁移失败")?;
            }
            (AppState::postgres(db.clone(), jwt_config), Some(db))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage - data is lost on restart");
            (AppState::in_memory(Arc::new(MemoryStore::new()), jwt_config), None)
        }
    };

    seed_admin(state.users.as_ref(), &config.auth).await?;

    Ok((state, database))
}

/// 初始化管理员账号
///
/// 已存在任意管理员时跳过；未配置密码时只记录警告。重复启动不会重复创建。
pub async fn seed_admin(users: &dyn UserRepositoryTrait, auth: &AuthConfig) -> anyhow::Result<()> {
    let Some(password) = auth.admin_password.as_deref().filter(|p| !p.is_empty()) else {
        warn!("auth.admin_password not set - skipping admin bootstrap");
        return Ok(());
    };

    if users.count_admins().await? > 0 {
        info!("Admin user already present");
        return Ok(());
    }

    let password_hash = hash_password(password)?;

    match users
        .create_user(&auth.admin_username, &password_hash, Role::Admin)
        .await
    {
        Ok(user) => {
            info!(user_id = user.id, username = %user.username, "Admin user created");
            Ok(())
        }
        Err(BannerError::Conflict { .. }) => {
            warn!(
                username = %auth.admin_username,
                "Admin username is taken by a non-admin user - admin bootstrap skipped"
            );
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
