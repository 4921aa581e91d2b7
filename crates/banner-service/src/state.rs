//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use std::sync::Arc;

use banner_shared::database::Database;

use crate::auth::{JwtConfig, JwtManager};
use crate::repository::{
    BannerQueryTrait, BannerRepository, BannerRepositoryTrait, BannerResolverTrait,
    FeatureRepository, FeatureRepositoryTrait, MemoryStore, StoreHealthTrait, TagRepository,
    TagRepositoryTrait, UserRepository, UserRepositoryTrait,
};

/// Axum 应用共享状态
///
/// 各 handler 依赖的存储能力以 trait 对象持有，通过 Arc 在 handler 间共享
#[derive(Clone)]
pub struct AppState {
    pub features: Arc<dyn FeatureRepositoryTrait>,
    pub tags: Arc<dyn TagRepositoryTrait>,
    pub users: Arc<dyn UserRepositoryTrait>,
    pub banners: Arc<dyn BannerRepositoryTrait>,
    pub resolver: Arc<dyn BannerResolverTrait>,
    pub query: Arc<dyn BannerQueryTrait>,
    pub health: Arc<dyn StoreHealthTrait>,
    /// JWT 管理器
    pub jwt_manager: Arc<JwtManager>,
}

impl AppState {
    /// 基于 PostgreSQL 连接池创建应用状态
    pub fn postgres(db: Database, jwt_config: JwtConfig) -> Self {
        let pool = db.pool().clone();
        let banners = Arc::new(BannerRepository::new(pool.clone()));

        Self {
            features: Arc::new(FeatureRepository::new(pool.clone())),
            tags: Arc::new(TagRepository::new(pool.clone())),
            users: Arc::new(UserRepository::new(pool)),
            banners: banners.clone(),
            resolver: banners.clone(),
            query: banners,
            health: Arc::new(db),
            jwt_manager: Arc::new(JwtManager::new(jwt_config)),
        }
    }

    /// 基于内存存储创建应用状态
    pub fn in_memory(store: Arc<MemoryStore>, jwt_config: JwtConfig) -> Self {
        Self {
            features: store.clone(),
            tags: store.clone(),
            users: store.clone(),
            banners: store.clone(),
            resolver: store.clone(),
            query: store.clone(),
            health: store,
            jwt_manager: Arc::new(JwtManager::new(jwt_config)),
        }
    }
}
