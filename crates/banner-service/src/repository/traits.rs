//! 仓储 Trait 定义
//!
//! 按能力拆分的存储接口。handler 只依赖自己需要的那一组，
//! PostgreSQL 与内存两种后端都实现全部接口。

use async_trait::async_trait;

use banner_shared::error::Result;

use crate::models::{Banner, BannerFilter, BannerInput, Feature, Role, Tag, User};

/// 功能仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeatureRepositoryTrait: Send + Sync {
    async fn create_feature(&self, name: &str) -> Result<Feature>;
    async fn get_feature(&self, id: i64) -> Result<Option<Feature>>;
}

/// 标签仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TagRepositoryTrait: Send + Sync {
    async fn create_tag(&self, name: &str) -> Result<Tag>;
    async fn get_tag(&self, id: i64) -> Result<Option<Tag>>;
}

/// 用户仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    /// 用户名重复时返回 Conflict
    async fn create_user(&self, username: &str, password_hash: &str, role: Role) -> Result<User>;
    async fn find_user_by_name(&self, username: &str) -> Result<Option<User>>;
    async fn count_admins(&self) -> Result<i64>;
}

/// 横幅仓储接口
///
/// 创建与更新都在单个事务内完成横幅行与标签关联的写入。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BannerRepositoryTrait: Send + Sync {
    async fn create_banner(&self, input: &BannerInput) -> Result<Banner>;
    async fn get_banner(&self, id: i64) -> Result<Option<Banner>>;
    /// 整体替换；横幅不存在时返回 `Ok(None)`
    async fn update_banner(&self, id: i64, input: &BannerInput) -> Result<Option<Banner>>;
    /// 返回是否删除了记录
    async fn delete_banner(&self, id: i64) -> Result<bool>;
}

/// 横幅-标签关联接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BannerTagRepositoryTrait: Send + Sync {
    /// 关联已存在时返回 Conflict，不做幂等处理
    async fn link(&self, banner_id: i64, tag_id: i64) -> Result<()>;
    /// 原子替换横幅的全部标签，返回替换后的集合（升序）
    async fn replace_tags(&self, banner_id: i64, tag_ids: &[i64]) -> Result<Vec<i64>>;
    async fn tags_for_banner(&self, banner_id: i64) -> Result<Vec<i64>>;
}

/// 横幅解析接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BannerResolverTrait: Send + Sync {
    /// 同一 (feature, tag) 下 updated_at 最新的启用横幅，id 较大者优先
    async fn resolve(&self, feature_id: i64, tag_id: i64) -> Result<Option<Banner>>;
}

/// 横幅列表查询接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BannerQueryTrait: Send + Sync {
    async fn list_banners(&self, filter: &BannerFilter) -> Result<Vec<Banner>>;
}

/// 存储健康检查
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoreHealthTrait: Send + Sync {
    async fn health_check(&self) -> Result<()>;
}
