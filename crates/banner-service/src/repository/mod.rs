//! 仓储层
//!
//! PostgreSQL 实现按实体拆分，内存实现集中在 `memory`。

mod banner_repo;
mod banner_tag_repo;
mod catalog_repo;
pub mod filter;
pub mod memory;
mod traits;
mod user_repo;

use async_trait::async_trait;
use banner_shared::database::Database;
use banner_shared::error::Result;

pub use banner_repo::BannerRepository;
pub use banner_tag_repo::BannerTagRepository;
pub use catalog_repo::{FeatureRepository, TagRepository};
pub use memory::MemoryStore;
pub use traits::{
    BannerQueryTrait, BannerRepositoryTrait, BannerResolverTrait, BannerTagRepositoryTrait,
    FeatureRepositoryTrait, StoreHealthTrait, TagRepositoryTrait, UserRepositoryTrait,
};
pub use user_repo::UserRepository;

#[cfg(test)]
pub use traits::{
    MockBannerQueryTrait, MockBannerRepositoryTrait, MockBannerResolverTrait,
    MockBannerTagRepositoryTrait, MockFeatureRepositoryTrait, MockStoreHealthTrait,
    MockTagRepositoryTrait, MockUserRepositoryTrait,
};

#[async_trait]
impl StoreHealthTrait for Database {
    async fn health_check(&self) -> Result<()> {
        Database::health_check(self).await
    }
}
