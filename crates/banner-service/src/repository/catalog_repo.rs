//! 功能与标签仓储（PostgreSQL）

use async_trait::async_trait;
use sqlx::PgPool;

use banner_shared::error::Result;

use super::traits::{FeatureRepositoryTrait, TagRepositoryTrait};
use crate::models::{Feature, Tag};

/// 功能仓储
pub struct FeatureRepository {
    pool: PgPool,
}

impl FeatureRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeatureRepositoryTrait for FeatureRepository {
    async fn create_feature(&self, name: &str) -> Result<Feature> {
        let feature = sqlx::query_as::<_, Feature>(
            r#"
            INSERT INTO features (name)
            VALUES ($1)
            RETURNING id, name, created_at
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(feature)
    }

    async fn get_feature(&self, id: i64) -> Result<Option<Feature>> {
        let feature = sqlx::query_as::<_, Feature>(
            "SELECT id, name, created_at FROM features WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(feature)
    }
}

/// 标签仓储
pub struct TagRepository {
    pool: PgPool,
}

impl TagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TagRepositoryTrait for TagRepository {
    async fn create_tag(&self, name: &str) -> Result<Tag> {
        let tag = sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (name)
            VALUES ($1)
            RETURNING id, name, created_at
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(tag)
    }

    async fn get_tag(&self, id: i64) -> Result<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>("SELECT id, name, created_at FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(tag)
    }
}
