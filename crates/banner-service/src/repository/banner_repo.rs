//! 横幅仓储（PostgreSQL）
//!
//! 横幅行的读写、按 (feature, tag) 解析，以及管理端列表查询。

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, warn};

use banner_shared::error::{BannerError, Result};
use banner_shared::observability::metrics;

use super::banner_tag_repo::BannerTagRepository;
use super::filter::build_list_query;
use super::traits::{BannerQueryTrait, BannerRepositoryTrait, BannerResolverTrait};
use crate::models::{Banner, BannerFilter, BannerInput};

/// 横幅行 + 标签子查询，读取单条横幅时共用
const BANNER_COLUMNS: &str = r#"b.id, b.feature_id, b.content, b.is_active, b.created_at, b.updated_at,
       ARRAY(SELECT t.tag_id FROM banner_tags t WHERE t.banner_id = b.id ORDER BY t.tag_id) AS tag_ids"#;

pub struct BannerRepository {
    pool: PgPool,
}

impl BannerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn create_in_tx(tx: &mut PgConnection, input: &BannerInput) -> Result<Banner> {
        let mut banner = sqlx::query_as::<_, Banner>(
            r#"
            INSERT INTO banners (feature_id, content, is_active)
            VALUES ($1, $2, $3)
            RETURNING id, feature_id, content, is_active, created_at, updated_at,
                      ARRAY[]::BIGINT[] AS tag_ids
            "#,
        )
        .bind(input.feature_id)
        .bind(&input.content)
        .bind(input.is_active)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match BannerError::from(e) {
            BannerError::InvalidReference(_) => {
                BannerError::InvalidReference(format!("feature_id={}", input.feature_id))
            }
            other => other,
        })?;

        let mut tag_ids = input.distinct_tag_ids();
        for tag_id in &tag_ids {
            BannerTagRepository::link_in_tx(&mut *tx, banner.id, *tag_id).await?;
        }
        tag_ids.sort_unstable();
        banner.tag_ids = tag_ids;

        Ok(banner)
    }

    /// 整体替换横幅字段与标签集合
    ///
    /// updated_at 由 `replace_tags_in_tx` 在持有行锁后刷新，返回值按事务内的最终状态重新读取。
    async fn update_in_tx(
        tx: &mut PgConnection,
        id: i64,
        input: &BannerInput,
    ) -> Result<Option<Banner>> {
        let result = sqlx::query(
            r#"
            UPDATE banners
            SET feature_id = $2, content = $3, is_active = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.feature_id)
        .bind(&input.content)
        .bind(input.is_active)
        .execute(&mut *tx)
        .await
        .map_err(|e| match BannerError::from(e) {
            BannerError::InvalidReference(_) => {
                BannerError::InvalidReference(format!("feature_id={}", input.feature_id))
            }
            other => other,
        })?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        BannerTagRepository::replace_tags_in_tx(&mut *tx, id, &input.tag_ids).await?;

        let sql = format!("SELECT {} FROM banners b WHERE b.id = $1", BANNER_COLUMNS);
        let banner = sqlx::query_as::<_, Banner>(&sql)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        Ok(Some(banner))
    }
}

#[async_trait]
impl BannerRepositoryTrait for BannerRepository {
    async fn create_banner(&self, input: &BannerInput) -> Result<Banner> {
        let mut tx = self.pool.begin().await?;

        match Self::create_in_tx(&mut tx, input).await {
            Ok(banner) => {
                tx.commit().await.map_err(|e| BannerError::from(e).into_aborted())?;
                debug!(banner_id = banner.id, "Banner row and tags committed");
                Ok(banner)
            }
            Err(e) => {
                tx.rollback().await?;
                warn!(feature_id = input.feature_id, code = e.code(), error = %e, "Banner creation rolled back");
                Err(e.into_aborted())
            }
        }
    }

    async fn get_banner(&self, id: i64) -> Result<Option<Banner>> {
        let sql = format!("SELECT {} FROM banners b WHERE b.id = $1", BANNER_COLUMNS);
        let banner = sqlx::query_as::<_, Banner>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(banner)
    }

    async fn update_banner(&self, id: i64, input: &BannerInput) -> Result<Option<Banner>> {
        let mut tx = self.pool.begin().await?;

        match Self::update_in_tx(&mut tx, id, input).await {
            Ok(Some(banner)) => {
                tx.commit().await.map_err(|e| BannerError::from(e).into_aborted())?;
                metrics::record_tag_replacement("committed");
                Ok(Some(banner))
            }
            Ok(None) => {
                tx.rollback().await?;
                Ok(None)
            }
            Err(e) => {
                tx.rollback().await?;
                metrics::record_tag_replacement("rolled_back");
                warn!(banner_id = id, code = e.code(), error = %e, "Banner update rolled back");
                Err(e.into_aborted())
            }
        }
    }

    async fn delete_banner(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM banners WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl BannerResolverTrait for BannerRepository {
    async fn resolve(&self, feature_id: i64, tag_id: i64) -> Result<Option<Banner>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM banners b
            JOIN banner_tags bt ON bt.banner_id = b.id
            WHERE b.feature_id = $1 AND bt.tag_id = $2 AND b.is_active = TRUE
            ORDER BY b.updated_at DESC, b.id DESC
            LIMIT 1
            "#,
            BANNER_COLUMNS
        );

        let banner = sqlx::query_as::<_, Banner>(&sql)
            .bind(feature_id)
            .bind(tag_id)
            .fetch_optional(&self.pool)
            .await
            .inspect_err(|_| metrics::record_banner_resolution("error"))?;

        metrics::record_banner_resolution(if banner.is_some() { "hit" } else { "miss" });
        Ok(banner)
    }
}

#[async_trait]
impl BannerQueryTrait for BannerRepository {
    async fn list_banners(&self, filter: &BannerFilter) -> Result<Vec<Banner>> {
        let query = build_list_query(filter)?;

        let mut sql_query = sqlx::query_as::<_, Banner>(&query.sql);
        for value in &query.binds {
            sql_query = sql_query.bind(*value);
        }

        let banners = sql_query.fetch_all(&self.pool).await?;
        Ok(banners)
    }
}
