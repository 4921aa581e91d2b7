//! 横幅-标签关联仓储（PostgreSQL）
//!
//! banner_tags 表的唯一写入方。横幅的创建与更新通过 `*_in_tx`
//! 在调用方的事务中写入关联，不直接操作该表。

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, warn};

use banner_shared::error::{BannerError, Result};
use banner_shared::observability::metrics;

use super::traits::BannerTagRepositoryTrait;
use crate::models::distinct;

pub struct BannerTagRepository {
    pool: PgPool,
}

impl BannerTagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 在事务中插入一条关联
    ///
    /// 重复关联返回 Conflict，未知的 banner/tag 返回 InvalidReference。
    pub async fn link_in_tx(tx: &mut PgConnection, banner_id: i64, tag_id: i64) -> Result<()> {
        sqlx::query("INSERT INTO banner_tags (banner_id, tag_id) VALUES ($1, $2)")
            .bind(banner_id)
            .bind(tag_id)
            .execute(tx)
            .await
            .map_err(|e| match BannerError::from(e) {
                BannerError::Conflict { .. } => BannerError::Conflict {
                    entity: "BannerTag".to_string(),
                    detail: format!("banner_id={} tag_id={}", banner_id, tag_id),
                },
                BannerError::InvalidReference(_) => BannerError::InvalidReference(format!(
                    "banner_id={} tag_id={}",
                    banner_id, tag_id
                )),
                other => other,
            })?;

        Ok(())
    }

    /// 在事务中替换横幅的全部标签
    ///
    /// 先锁定横幅行，串行化同一横幅的并发替换；随后删除旧关联、逐条插入新关联，
    /// 并刷新 updated_at。重复的输入 ID 只插入一次。返回新集合（升序）。
    pub async fn replace_tags_in_tx(
        tx: &mut PgConnection,
        banner_id: i64,
        tag_ids: &[i64],
    ) -> Result<Vec<i64>> {
        let locked: Option<i64> =
            sqlx::query_scalar("SELECT id FROM banners WHERE id = $1 FOR UPDATE")
                .bind(banner_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(BannerError::not_found("Banner", banner_id));
        }

        sqlx::query("DELETE FROM banner_tags WHERE banner_id = $1")
            .bind(banner_id)
            .execute(&mut *tx)
            .await?;

        let tag_ids = distinct(tag_ids);
        for tag_id in &tag_ids {
            Self::link_in_tx(&mut *tx, banner_id, *tag_id).await?;
        }

        // 取语句执行时刻：等待行锁的更新晚于锁持有期间的其他写入
        sqlx::query("UPDATE banners SET updated_at = clock_timestamp() WHERE id = $1")
            .bind(banner_id)
            .execute(&mut *tx)
            .await?;

        let mut tag_ids = tag_ids;
        tag_ids.sort_unstable();
        Ok(tag_ids)
    }

    /// 在事务中读取横幅的标签集合
    pub async fn tags_in_tx(tx: &mut PgConnection, banner_id: i64) -> Result<Vec<i64>> {
        let tag_ids = sqlx::query_scalar(
            "SELECT tag_id FROM banner_tags WHERE banner_id = $1 ORDER BY tag_id",
        )
        .bind(banner_id)
        .fetch_all(tx)
        .await?;

        Ok(tag_ids)
    }
}

#[async_trait]
impl BannerTagRepositoryTrait for BannerTagRepository {
    async fn link(&self, banner_id: i64, tag_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        Self::link_in_tx(&mut tx, banner_id, tag_id).await?;
        sqlx::query("UPDATE banners SET updated_at = clock_timestamp() WHERE id = $1")
            .bind(banner_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn replace_tags(&self, banner_id: i64, tag_ids: &[i64]) -> Result<Vec<i64>> {
        let mut tx = self.pool.begin().await?;

        match Self::replace_tags_in_tx(&mut tx, banner_id, tag_ids).await {
            Ok(new_tags) => {
                tx.commit().await.map_err(|e| BannerError::from(e).into_aborted())?;
                metrics::record_tag_replacement("committed");
                debug!(banner_id, tag_ids = ?new_tags, "Banner tags replaced");
                Ok(new_tags)
            }
            Err(e) => {
                tx.rollback().await?;
                metrics::record_tag_replacement("rolled_back");
                warn!(banner_id, code = e.code(), error = %e, "Banner tag replacement rolled back");
                Err(e.into_aborted())
            }
        }
    }

    async fn tags_for_banner(&self, banner_id: i64) -> Result<Vec<i64>> {
        let mut conn = self.pool.acquire().await?;
        Self::tags_in_tx(&mut conn, banner_id).await
    }
}
