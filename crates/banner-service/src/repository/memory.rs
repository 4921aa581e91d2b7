//! 内存存储
//!
//! 与 PostgreSQL 后端语义一致的进程内实现：外键检查、级联删除、
//! 关联冲突、原子替换与解析优先级都在单把读写锁内完成。
//! 用于本地开发（`storage.backend = "memory"`）和集成测试。

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, warn};

use banner_shared::error::{BannerError, Result};
use banner_shared::observability::metrics;

use super::traits::{
    BannerQueryTrait, BannerRepositoryTrait, BannerResolverTrait, BannerTagRepositoryTrait,
    FeatureRepositoryTrait, StoreHealthTrait, TagRepositoryTrait, UserRepositoryTrait,
};
use crate::models::{Banner, BannerFilter, BannerInput, Feature, Role, Tag, User, distinct};

#[derive(Debug, Clone)]
struct BannerRow {
    id: i64,
    feature_id: i64,
    content: Value,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Inner {
    features: BTreeMap<i64, Feature>,
    tags: BTreeMap<i64, Tag>,
    users: BTreeMap<i64, User>,
    banners: BTreeMap<i64, BannerRow>,
    /// (banner_id, tag_id)
    links: BTreeSet<(i64, i64)>,
    next_id: i64,
    last_ts: Option<DateTime<Utc>>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// 单调递增的时间戳，同一微秒内的连续写入也能区分先后
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_ts {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_ts = Some(ts);
        ts
    }

    fn tags_of(&self, banner_id: i64) -> Vec<i64> {
        self.links
            .range((banner_id, i64::MIN)..=(banner_id, i64::MAX))
            .map(|(_, tag_id)| *tag_id)
            .collect()
    }

    fn to_banner(&self, row: &BannerRow) -> Banner {
        Banner {
            id: row.id,
            feature_id: row.feature_id,
            content: row.content.clone(),
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
            tag_ids: self.tags_of(row.id),
        }
    }

    fn touch(&mut self, banner_id: i64) {
        let ts = self.tick();
        if let Some(row) = self.banners.get_mut(&banner_id) {
            row.updated_at = ts;
        }
    }

    fn check_feature(&self, feature_id: i64) -> Result<()> {
        if self.features.contains_key(&feature_id) {
            Ok(())
        } else {
            Err(BannerError::InvalidReference(format!("feature_id={}", feature_id)))
        }
    }

    /// 删除旧关联后逐条插入；任何一条失败都恢复到调用前的集合
    fn replace_links(&mut self, banner_id: i64, tag_ids: &[i64]) -> Result<Vec<i64>> {
        let previous = self.tags_of(banner_id);
        for tag_id in &previous {
            self.links.remove(&(banner_id, *tag_id));
        }

        for tag_id in distinct(tag_ids) {
            if !self.tags.contains_key(&tag_id) {
                self.links
                    .retain(|(linked_banner, _)| *linked_banner != banner_id);
                self.links
                    .extend(previous.iter().map(|tag_id| (banner_id, *tag_id)));
                return Err(BannerError::InvalidReference(format!(
                    "banner_id={} tag_id={}",
                    banner_id, tag_id
                )));
            }
            self.links.insert((banner_id, tag_id));
        }

        self.touch(banner_id);
        Ok(self.tags_of(banner_id))
    }
}

/// 内存存储
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeatureRepositoryTrait for MemoryStore {
    async fn create_feature(&self, name: &str) -> Result<Feature> {
        let mut inner = self.inner.write();
        let feature = Feature {
            id: inner.next_id(),
            name: name.to_string(),
            created_at: inner.tick(),
        };
        inner.features.insert(feature.id, feature.clone());
        Ok(feature)
    }

    async fn get_feature(&self, id: i64) -> Result<Option<Feature>> {
        Ok(self.inner.read().features.get(&id).cloned())
    }
}

#[async_trait]
impl TagRepositoryTrait for MemoryStore {
    async fn create_tag(&self, name: &str) -> Result<Tag> {
        let mut inner = self.inner.write();
        let tag = Tag {
            id: inner.next_id(),
            name: name.to_string(),
            created_at: inner.tick(),
        };
        inner.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn get_tag(&self, id: i64) -> Result<Option<Tag>> {
        Ok(self.inner.read().tags.get(&id).cloned())
    }
}

#[async_trait]
impl UserRepositoryTrait for MemoryStore {
    async fn create_user(&self, username: &str, password_hash: &str, role: Role) -> Result<User> {
        let mut inner = self.inner.write();
        if inner.users.values().any(|u| u.username == username) {
            return Err(BannerError::Conflict {
                entity: "User".to_string(),
                detail: format!("username={}", username),
            });
        }
        let user = User {
            id: inner.next_id(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            role,
            created_at: inner.tick(),
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_name(&self, username: &str) -> Result<Option<User>> {
        let inner = self.inner.read();
        Ok(inner.users.values().find(|u| u.username == username).cloned())
    }

    async fn count_admins(&self) -> Result<i64> {
        let inner = self.inner.read();
        Ok(inner.users.values().filter(|u| u.role.is_admin()).count() as i64)
    }
}

#[async_trait]
impl BannerRepositoryTrait for MemoryStore {
    async fn create_banner(&self, input: &BannerInput) -> Result<Banner> {
        let mut inner = self.inner.write();
        inner.check_feature(input.feature_id)?;
        let tag_ids = input.distinct_tag_ids();
        if let Some(missing) = tag_ids.iter().find(|id| !inner.tags.contains_key(*id)) {
            return Err(BannerError::InvalidReference(format!("tag_id={}", missing)));
        }

        let now = inner.tick();
        let row = BannerRow {
            id: inner.next_id(),
            feature_id: input.feature_id,
            content: input.content.clone(),
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        };
        let id = row.id;
        inner.banners.insert(id, row);
        inner.links.extend(tag_ids.into_iter().map(|tag_id| (id, tag_id)));

        debug!(banner_id = id, "Banner created in memory store");
        Ok(inner.to_banner(&inner.banners[&id]))
    }

    async fn get_banner(&self, id: i64) -> Result<Option<Banner>> {
        let inner = self.inner.read();
        Ok(inner.banners.get(&id).map(|row| inner.to_banner(row)))
    }

    async fn update_banner(&self, id: i64, input: &BannerInput) -> Result<Option<Banner>> {
        let mut inner = self.inner.write();
        let Some(previous) = inner.banners.get(&id).cloned() else {
            return Ok(None);
        };
        inner.check_feature(input.feature_id)?;

        let now = inner.tick();
        if let Some(row) = inner.banners.get_mut(&id) {
            row.feature_id = input.feature_id;
            row.content = input.content.clone();
            row.is_active = input.is_active;
            row.updated_at = now;
        }

        if let Err(e) = inner.replace_links(id, &input.tag_ids) {
            inner.banners.insert(id, previous);
            metrics::record_tag_replacement("rolled_back");
            warn!(banner_id = id, code = e.code(), error = %e, "Banner update rolled back");
            return Err(e);
        }

        metrics::record_tag_replacement("committed");
        Ok(Some(inner.to_banner(&inner.banners[&id])))
    }

    async fn delete_banner(&self, id: i64) -> Result<bool> {
        let mut inner = self.inner.write();
        if inner.banners.remove(&id).is_none() {
            return Ok(false);
        }
        inner.links.retain(|(banner_id, _)| *banner_id != id);
        Ok(true)
    }
}

#[async_trait]
impl BannerTagRepositoryTrait for MemoryStore {
    async fn link(&self, banner_id: i64, tag_id: i64) -> Result<()> {
        let mut inner = self.inner.write();
        if !inner.banners.contains_key(&banner_id) || !inner.tags.contains_key(&tag_id) {
            return Err(BannerError::InvalidReference(format!(
                "banner_id={} tag_id={}",
                banner_id, tag_id
            )));
        }
        if !inner.links.insert((banner_id, tag_id)) {
            return Err(BannerError::Conflict {
                entity: "BannerTag".to_string(),
                detail: format!("banner_id={} tag_id={}", banner_id, tag_id),
            });
        }
        inner.touch(banner_id);
        Ok(())
    }

    async fn replace_tags(&self, banner_id: i64, tag_ids: &[i64]) -> Result<Vec<i64>> {
        let mut inner = self.inner.write();
        if !inner.banners.contains_key(&banner_id) {
            return Err(BannerError::not_found("Banner", banner_id));
        }

        match inner.replace_links(banner_id, tag_ids) {
            Ok(new_tags) => {
                metrics::record_tag_replacement("committed");
                Ok(new_tags)
            }
            Err(e) => {
                metrics::record_tag_replacement("rolled_back");
                warn!(banner_id, code = e.code(), error = %e, "Banner tag replacement rolled back");
                Err(e)
            }
        }
    }

    async fn tags_for_banner(&self, banner_id: i64) -> Result<Vec<i64>> {
        Ok(self.inner.read().tags_of(banner_id))
    }
}

#[async_trait]
impl BannerResolverTrait for MemoryStore {
    async fn resolve(&self, feature_id: i64, tag_id: i64) -> Result<Option<Banner>> {
        let inner = self.inner.read();
        let banner = inner
            .banners
            .values()
            .filter(|row| row.feature_id == feature_id && row.is_active)
            .filter(|row| inner.links.contains(&(row.id, tag_id)))
            .max_by_key(|row| (row.updated_at, row.id))
            .map(|row| inner.to_banner(row));

        metrics::record_banner_resolution(if banner.is_some() { "hit" } else { "miss" });
        Ok(banner)
    }
}

#[async_trait]
impl BannerQueryTrait for MemoryStore {
    async fn list_banners(&self, filter: &BannerFilter) -> Result<Vec<Banner>> {
        filter.check()?;

        let inner = self.inner.read();
        let offset = filter.offset.unwrap_or(0) as usize;
        let limit = filter.limit.map(|v| v as usize).unwrap_or(usize::MAX);

        let banners = inner
            .banners
            .values()
            .filter(|row| filter.feature_id.is_none_or(|f| row.feature_id == f))
            .filter(|row| {
                filter
                    .tag_id
                    .is_none_or(|t| inner.links.contains(&(row.id, t)))
            })
            .skip(offset)
            .take(limit)
            .map(|row| inner.to_banner(row))
            .collect();

        Ok(banners)
    }
}

#[async_trait]
impl StoreHealthTrait for MemoryStore {
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
