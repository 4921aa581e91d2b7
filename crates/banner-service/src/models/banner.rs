//! 横幅模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use banner_shared::error::{BannerError, Result};

/// 横幅
///
/// `tag_ids` 不存储在横幅行上，读取时由 banner_tags 聚合得到，按升序排列。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Banner {
    pub id: i64,
    pub feature_id: i64,
    pub content: Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tag_ids: Vec<i64>,
}

/// 横幅写入参数
///
/// 创建和更新共用：更新是整体替换，四个字段都必须给出。
#[derive(Debug, Clone, PartialEq)]
pub struct BannerInput {
    pub feature_id: i64,
    pub content: Value,
    pub is_active: bool,
    pub tag_ids: Vec<i64>,
}

impl BannerInput {
    /// 去重后的标签 ID，保持首次出现的顺序
    pub fn distinct_tag_ids(&self) -> Vec<i64> {
        distinct(&self.tag_ids)
    }
}

/// 去重，保持首次出现的顺序
pub(crate) fn distinct(ids: &[i64]) -> Vec<i64> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// 横幅列表过滤条件
///
/// 每个字段独立可选；`limit` 缺省时不设上限。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BannerFilter {
    pub feature_id: Option<i64>,
    pub tag_id: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl BannerFilter {
    /// 分页参数不能为负
    pub fn check(&self) -> Result<()> {
        if self.limit.is_some_and(|v| v < 0) {
            return Err(BannerError::Validation("limit 不能为负数".to_string()));
        }
        if self.offset.is_some_and(|v| v < 0) {
            return Err(BannerError::Validation("offset 不能为负数".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_keeps_first_occurrence() {
        assert_eq!(distinct(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert!(distinct(&[]).is_empty());
    }

    #[test]
    fn test_filter_check() {
        assert!(BannerFilter::default().check().is_ok());
        let bad = BannerFilter {
            limit: Some(-1),
            ..Default::default()
        };
        assert!(matches!(bad.check(), Err(BannerError::Validation(_))));
        let bad = BannerFilter {
            offset: Some(-5),
            ..Default::default()
        };
        assert!(bad.check().is_err());
    }
}
