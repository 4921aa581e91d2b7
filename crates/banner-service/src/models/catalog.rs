//! 功能与标签
//!
//! 两者生命周期相同：由管理员创建，创建后不可修改，也不会被删除。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 功能：决定客户端看到哪一类横幅
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Feature {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// 标签：在同一功能下细分用户群
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
