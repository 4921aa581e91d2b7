//! 响应 DTO 定义

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::models::{Banner, Feature, Role, Tag, User};

/// 横幅
#[derive(Debug, Clone, Serialize)]
pub struct BannerDto {
    pub banner_id: i64,
    pub tag_ids: Vec<i64>,
    pub feature_id: i64,
    pub content: Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Banner> for BannerDto {
    fn from(banner: Banner) -> Self {
        Self {
            banner_id: banner.id,
            tag_ids: banner.tag_ids,
            feature_id: banner.feature_id,
            content: banner.content,
            is_active: banner.is_active,
            created_at: banner.created_at,
            updated_at: banner.updated_at,
        }
    }
}

/// 功能
#[derive(Debug, Clone, Serialize)]
pub struct FeatureDto {
    pub feature_id: i64,
    pub name: String,
}

impl From<Feature> for FeatureDto {
    fn from(feature: Feature) -> Self {
        Self {
            feature_id: feature.id,
            name: feature.name,
        }
    }
}

/// 标签
#[derive(Debug, Clone, Serialize)]
pub struct TagDto {
    pub tag_id: i64,
    pub name: String,
}

impl From<Tag> for TagDto {
    fn from(tag: Tag) -> Self {
        Self {
            tag_id: tag.id,
            name: tag.name,
        }
    }
}

/// 用户（不含密码哈希）
#[derive(Debug, Clone, Serialize)]
pub struct UserDto {
    pub user_id: i64,
    pub name: String,
    pub role: Role,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            name: user.username,
            role: user.role,
        }
    }
}

/// 登录响应
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: i64,
    pub name: String,
    pub role: Role,
    pub token: String,
    /// 过期时间戳（秒）
    pub expires_at: i64,
}
