//! 请求 DTO 定义
//!
//! 写入类请求的字段都声明为 Option，缺失字段由 validator 的 `required`
//! 报告为参数错误，而不是被当作"保持不变"或零值。

use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use crate::error::ApiError;
use crate::models::{BannerFilter, BannerInput};

/// 注册请求
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "用户名长度必须在 1-100 之间"))]
    pub username: String,
    #[validate(length(min = 1, max = 72, message = "密码长度必须在 1-72 之间"))]
    pub password: String,
}

/// 登录请求
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 100, message = "用户名长度必须在 1-100 之间"))]
    pub username: String,
    #[validate(length(min = 1, max = 72, message = "密码长度必须在 1-72 之间"))]
    pub password: String,
}

/// 创建功能请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFeatureRequest {
    #[validate(
        required(message = "name 不能为空"),
        length(min = 1, max = 255, message = "名称长度必须在 1-255 之间")
    )]
    pub name: Option<String>,
}

/// 创建标签请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTagRequest {
    #[validate(
        required(message = "name 不能为空"),
        length(min = 1, max = 255, message = "名称长度必须在 1-255 之间")
    )]
    pub name: Option<String>,
}

/// 创建横幅请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBannerRequest {
    #[validate(
        required(message = "tag_ids 不能为空"),
        length(min = 1, message = "至少需要一个标签")
    )]
    pub tag_ids: Option<Vec<i64>>,
    #[validate(required(message = "feature_id 不能为空"), range(min = 1))]
    pub feature_id: Option<i64>,
    #[validate(required(message = "content 不能为空"))]
    pub content: Option<Value>,
    #[validate(required(message = "is_active 不能为空"))]
    pub is_active: Option<bool>,
}

/// 更新横幅请求
///
/// 整体替换，四个字段均必填；tag_ids 可以为空数组，表示清空标签。
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBannerRequest {
    #[validate(required(message = "tag_ids 不能为空"))]
    pub tag_ids: Option<Vec<i64>>,
    #[validate(required(message = "feature_id 不能为空"), range(min = 1))]
    pub feature_id: Option<i64>,
    #[validate(required(message = "content 不能为空"))]
    pub content: Option<Value>,
    #[validate(required(message = "is_active 不能为空"))]
    pub is_active: Option<bool>,
}

/// 横幅写入请求体的公共字段
pub struct BannerBody {
    pub tag_ids: Option<Vec<i64>>,
    pub feature_id: Option<i64>,
    pub content: Option<Value>,
    pub is_active: Option<bool>,
}

impl From<CreateBannerRequest> for BannerBody {
    fn from(req: CreateBannerRequest) -> Self {
        Self {
            tag_ids: req.tag_ids,
            feature_id: req.feature_id,
            content: req.content,
            is_active: req.is_active,
        }
    }
}

impl From<UpdateBannerRequest> for BannerBody {
    fn from(req: UpdateBannerRequest) -> Self {
        Self {
            tag_ids: req.tag_ids,
            feature_id: req.feature_id,
            content: req.content,
            is_active: req.is_active,
        }
    }
}

impl BannerBody {
    /// 转换为写入参数
    ///
    /// 调用前应已通过 `validate()`；这里再检查 content 必须是 JSON 对象、标签 ID 为正数。
    pub fn into_input(self) -> Result<BannerInput, ApiError> {
        let missing = |field: &str| ApiError::Validation(format!("{} 不能为空", field));

        let content = self.content.ok_or_else(|| missing("content"))?;
        if !content.is_object() {
            return Err(ApiError::Validation("content 必须是 JSON 对象".to_string()));
        }

        let tag_ids = self.tag_ids.ok_or_else(|| missing("tag_ids"))?;
        if let Some(bad) = tag_ids.iter().find(|id| **id <= 0) {
            return Err(ApiError::Validation(format!("无效的标签 ID: {}", bad)));
        }

        Ok(BannerInput {
            feature_id: self.feature_id.ok_or_else(|| missing("feature_id"))?,
            content,
            is_active: self.is_active.ok_or_else(|| missing("is_active"))?,
            tag_ids,
        })
    }
}

/// 用户横幅查询参数
#[derive(Debug, Deserialize, Validate)]
pub struct UserBannerQuery {
    #[validate(required(message = "feature_id 不能为空"))]
    pub feature_id: Option<i64>,
    #[validate(required(message = "tag_id 不能为空"))]
    pub tag_id: Option<i64>,
    /// 暂不支持历史版本，该参数被接受但不影响结果
    #[serde(default)]
    pub use_last_revision: bool,
}

/// 横幅列表查询参数
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ListBannersQuery {
    pub feature_id: Option<i64>,
    pub tag_id: Option<i64>,
    #[validate(range(min = 0, message = "limit 不能为负数"))]
    pub limit: Option<i64>,
    #[validate(range(min = 0, message = "offset 不能为负数"))]
    pub offset: Option<i64>,
}

impl From<ListBannersQuery> for BannerFilter {
    fn from(query: ListBannersQuery) -> Self {
        Self {
            feature_id: query.feature_id,
            tag_id: query.tag_id,
            limit: query.limit,
            offset: query.offset,
        }
    }
}
