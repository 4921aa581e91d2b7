//! 接口层错误类型定义
//!
//! 统一错误响应体：`{success: false, code, message, data: null}`。

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use banner_shared::error::BannerError;
use serde_json::json;

/// 接口层错误类型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // 认证错误
    #[error("未授权: {0}")]
    Unauthorized(String),
    #[error("禁止访问: {0}")]
    Forbidden(String),
    #[error("用户名或密码错误")]
    InvalidCredentials,
    #[error("用户名已存在: {0}")]
    UsernameTaken(String),

    // 验证错误
    #[error("参数验证失败: {0}")]
    Validation(String),
    #[error("引用的记录不存在: {0}")]
    InvalidReference(String),

    // 资源不存在
    #[error("横幅不存在: {0}")]
    BannerNotFound(i64),
    #[error("功能不存在: {0}")]
    FeatureNotFound(i64),
    #[error("标签不存在: {0}")]
    TagNotFound(i64),
    #[error("资源不存在: {0}")]
    NotFound(String),

    // 业务冲突
    #[error("记录冲突: {0}")]
    Conflict(String),

    // 系统错误
    #[error("数据库错误: {0}")]
    Database(sqlx::Error),
    #[error("事务已回滚: {0}")]
    TransactionAborted(String),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl ApiError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,

            Self::Validation(_) | Self::InvalidReference(_) => StatusCode::BAD_REQUEST,

            Self::BannerNotFound(_)
            | Self::FeatureNotFound(_)
            | Self::TagNotFound(_)
            | Self::NotFound(_) => StatusCode::NOT_FOUND,

            Self::UsernameTaken(_) | Self::Conflict(_) => StatusCode::CONFLICT,

            Self::Database(_) | Self::TransactionAborted(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::UsernameTaken(_) => "USERNAME_TAKEN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidReference(_) => "INVALID_REFERENCE",
            Self::BannerNotFound(_) => "BANNER_NOT_FOUND",
            Self::FeatureNotFound(_) => "FEATURE_NOT_FOUND",
            Self::TagNotFound(_) => "TAG_NOT_FOUND",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::TransactionAborted(_) => "TRANSACTION_ABORTED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志，防止信息泄露
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::TransactionAborted(e) => {
                tracing::error!(error = %e, "事务执行失败，已回滚");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 请求体无法解析时按参数错误处理，不回落为零值
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

/// 从存储层错误转换
impl From<BannerError> for ApiError {
    fn from(err: BannerError) -> Self {
        match err {
            BannerError::Database(e) => Self::Database(e),
            BannerError::NotFound { entity, id } => Self::NotFound(format!("{} id={}", entity, id)),
            BannerError::Conflict { entity, detail } => {
                Self::Conflict(format!("{} {}", entity, detail))
            }
            BannerError::InvalidReference(msg) => Self::InvalidReference(msg),
            BannerError::TransactionAborted(msg) => Self::TransactionAborted(msg),
            BannerError::Validation(msg) => Self::Validation(msg),
            BannerError::Internal(msg) => Self::Internal(msg),
        }
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, ApiError>;
