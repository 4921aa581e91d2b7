//! 统一错误处理模块
//!
//! 存储层共享的错误类型。PostgreSQL 约束冲突在转换时归类，
//! 上层据此区分"请求有误"与"基础设施故障"。

use thiserror::Error;

/// 存储层错误类型
#[derive(Debug, Error)]
pub enum BannerError {
    #[error("数据库错误: {0}")]
    Database(sqlx::Error),

    #[error("记录未找到: {entity} id={id}")]
    NotFound { entity: String, id: String },

    #[error("记录冲突: {entity} {detail}")]
    Conflict { entity: String, detail: String },

    /// 外键引用的记录不存在（如未知的 tag_id、feature_id）
    #[error("引用的记录不存在: {0}")]
    InvalidReference(String),

    /// 事务内失败，已回滚
    #[error("事务已回滚: {0}")]
    TransactionAborted(String),

    #[error("参数验证失败: {0}")]
    Validation(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, BannerError>;

impl BannerError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// 错误码，用于结构化日志字段
    pub fn code(&self) -> &'static str {
        match self {
            Self::Database(_) => "DATABASE_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Conflict { .. } => "CONFLICT",
            Self::InvalidReference(_) => "INVALID_REFERENCE",
            Self::TransactionAborted(_) => "TRANSACTION_ABORTED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 事务内的基础设施错误统一归为 TransactionAborted，业务类错误原样保留
    pub fn into_aborted(self) -> Self {
        match self {
            Self::Database(e) => Self::TransactionAborted(e.to_string()),
            Self::Internal(msg) => Self::TransactionAborted(msg),
            other => other,
        }
    }
}

impl From<sqlx::Error> for BannerError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            if db_err.is_unique_violation() {
                return Self::Conflict {
                    entity: constraint,
                    detail: db_err.message().to_string(),
                };
            }
            if db_err.is_foreign_key_violation() {
                return Self::InvalidReference(format!("{} ({})", db_err.message(), constraint));
            }
        }
        Self::Database(err)
    }
}
